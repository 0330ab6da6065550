use std::collections::BTreeSet;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// Fixed column order shared by the loader and the CSV exporter.
pub const SCHEMA_COLUMNS: [&str; 6] = [
    "category",
    "region",
    "order_date",
    "sales",
    "profit",
    "discount",
];

// ---------------------------------------------------------------------------
// OrderRecord – one row of the dataset
// ---------------------------------------------------------------------------

/// A single order (one row of the source table). Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub category: String,
    pub region: String,
    pub order_date: NaiveDate,
    /// Gross sales amount, non-negative.
    pub sales: f64,
    /// Profit, may be negative.
    pub profit: f64,
    /// Discount fraction in [0, 1].
    pub discount: f64,
}

// ---------------------------------------------------------------------------
// SalesDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed column indices.
#[derive(Debug, Clone)]
pub struct SalesDataset {
    /// All orders (rows), in file order.
    pub orders: Vec<OrderRecord>,
    /// Sorted set of distinct categories.
    pub categories: BTreeSet<String>,
    /// Sorted set of distinct regions.
    pub regions: BTreeSet<String>,
    /// Earliest and latest order date, None when the dataset has no rows.
    pub date_span: Option<(NaiveDate, NaiveDate)>,
}

impl SalesDataset {
    /// Build column indices from the loaded orders.
    pub fn from_orders(orders: Vec<OrderRecord>) -> Self {
        let mut categories = BTreeSet::new();
        let mut regions = BTreeSet::new();
        let mut date_span: Option<(NaiveDate, NaiveDate)> = None;

        for order in &orders {
            categories.insert(order.category.clone());
            regions.insert(order.region.clone());
            date_span = Some(match date_span {
                None => (order.order_date, order.order_date),
                Some((lo, hi)) => (lo.min(order.order_date), hi.max(order.order_date)),
            });
        }

        SalesDataset {
            orders,
            categories,
            regions,
            date_span,
        }
    }

    /// Number of orders.
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
