use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};

use super::filter::FilteredView;

// ---------------------------------------------------------------------------
// MonthKey – calendar month grouping key
// ---------------------------------------------------------------------------

/// A calendar month. Month grouping spans years: January 2023 and
/// January 2024 are distinct keys, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn of(date: NaiveDate) -> Self {
        MonthKey {
            year: date.year(),
            month: date.month(),
        }
    }

    /// First day of the month, for plotting on a date axis.
    pub fn first_day(&self) -> NaiveDate {
        // month is always 1..=12 here since it came from a valid date
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

// ---------------------------------------------------------------------------
// Scalar KPIs
// ---------------------------------------------------------------------------

/// Summary scalars for a filtered view. All fields degrade to zero on an
/// empty view; `avg_discount` in particular is 0.0 rather than NaN.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KpiSummary {
    pub total_sales: f64,
    pub total_profit: f64,
    pub order_count: usize,
    pub avg_discount: f64,
}

/// Compute the scalar KPIs over a view. Pure; never fails.
pub fn summarize(view: &FilteredView<'_>) -> KpiSummary {
    let mut summary = KpiSummary::default();
    let mut discount_sum = 0.0;

    for order in view.rows() {
        summary.total_sales += order.sales;
        summary.total_profit += order.profit;
        summary.order_count += 1;
        discount_sum += order.discount;
    }

    if summary.order_count > 0 {
        summary.avg_discount = discount_sum / summary.order_count as f64;
    }
    summary
}

// ---------------------------------------------------------------------------
// Grouped aggregates
// ---------------------------------------------------------------------------

/// Grouped aggregates for chart rendering. `BTreeMap` keys give stable,
/// deterministic ordering: lexicographic for categories/regions,
/// chronological for months.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedAggregates {
    /// Sales summed per category.
    pub sales_by_category: BTreeMap<String, f64>,
    /// Sales summed per calendar month.
    pub sales_by_month: BTreeMap<MonthKey, f64>,
    /// Profit averaged per region.
    pub avg_profit_by_region: BTreeMap<String, f64>,
    /// Discount averaged per category.
    pub avg_discount_by_category: BTreeMap<String, f64>,
}

/// Compute all grouped aggregates over a view in a single pass.
/// An empty view produces empty maps.
pub fn grouped(view: &FilteredView<'_>) -> GroupedAggregates {
    let mut out = GroupedAggregates::default();
    let mut profit_sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    let mut discount_sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();

    for order in view.rows() {
        *out.sales_by_category
            .entry(order.category.clone())
            .or_default() += order.sales;
        *out.sales_by_month
            .entry(MonthKey::of(order.order_date))
            .or_default() += order.sales;

        let p = profit_sums.entry(order.region.clone()).or_default();
        p.0 += order.profit;
        p.1 += 1;

        let d = discount_sums.entry(order.category.clone()).or_default();
        d.0 += order.discount;
        d.1 += 1;
    }

    out.avg_profit_by_region = profit_sums
        .into_iter()
        .map(|(region, (sum, n))| (region, sum / n as f64))
        .collect();
    out.avg_discount_by_category = discount_sums
        .into_iter()
        .map(|(category, (sum, n))| (category, sum / n as f64))
        .collect();
    out
}

// ---------------------------------------------------------------------------
// Trend series
// ---------------------------------------------------------------------------

/// Time bucket size for the sales/profit trend chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Monthly,
    Daily,
}

/// One point of the trend line: bucket date plus summed sales and profit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub sales: f64,
    pub profit: f64,
}

/// Sales and profit summed per time bucket, chronological. Monthly buckets
/// are anchored to the first day of each month.
pub fn trend(view: &FilteredView<'_>, granularity: Granularity) -> Vec<TrendPoint> {
    let mut buckets: BTreeMap<NaiveDate, (f64, f64)> = BTreeMap::new();

    for order in view.rows() {
        let bucket = match granularity {
            Granularity::Monthly => MonthKey::of(order.order_date).first_day(),
            Granularity::Daily => order.order_date,
        };
        let entry = buckets.entry(bucket).or_default();
        entry.0 += order.sales;
        entry.1 += order.profit;
    }

    buckets
        .into_iter()
        .map(|(date, (sales, profit))| TrendPoint {
            date,
            sales,
            profit,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{FilterCriteria, FilteredView};
    use crate::data::model::{OrderRecord, SalesDataset};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_dataset() -> SalesDataset {
        SalesDataset::from_orders(vec![
            OrderRecord {
                category: "Furniture".into(),
                region: "East".into(),
                order_date: day(2023, 1, 5),
                sales: 100.0,
                profit: 10.0,
                discount: 0.1,
            },
            OrderRecord {
                category: "Office".into(),
                region: "West".into(),
                order_date: day(2023, 2, 10),
                sales: 200.0,
                profit: -5.0,
                discount: 0.2,
            },
            OrderRecord {
                category: "Furniture".into(),
                region: "East".into(),
                order_date: day(2023, 3, 1),
                sales: 50.0,
                profit: 5.0,
                discount: 0.0,
            },
        ])
    }

    #[test]
    fn kpis_over_furniture_east_selection() {
        let ds = sample_dataset();
        let mut criteria = FilterCriteria::match_all(&ds);
        criteria.categories.insert("Furniture".into());
        criteria.regions.insert("East".into());
        criteria.start_date = day(2023, 1, 1);
        criteria.end_date = day(2023, 12, 31);

        let view = FilteredView::new(&ds, &criteria);
        assert_eq!(view.len(), 2);

        let kpi = summarize(&view);
        assert_eq!(kpi.total_sales, 150.0);
        assert_eq!(kpi.total_profit, 15.0);
        assert_eq!(kpi.order_count, 2);
        assert!((kpi.avg_discount - 0.05).abs() < 1e-12);
    }

    #[test]
    fn empty_view_degrades_to_zero() {
        let ds = sample_dataset();
        let mut criteria = FilterCriteria::match_all(&ds);
        criteria.start_date = day(2023, 4, 1);
        criteria.end_date = day(2023, 12, 31);

        let view = FilteredView::new(&ds, &criteria);
        assert!(view.is_empty());

        let kpi = summarize(&view);
        assert_eq!(kpi.total_sales, 0.0);
        assert_eq!(kpi.total_profit, 0.0);
        assert_eq!(kpi.avg_discount, 0.0);

        let groups = grouped(&view);
        assert!(groups.sales_by_category.is_empty());
        assert!(groups.sales_by_month.is_empty());
        assert!(trend(&view, Granularity::Monthly).is_empty());
    }

    #[test]
    fn grouped_sums_and_means() {
        let ds = sample_dataset();
        let criteria = FilterCriteria::match_all(&ds);
        let view = FilteredView::new(&ds, &criteria);

        let groups = grouped(&view);
        assert_eq!(groups.sales_by_category["Furniture"], 150.0);
        assert_eq!(groups.sales_by_category["Office"], 200.0);
        assert_eq!(groups.avg_profit_by_region["East"], 7.5);
        assert_eq!(groups.avg_profit_by_region["West"], -5.0);
        assert!((groups.avg_discount_by_category["Furniture"] - 0.05).abs() < 1e-12);

        // Category keys come out lexicographically sorted.
        let cats: Vec<_> = groups.sales_by_category.keys().cloned().collect();
        assert_eq!(cats, vec!["Furniture".to_string(), "Office".to_string()]);
    }

    #[test]
    fn month_grouping_spans_years() {
        let mut orders = sample_dataset().orders;
        orders.push(OrderRecord {
            category: "Furniture".into(),
            region: "East".into(),
            order_date: day(2024, 1, 15),
            sales: 30.0,
            profit: 3.0,
            discount: 0.0,
        });
        let ds = SalesDataset::from_orders(orders);
        let view = FilteredView::new(&ds, &FilterCriteria::match_all(&ds));

        let groups = grouped(&view);
        let months: Vec<String> = groups.sales_by_month.keys().map(|k| k.to_string()).collect();
        assert_eq!(months, vec!["2023-01", "2023-02", "2023-03", "2024-01"]);
        assert_eq!(groups.sales_by_month[&MonthKey { year: 2024, month: 1 }], 30.0);
    }

    #[test]
    fn trend_buckets_are_chronological() {
        let ds = sample_dataset();
        let view = FilteredView::new(&ds, &FilterCriteria::match_all(&ds));

        let monthly = trend(&view, Granularity::Monthly);
        assert_eq!(monthly.len(), 3);
        assert_eq!(monthly[0].date, day(2023, 1, 1));
        assert_eq!(monthly[0].sales, 100.0);
        assert_eq!(monthly[1].profit, -5.0);

        let daily = trend(&view, Granularity::Daily);
        assert_eq!(daily.len(), 3);
        assert_eq!(daily[2].date, day(2023, 3, 1));
    }
}
