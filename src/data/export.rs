use std::io::Write;

use super::error::SerializationError;
use super::filter::FilteredView;
use super::model::SCHEMA_COLUMNS;

// ---------------------------------------------------------------------------
// CSV export of a filtered view
// ---------------------------------------------------------------------------

/// Serialize the view as CSV into `writer`: a header row in the fixed schema
/// order, then one record per matching row in dataset order.
///
/// Numbers are written with Rust's shortest round-trip formatting and dates
/// as ISO-8601, so re-parsing the output through the loader schema reproduces
/// the rows exactly. An empty view yields the header row only.
pub fn write_csv<W: Write>(view: &FilteredView<'_>, writer: W) -> Result<(), SerializationError> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(SCHEMA_COLUMNS)?;

    for order in view.rows() {
        out.write_record([
            order.category.as_str(),
            order.region.as_str(),
            &order.order_date.format("%Y-%m-%d").to_string(),
            &order.sales.to_string(),
            &order.profit.to_string(),
            &order.discount.to_string(),
        ])?;
    }

    out.flush()?;
    Ok(())
}

/// Serialize the view to an in-memory CSV buffer, ready for a save dialog.
pub fn csv_bytes(view: &FilteredView<'_>) -> Result<Vec<u8>, SerializationError> {
    let mut buf = Vec::new();
    write_csv(view, &mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{FilterCriteria, FilteredView};
    use crate::data::loader;
    use crate::data::model::{OrderRecord, SalesDataset};
    use chrono::NaiveDate;

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
                sales: 200.5,
                profit: -5.25,
                discount: 0.2,
            },
        ])
    }

    #[test]
    fn header_matches_schema() {
        let ds = sample_dataset();
        let view = FilteredView::new(&ds, &FilterCriteria::match_all(&ds));
        let bytes = csv_bytes(&view).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("category,region,order_date,sales,profit,discount\n"));
    }

    #[test]
    fn round_trip_reproduces_rows() {
        let ds = sample_dataset();
        let view = FilteredView::new(&ds, &FilterCriteria::match_all(&ds));
        let bytes = csv_bytes(&view).unwrap();

        let reloaded = loader::read_csv(bytes.as_slice()).unwrap();
        assert_eq!(reloaded.len(), ds.len());
        for (a, b) in reloaded.orders.iter().zip(ds.orders.iter()) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn empty_view_exports_header_only() {
        let ds = sample_dataset();
        let mut criteria = FilterCriteria::match_all(&ds);
        criteria.start_date = day(2024, 1, 1);
        criteria.end_date = day(2024, 12, 31);

        let view = FilteredView::new(&ds, &criteria);
        assert!(view.is_empty());

        let text = String::from_utf8(csv_bytes(&view).unwrap()).unwrap();
        assert_eq!(text, "category,region,order_date,sales,profit,discount\n");
    }
}
