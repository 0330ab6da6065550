use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    Array, AsArray, Date32Array, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use chrono::NaiveDate;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;

use super::error::LoadError;
use super::model::{OrderRecord, SalesDataset, SCHEMA_COLUMNS};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an order dataset from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the schema columns (recommended)
/// * `.json`    – records-oriented array: `[{ "category": ..., ... }, ...]`
/// * `.parquet` – flat columns as written by Pandas/Polars
pub fn load_file(path: &Path) -> Result<SalesDataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(LoadError::UnsupportedFormat(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Row validation
// ---------------------------------------------------------------------------

/// Range checks shared by all three loaders. Schema violations surface here
/// rather than propagating bad values downstream.
fn validate(row: usize, order: OrderRecord) -> Result<OrderRecord, LoadError> {
    if order.sales < 0.0 {
        return Err(LoadError::bad_value(
            row,
            "sales",
            format!("negative sales amount {}", order.sales),
        ));
    }
    if !(0.0..=1.0).contains(&order.discount) {
        return Err(LoadError::bad_value(
            row,
            "discount",
            format!("discount {} outside [0, 1]", order.discount),
        ));
    }
    Ok(order)
}

fn parse_date(row: usize, s: &str) -> Result<NaiveDate, LoadError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| LoadError::bad_value(row, "order_date", format!("'{s}' is not a YYYY-MM-DD date")))
}

fn parse_number(row: usize, column: &'static str, s: &str) -> Result<f64, LoadError> {
    s.trim()
        .parse::<f64>()
        .map_err(|_| LoadError::bad_value(row, column, format!("'{s}' is not a number")))
}

fn non_empty(row: usize, column: &'static str, s: &str) -> Result<String, LoadError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(LoadError::bad_value(row, column, "empty value"));
    }
    Ok(trimmed.to_string())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<SalesDataset, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_csv(file)
}

/// Parse CSV order data from any reader. The exporter's output feeds back
/// through here unchanged, which is what the round-trip tests rely on.
pub fn read_csv<R: Read>(reader: R) -> Result<SalesDataset, LoadError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers: Vec<String> = csv_reader
        .headers()
        .map_err(|e| LoadError::Format {
            format: "csv",
            message: format!("reading headers: {e}"),
        })?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    // Column positions by name, so callers may reorder or append columns.
    let mut positions = [0usize; SCHEMA_COLUMNS.len()];
    for (slot, col) in positions.iter_mut().zip(SCHEMA_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h == col)
            .ok_or(LoadError::MissingColumn(col))?;
    }
    let [cat_idx, reg_idx, date_idx, sales_idx, profit_idx, disc_idx] = positions;

    let mut orders = Vec::new();
    for (idx, result) in csv_reader.records().enumerate() {
        // 1-based over data rows, so "row 1" is the first row after the header
        let row_no = idx + 1;
        let record = result.map_err(|e| LoadError::Format {
            format: "csv",
            message: format!("row {row_no}: {e}"),
        })?;
        let field = |idx: usize| record.get(idx).unwrap_or("");

        let order = OrderRecord {
            category: non_empty(row_no, "category", field(cat_idx))?,
            region: non_empty(row_no, "region", field(reg_idx))?,
            order_date: parse_date(row_no, field(date_idx))?,
            sales: parse_number(row_no, "sales", field(sales_idx))?,
            profit: parse_number(row_no, "profit", field(profit_idx))?,
            discount: parse_number(row_no, "discount", field(disc_idx))?,
        };
        orders.push(validate(row_no, order)?);
    }

    Ok(SalesDataset::from_orders(orders))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// One record as it appears on disk, before date parsing and range checks.
#[derive(Debug, Deserialize)]
struct RawOrder {
    category: String,
    region: String,
    order_date: String,
    sales: f64,
    profit: f64,
    discount: f64,
}

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "category": "Furniture",
///     "region": "East",
///     "order_date": "2023-01-05",
///     "sales": 100.0,
///     "profit": 10.0,
///     "discount": 0.1
///   },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<SalesDataset, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    // serde reports missing fields by name, e.g. "missing field `discount`".
    let records: Vec<RawOrder> = serde_json::from_str(&text).map_err(|e| LoadError::Format {
        format: "json",
        message: e.to_string(),
    })?;

    let mut orders = Vec::with_capacity(records.len());
    for (idx, raw) in records.into_iter().enumerate() {
        let row_no = idx + 1;
        let order = OrderRecord {
            category: non_empty(row_no, "category", &raw.category)?,
            region: non_empty(row_no, "region", &raw.region)?,
            order_date: parse_date(row_no, &raw.order_date)?,
            sales: raw.sales,
            profit: raw.profit,
            discount: raw.discount,
        };
        orders.push(validate(row_no, order)?);
    }

    Ok(SalesDataset::from_orders(orders))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat order columns.
///
/// Expected schema:
/// - `category`, `region`: Utf8
/// - `order_date`: Date32 or Utf8 (ISO-8601 text)
/// - `sales`, `profit`, `discount`: Float64/Float32 (integers accepted)
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<SalesDataset, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parquet_err = |e: parquet::errors::ParquetError| LoadError::Format {
        format: "parquet",
        message: e.to_string(),
    };
    let builder = ParquetRecordBatchReaderBuilder::try_new(file).map_err(parquet_err)?;
    let reader = builder.build().map_err(parquet_err)?;

    let mut orders = Vec::new();
    let mut row_no = 1usize;

    for batch_result in reader {
        let batch = batch_result.map_err(|e| LoadError::Format {
            format: "parquet",
            message: e.to_string(),
        })?;
        let schema = batch.schema();

        let column = |name: &'static str| -> Result<&Arc<dyn Array>, LoadError> {
            let idx = schema
                .index_of(name)
                .map_err(|_| LoadError::MissingColumn(name))?;
            Ok(batch.column(idx))
        };

        let cat_col = column("category")?.clone();
        let reg_col = column("region")?.clone();
        let date_col = column("order_date")?.clone();
        let sales_col = column("sales")?.clone();
        let profit_col = column("profit")?.clone();
        let disc_col = column("discount")?.clone();

        for row in 0..batch.num_rows() {
            let order = OrderRecord {
                category: extract_string(&cat_col, row_no, "category", row)?,
                region: extract_string(&reg_col, row_no, "region", row)?,
                order_date: extract_date(&date_col, row_no, row)?,
                sales: extract_number(&sales_col, row_no, "sales", row)?,
                profit: extract_number(&profit_col, row_no, "profit", row)?,
                discount: extract_number(&disc_col, row_no, "discount", row)?,
            };
            orders.push(validate(row_no, order)?);
            row_no += 1;
        }
    }

    Ok(SalesDataset::from_orders(orders))
}

// -- Parquet / Arrow helpers --

fn extract_string(
    col: &Arc<dyn Array>,
    row_no: usize,
    column: &'static str,
    row: usize,
) -> Result<String, LoadError> {
    if col.is_null(row) {
        return Err(LoadError::bad_value(row_no, column, "null value"));
    }
    match col.data_type() {
        DataType::Utf8 => {
            let arr = col
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| LoadError::bad_value(row_no, column, "expected StringArray"))?;
            non_empty(row_no, column, arr.value(row))
        }
        DataType::LargeUtf8 => {
            // Polars writes LargeStringArray
            let arr = col.as_string::<i64>();
            non_empty(row_no, column, arr.value(row))
        }
        other => Err(LoadError::bad_value(
            row_no,
            column,
            format!("expected Utf8 column, got {other:?}"),
        )),
    }
}

fn extract_date(col: &Arc<dyn Array>, row_no: usize, row: usize) -> Result<NaiveDate, LoadError> {
    if col.is_null(row) {
        return Err(LoadError::bad_value(row_no, "order_date", "null value"));
    }
    match col.data_type() {
        DataType::Date32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Date32Array>()
                .ok_or_else(|| LoadError::bad_value(row_no, "order_date", "expected Date32Array"))?;
            arr.value_as_date(row)
                .ok_or_else(|| LoadError::bad_value(row_no, "order_date", "date out of range"))
        }
        DataType::Utf8 => {
            let arr = col
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| LoadError::bad_value(row_no, "order_date", "expected StringArray"))?;
            parse_date(row_no, arr.value(row))
        }
        DataType::LargeUtf8 => parse_date(row_no, col.as_string::<i64>().value(row)),
        other => Err(LoadError::bad_value(
            row_no,
            "order_date",
            format!("expected Date32 or Utf8 column, got {other:?}"),
        )),
    }
}

fn extract_number(
    col: &Arc<dyn Array>,
    row_no: usize,
    column: &'static str,
    row: usize,
) -> Result<f64, LoadError> {
    if col.is_null(row) {
        return Err(LoadError::bad_value(row_no, column, "null value"));
    }
    macro_rules! take {
        ($ty:ty) => {
            col.as_any()
                .downcast_ref::<$ty>()
                .ok_or_else(|| LoadError::bad_value(row_no, column, "unexpected array type"))?
                .value(row) as f64
        };
    }
    match col.data_type() {
        DataType::Float64 => Ok(take!(Float64Array)),
        DataType::Float32 => Ok(take!(Float32Array)),
        DataType::Int64 => Ok(take!(Int64Array)),
        DataType::Int32 => Ok(take!(Int32Array)),
        other => Err(LoadError::bad_value(
            row_no,
            column,
            format!("expected numeric column, got {other:?}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
category,region,order_date,sales,profit,discount
Furniture,East,2023-01-05,100,10,0.1
Office,West,2023-02-10,200,-5,0.2
Furniture,East,2023-03-01,50,5,0.0
";

    #[test]
    fn reads_well_formed_csv() {
        let ds = read_csv(SAMPLE.as_bytes()).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.orders[1].category, "Office");
        assert_eq!(ds.orders[1].profit, -5.0);
        assert_eq!(
            ds.orders[2].order_date,
            NaiveDate::from_ymd_opt(2023, 3, 1).unwrap()
        );
    }

    #[test]
    fn accepts_reordered_columns() {
        let text = "\
sales,category,region,discount,profit,order_date
9.5,Technology,South,0.0,1.5,2023-06-30
";
        let ds = read_csv(text.as_bytes()).unwrap();
        assert_eq!(ds.orders[0].sales, 9.5);
        assert_eq!(ds.orders[0].category, "Technology");
    }

    #[test]
    fn missing_column_is_reported_by_name() {
        let text = "category,region,order_date,sales,profit\nA,B,2023-01-01,1,1\n";
        let err = read_csv(text.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn("discount")));
    }

    #[test]
    fn bad_date_is_reported_with_one_based_row() {
        let text = "\
category,region,order_date,sales,profit,discount
A,B,2023-01-01,1,1,0.5
A,B,not-a-date,1,1,0.5
";
        let err = read_csv(text.as_bytes()).unwrap_err();
        match err {
            LoadError::BadValue { row, column, .. } => {
                // second data row, not the 0-based index 1
                assert_eq!(row, 2);
                assert_eq!(column, "order_date");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn json_rows_are_one_based_too() {
        let dir = std::env::temp_dir();
        let path = dir.join("sales_scope_loader_badrow.json");
        std::fs::write(
            &path,
            r#"[{"category":"Furniture","region":"East","order_date":"nope",
                "sales":1.0,"profit":0.0,"discount":0.0}]"#,
        )
        .unwrap();

        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::BadValue { row: 1, column: "order_date", .. }));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn discount_outside_unit_interval_is_rejected() {
        let text = "\
category,region,order_date,sales,profit,discount
A,B,2023-01-01,1,1,1.5
";
        let err = read_csv(text.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::BadValue { column: "discount", .. }));
    }

    #[test]
    fn negative_sales_is_rejected() {
        let text = "\
category,region,order_date,sales,profit,discount
A,B,2023-01-01,-1,1,0.5
";
        let err = read_csv(text.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::BadValue { column: "sales", .. }));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = load_file(Path::new("orders.xlsx")).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat(ext) if ext == "xlsx"));
    }

    #[test]
    fn loads_json_records() {
        let dir = std::env::temp_dir();
        let path = dir.join("sales_scope_loader_test.json");
        std::fs::write(
            &path,
            r#"[{"category":"Furniture","region":"East","order_date":"2023-01-05",
                "sales":100.0,"profit":10.0,"discount":0.1}]"#,
        )
        .unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.orders[0].region, "East");
        std::fs::remove_file(&path).ok();
    }
}
