use std::borrow::Cow;
use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::DataLoadError;
use super::model::{Record, Table};

/// Columns every source must provide, in the order rows are cleaned.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "model_year",
    "odometer",
    "price",
    "condition",
    "fuel",
    "model",
    "type",
];

const MODEL_YEAR: usize = 0;
const ODOMETER: usize = 1;
const PRICE: usize = 2;
const CONDITION: usize = 3;
const FUEL: usize = 4;
const MODEL: usize = 5;
const TYPE: usize = 6;

/// Text cells treated as missing, matching the usual dataframe NA markers.
const MISSING_TOKENS: [&str; 10] = [
    "NA", "N/A", "n/a", "NaN", "nan", "-nan", "null", "NULL", "None", "#N/A",
];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a listings table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one listing per line (recommended)
/// * `.json`    – `[{ "model_year": 2011, "price": 9400, ... }, ...]`
/// * `.parquet` – flat string / integer / float columns
pub fn load_file(path: &Path) -> Result<Table, DataLoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => load_csv(std::fs::File::open(path)?)?,
        "json" => load_json(&std::fs::read_to_string(path)?)?,
        "parquet" | "pq" => load_parquet(std::fs::File::open(path)?)?,
        other => return Err(DataLoadError::UnsupportedFormat(other.to_string())),
    };

    log::info!(
        "Loaded {} listings from {} ({} rows dropped for missing required fields)",
        table.len(),
        path.display(),
        table.dropped_rows()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// Row cleaning shared by every format
// ---------------------------------------------------------------------------

/// A raw cell as it comes out of a source, before typing.
#[derive(Debug, Clone)]
enum Cell<'a> {
    Missing,
    Text(Cow<'a, str>),
    Number(f64),
}

/// Accumulates cleaned records and counts dropped rows.
#[derive(Default)]
struct Cleaner {
    records: Vec<Record>,
    dropped: usize,
}

impl Cleaner {
    /// Type one row. `row` is the 1-based data row used in error messages.
    fn push(&mut self, row: usize, cells: &[Cell<'_>]) -> Result<(), DataLoadError> {
        let model_year = number_cell(&cells[MODEL_YEAR], row, MODEL_YEAR)?;
        let odometer = number_cell(&cells[ODOMETER], row, ODOMETER)?;
        let price = number_cell(&cells[PRICE], row, PRICE)?;
        let condition = text_cell(&cells[CONDITION]);
        let fuel = text_cell(&cells[FUEL]);

        let (Some(model_year), Some(odometer), Some(price), Some(condition), Some(fuel)) =
            (model_year, odometer, price, condition, fuel)
        else {
            log::debug!("Row {row}: dropped, missing a required field");
            self.dropped += 1;
            return Ok(());
        };

        self.records.push(Record {
            model_year: whole_year(model_year, row)?,
            odometer,
            price,
            condition,
            fuel,
            model: text_cell(&cells[MODEL]),
            vehicle_type: text_cell(&cells[TYPE]),
        });
        Ok(())
    }

    fn finish(self) -> Table {
        Table::from_records(self.records, self.dropped)
    }
}

fn is_missing_token(s: &str) -> bool {
    s.is_empty() || MISSING_TOKENS.contains(&s)
}

fn invalid(row: usize, column: usize, reason: String) -> DataLoadError {
    DataLoadError::InvalidValue {
        row,
        column: REQUIRED_COLUMNS[column].to_string(),
        reason,
    }
}

fn number_cell(cell: &Cell<'_>, row: usize, column: usize) -> Result<Option<f64>, DataLoadError> {
    let value = match cell {
        Cell::Missing => return Ok(None),
        Cell::Number(v) => *v,
        Cell::Text(s) => {
            let s = s.trim();
            if is_missing_token(s) {
                return Ok(None);
            }
            s.parse::<f64>()
                .map_err(|_| invalid(row, column, format!("'{s}' is not a number")))?
        }
    };
    if value.is_nan() {
        return Ok(None);
    }
    if !value.is_finite() {
        return Err(invalid(row, column, format!("{value} is not finite")));
    }
    Ok(Some(value))
}

fn text_cell(cell: &Cell<'_>) -> Option<String> {
    match cell {
        Cell::Missing => None,
        Cell::Number(v) if v.is_nan() => None,
        Cell::Number(v) => Some(v.to_string()),
        Cell::Text(s) => {
            let s = s.trim();
            (!is_missing_token(s)).then(|| s.to_string())
        }
    }
}

/// Model years arrive as `2011` or `2011.0`; anything fractional is malformed.
fn whole_year(value: f64, row: usize) -> Result<i32, DataLoadError> {
    if value.fract() != 0.0 || value < f64::from(i32::MIN) || value > f64::from(i32::MAX) {
        return Err(invalid(row, MODEL_YEAR, format!("{value} is not a whole year")));
    }
    Ok(value as i32)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one listing per line.
/// Extra columns are ignored; column order is free. Rows shorter than the
/// header are read with their trailing cells missing.
pub fn load_csv<R: Read>(reader: R) -> Result<Table, DataLoadError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let positions = REQUIRED_COLUMNS
        .iter()
        .map(|col| {
            headers
                .iter()
                .position(|h| h == col)
                .ok_or_else(|| DataLoadError::MissingColumn(col.to_string()))
        })
        .collect::<Result<Vec<usize>, _>>()?;

    let mut cleaner = Cleaner::default();
    for (row_no, result) in reader.records().enumerate() {
        let record = result?;
        let cells: Vec<Cell<'_>> = positions
            .iter()
            .map(|&idx| {
                record
                    .get(idx)
                    .map_or(Cell::Missing, |s| Cell::Text(Cow::Borrowed(s)))
            })
            .collect();
        cleaner.push(row_no + 1, &cells)?;
    }

    Ok(cleaner.finish())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, as `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "model_year": 2011.0, "odometer": 145000, "price": 9400,
///     "condition": "good", "fuel": "gas", "model": "bmw x5", "type": "SUV" },
///   ...
/// ]
/// ```
///
/// A key absent from one object is a missing value; a key absent from every
/// object is a missing column.
pub fn load_json(text: &str) -> Result<Table, DataLoadError> {
    let root: JsonValue = serde_json::from_str(text)?;
    let rows = root
        .as_array()
        .ok_or_else(|| DataLoadError::InvalidFormat("expected top-level JSON array".to_string()))?;

    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let mut cleaner = Cleaner::default();

    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .ok_or_else(|| DataLoadError::InvalidFormat(format!("row {} is not a JSON object", i + 1)))?;

        let cells: Vec<Cell<'_>> = REQUIRED_COLUMNS
            .iter()
            .map(|col| match obj.get(*col) {
                None | Some(JsonValue::Null) => Cell::Missing,
                Some(JsonValue::String(s)) => Cell::Text(Cow::Borrowed(s.as_str())),
                Some(JsonValue::Number(n)) => n.as_f64().map_or(Cell::Missing, Cell::Number),
                Some(other) => Cell::Text(Cow::Owned(other.to_string())),
            })
            .collect();
        seen.extend(REQUIRED_COLUMNS.iter().copied().filter(|col| obj.contains_key(*col)));

        cleaner.push(i + 1, &cells)?;
    }

    if let Some(col) = REQUIRED_COLUMNS.iter().find(|col| !seen.contains(*col)) {
        return Err(DataLoadError::MissingColumn(col.to_string()));
    }

    Ok(cleaner.finish())
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of listings.
///
/// Expected schema: the seven listing columns as Utf8 / LargeUtf8, Int32 /
/// Int64 or Float32 / Float64. Nullable columns are fine; other columns are
/// ignored. Works with files written by both **Pandas** and **Polars**.
pub fn load_parquet(file: std::fs::File) -> Result<Table, DataLoadError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    // Resolve columns from the file schema so empty files are checked too.
    let schema = builder.schema().clone();
    let positions = REQUIRED_COLUMNS
        .iter()
        .map(|col| {
            schema
                .index_of(col)
                .map_err(|_| DataLoadError::MissingColumn(col.to_string()))
        })
        .collect::<Result<Vec<usize>, _>>()?;

    let reader = builder.build()?;
    let mut cleaner = Cleaner::default();
    let mut row_no = 0;

    for batch_result in reader {
        let batch = batch_result?;
        let columns: Vec<&ArrayRef> = positions.iter().map(|&idx| batch.column(idx)).collect();

        for row in 0..batch.num_rows() {
            row_no += 1;
            let cells = columns
                .iter()
                .map(|col| arrow_cell(col, row))
                .collect::<Result<Vec<Cell<'_>>, _>>()?;
            cleaner.push(row_no, &cells)?;
        }
    }

    Ok(cleaner.finish())
}

/// Extract a single raw cell from an Arrow column at a given row.
fn arrow_cell(col: &ArrayRef, row: usize) -> Result<Cell<'_>, DataLoadError> {
    if col.is_null(row) {
        return Ok(Cell::Missing);
    }
    let cell = match col.data_type() {
        DataType::Utf8 => Cell::Text(Cow::Borrowed(col.as_string::<i32>().value(row))),
        DataType::LargeUtf8 => Cell::Text(Cow::Borrowed(col.as_string::<i64>().value(row))),
        DataType::Int32 => Cell::Number(f64::from(col.as_primitive::<Int32Type>().value(row))),
        DataType::Int64 => Cell::Number(col.as_primitive::<Int64Type>().value(row) as f64),
        DataType::Float32 => Cell::Number(f64::from(col.as_primitive::<Float32Type>().value(row))),
        DataType::Float64 => Cell::Number(col.as_primitive::<Float64Type>().value(row)),
        other => {
            return Err(DataLoadError::InvalidFormat(format!(
                "unsupported Parquet column type {other:?}"
            )))
        }
    };
    Ok(cell)
}
