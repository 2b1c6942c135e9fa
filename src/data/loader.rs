use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type,
    UInt32Type, UInt64Type, UInt8Type,
};
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Column, Dataset, Value};

/// Column name pandas uses when it stores a non-trivial index in Parquet.
const PANDAS_INDEX_COLUMN: &str = "__index_level_0__";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a tabular dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – any flat schema; a pandas index column becomes the index
/// * `.json`    – `[{ "col": value, ... }, ...]` or `{ "col": [values], ... }`
/// * `.csv`     – header row with column names, cell types are inferred
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }?;
    log::debug!(
        "loaded {} ({} columns, {} rows)",
        path.display(),
        dataset.columns().len(),
        dataset.row_count()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records orientation (`df.to_json(orient='records')`):
///
/// ```json
/// [ { "scores": 50, "grades": "A" }, { "scores": 60, "grades": "B" } ]
/// ```
///
/// Keys missing from a record become nulls.  The list orientation
/// `{ "scores": [50, 60], "grades": ["A", "B"] }` is accepted as well.
fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;
    dataset_from_json(&root)
}

fn dataset_from_json(root: &JsonValue) -> Result<Dataset> {
    match root {
        JsonValue::Array(records) => {
            let mut columns: Vec<Column> = Vec::new();
            for (i, rec) in records.iter().enumerate() {
                let obj = rec
                    .as_object()
                    .with_context(|| format!("Row {i} is not a JSON object"))?;
                for key in obj.keys() {
                    if !columns.iter().any(|c| &c.name == key) {
                        // Earlier rows lacked this key.
                        columns.push(Column {
                            name: key.clone(),
                            values: vec![Value::Null; i],
                        });
                    }
                }
                for col in &mut columns {
                    col.values
                        .push(obj.get(&col.name).map_or(Value::Null, json_to_value));
                }
            }
            Ok(Dataset::new(columns)?)
        }
        JsonValue::Object(map) => {
            let columns = map
                .iter()
                .map(|(name, values)| {
                    let arr = values
                        .as_array()
                        .with_context(|| format!("Column '{name}' is not a JSON array"))?;
                    Ok(Column {
                        name: name.clone(),
                        values: arr.iter().map(json_to_value).collect(),
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Dataset::new(columns)?)
        }
        _ => bail!("Expected a top-level JSON array or object"),
    }
}

fn json_to_value(val: &JsonValue) -> Value {
    match val {
        JsonValue::String(s) => Value::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Null => Value::Null,
        other => Value::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per row.  Every
/// cell is typed on its own (integer, float, bool, or text); empty cells
/// are nulls.
fn load_csv(path: &Path) -> Result<Dataset> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let mut columns: Vec<Column> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| Column {
            name: h.to_string(),
            values: Vec::new(),
        })
        .collect();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        for (col, cell) in columns.iter_mut().zip(record.iter()) {
            col.values.push(guess_value_type(cell));
        }
    }

    Ok(Dataset::new(columns)?)
}

fn guess_value_type(s: &str) -> Value {
    let s = s.trim();
    if s.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return Value::Float(f);
    }
    if s == "true" || s == "false" {
        return Value::Bool(s == "true");
    }
    Value::String(s.to_string())
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with a flat schema.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).  Nested columns are kept as their
/// display text.
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let schema = builder.schema().clone();
    let reader = builder.build().context("building parquet reader")?;

    let mut columns: Vec<Column> = schema
        .fields()
        .iter()
        .map(|f| Column {
            name: f.name().clone(),
            values: Vec::new(),
        })
        .collect();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (col_idx, col) in columns.iter_mut().enumerate() {
            let array = batch.column(col_idx);
            col.values
                .extend((0..batch.num_rows()).map(|row| extract_value(array, row)));
        }
    }

    let index = columns
        .iter()
        .position(|c| c.name == PANDAS_INDEX_COLUMN)
        .map(|pos| columns.remove(pos));
    let dataset = Dataset::new(columns)?;
    match index {
        Some(index) => Ok(dataset.with_index(index)?),
        None => Ok(dataset),
    }
}

// -- Arrow helpers --

/// Extract a single cell from an Arrow column at a given row.
fn extract_value(col: &ArrayRef, row: usize) -> Value {
    if col.is_null(row) {
        return Value::Null;
    }
    let typed = match col.data_type() {
        DataType::Utf8 => col
            .as_string_opt::<i32>()
            .map(|a| Value::String(a.value(row).to_string())),
        DataType::LargeUtf8 => col
            .as_string_opt::<i64>()
            .map(|a| Value::String(a.value(row).to_string())),
        DataType::Int8 => col
            .as_primitive_opt::<Int8Type>()
            .map(|a| Value::Integer(a.value(row) as i64)),
        DataType::Int16 => col
            .as_primitive_opt::<Int16Type>()
            .map(|a| Value::Integer(a.value(row) as i64)),
        DataType::Int32 => col
            .as_primitive_opt::<Int32Type>()
            .map(|a| Value::Integer(a.value(row) as i64)),
        DataType::Int64 => col
            .as_primitive_opt::<Int64Type>()
            .map(|a| Value::Integer(a.value(row))),
        DataType::UInt8 => col
            .as_primitive_opt::<UInt8Type>()
            .map(|a| Value::Integer(a.value(row) as i64)),
        DataType::UInt16 => col
            .as_primitive_opt::<UInt16Type>()
            .map(|a| Value::Integer(a.value(row) as i64)),
        DataType::UInt32 => col
            .as_primitive_opt::<UInt32Type>()
            .map(|a| Value::Integer(a.value(row) as i64)),
        DataType::UInt64 => col.as_primitive_opt::<UInt64Type>().map(|a| {
            let v = a.value(row);
            i64::try_from(v).map_or(Value::Float(v as f64), Value::Integer)
        }),
        DataType::Float32 => col
            .as_primitive_opt::<Float32Type>()
            .map(|a| Value::Float(a.value(row) as f64)),
        DataType::Float64 => col
            .as_primitive_opt::<Float64Type>()
            .map(|a| Value::Float(a.value(row))),
        DataType::Boolean => col.as_boolean_opt().map(|a| Value::Bool(a.value(row))),
        DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _) => {
            array_value_to_string(col, row).ok().map(Value::Date)
        }
        _ => None,
    };
    typed.unwrap_or_else(|| {
        array_value_to_string(col, row)
            .map(Value::String)
            .unwrap_or(Value::Null)
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn csv_cells_are_typed_individually() {
        let file = write_temp(".csv", "scores,grades,passed\n50,A,true\n60.5,B,false\n,C,true\n");
        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.row_count(), 3);
        let scores = ds.column("scores").unwrap();
        assert_eq!(
            scores.values,
            vec![Value::Integer(50), Value::Float(60.5), Value::Null]
        );
        assert_eq!(ds.column("grades").unwrap().values[2], Value::String("C".into()));
        assert_eq!(ds.column("passed").unwrap().values[1], Value::Bool(false));
    }

    #[test]
    fn json_records_fill_missing_keys_with_null() {
        let file = write_temp(
            ".json",
            r#"[{"scores": 50, "grades": "A"}, {"scores": 60}, {"grades": "C", "extra": 1.5}]"#,
        );
        let ds = load_file(file.path()).unwrap();
        let names: Vec<&str> = ds.column_names().collect();
        assert_eq!(names, vec!["scores", "grades", "extra"]);
        assert_eq!(ds.column("grades").unwrap().values[1], Value::Null);
        assert_eq!(
            ds.column("extra").unwrap().values,
            vec![Value::Null, Value::Null, Value::Float(1.5)]
        );
    }

    #[test]
    fn json_list_orientation_is_accepted() {
        let file = write_temp(".json", r#"{"a": [1, 2], "b": ["x", null]}"#);
        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.column("b").unwrap().values[1], Value::Null);

        let ragged = write_temp(".json", r#"{"a": [1, 2], "b": ["x"]}"#);
        assert!(load_file(ragged.path()).is_err());
    }

    #[test]
    fn parquet_index_column_becomes_dataset_index() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("revenue", DataType::Float64, false),
            Field::new("store", DataType::Utf8, false),
            Field::new(PANDAS_INDEX_COLUMN, DataType::Int64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Float64Array::from(vec![1.5, 2.5])),
                Arc::new(StringArray::from(vec!["north", "south"])),
                Arc::new(Int64Array::from(vec![100, 200])),
            ],
        )
        .unwrap();
        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(file.path()).unwrap();
        let names: Vec<&str> = ds.column_names().collect();
        assert_eq!(names, vec!["revenue", "store"]);
        assert_eq!(ds.column("revenue").unwrap().values[1], Value::Float(2.5));
        assert_eq!(
            ds.index().unwrap().values,
            vec![Value::Integer(100), Value::Integer(200)]
        );
    }

    #[test]
    fn unsupported_extension_is_an_error() {
        let file = write_temp(".xlsx", "");
        assert!(load_file(file.path()).is_err());
    }
}
