//! Parquet parsing.

use std::collections::HashSet;
use std::path::Path;

use parquet::file::reader::{ChunkReader, FileReader};
use parquet::file::serialized_reader::SerializedFileReader;
use parquet::record::{Field, Row};

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, DataType, Schema, Value};

use super::location::open_location;

/// Parse a Parquet file into an in-memory [`DataSet`].
///
/// Every schema field must exist as a Parquet leaf column (by dotted column path). Rows are read
/// with the record API; a row that fails to decode aborts the whole file.
pub fn ingest_parquet_from_path(path: impl AsRef<Path>, schema: &Schema) -> IngestionResult<DataSet> {
    let path = path.as_ref();
    let file = open_location(path, &path.display().to_string())?;
    let reader = SerializedFileReader::new(file)?;

    let available_columns = parquet_leaf_column_paths(&reader);
    for field in &schema.fields {
        if !available_columns.contains(field.name.as_str()) {
            return Err(IngestionError::SchemaMismatch {
                message: format!("missing required column '{}'", field.name),
            });
        }
    }

    let mut rows: Vec<Vec<Value>> = Vec::new();
    for (idx0, row_res) in reader.into_iter().enumerate() {
        let row_num = idx0 + 1;
        let row = row_res?;

        let mut out_row: Vec<Value> = Vec::with_capacity(schema.fields.len());
        for f in &schema.fields {
            let v = lookup(&row, &f.name).ok_or_else(|| IngestionError::SchemaMismatch {
                message: format!("row {row_num} missing required column '{}'", f.name),
            })?;
            out_row.push(convert_parquet_field(row_num, &f.name, f.data_type, v)?);
        }
        rows.push(out_row);
    }

    Ok(DataSet::new(schema.clone(), rows))
}

/// Find a field by top-level name, or by dotted path through nested groups.
fn lookup<'a>(row: &'a Row, path: &str) -> Option<&'a Field> {
    let top = |row: &'a Row, name: &str| {
        row.get_column_iter()
            .find(|(n, _)| n.as_str() == name)
            .map(|(_, f)| f)
    };
    if let Some(f) = top(row, path) {
        return Some(f);
    }

    let mut segments = path.split('.');
    let mut current = top(row, segments.next()?)?;
    for segment in segments {
        match current {
            Field::Group(group) => current = top(group, segment)?,
            _ => return None,
        }
    }
    Some(current)
}

fn parquet_leaf_column_paths<R: ChunkReader + 'static>(
    reader: &SerializedFileReader<R>,
) -> HashSet<String> {
    reader
        .metadata()
        .file_metadata()
        .schema_descr()
        .columns()
        .iter()
        .map(|c| c.path().string())
        .collect()
}

fn convert_parquet_field(row: usize, column: &str, data_type: DataType, f: &Field) -> IngestionResult<Value> {
    if matches!(f, Field::Null) {
        return Ok(Value::Null);
    }

    let parse_err = |message: &str| IngestionError::ParseError {
        row,
        column: column.to_string(),
        raw: f.to_string(),
        message: message.to_string(),
    };

    match data_type {
        DataType::Utf8 => match f {
            Field::Str(s) => Ok(Value::Utf8(s.clone())),
            _ => Err(parse_err("expected string")),
        },
        DataType::Bool => match f {
            Field::Bool(b) => Ok(Value::Bool(*b)),
            _ => Err(parse_err("expected bool")),
        },
        DataType::Int64 => match f {
            Field::Byte(v) => Ok(Value::Int64(i64::from(*v))),
            Field::Short(v) => Ok(Value::Int64(i64::from(*v))),
            Field::Int(v) => Ok(Value::Int64(i64::from(*v))),
            Field::Long(v) => Ok(Value::Int64(*v)),
            Field::UByte(v) => Ok(Value::Int64(i64::from(*v))),
            Field::UShort(v) => Ok(Value::Int64(i64::from(*v))),
            Field::UInt(v) => Ok(Value::Int64(i64::from(*v))),
            Field::ULong(v) => i64::try_from(*v)
                .map(Value::Int64)
                .map_err(|_| parse_err("u64 out of range for i64")),
            _ => Err(parse_err("expected integer")),
        },
        DataType::Float64 => match f {
            Field::Float(v) => Ok(Value::Float64(f64::from(*v))),
            Field::Double(v) => Ok(Value::Float64(*v)),
            _ => Err(parse_err("expected number")),
        },
    }
}
