//! JSON parsing.
//!
//! Supported inputs:
//! - A JSON array of objects: `[{"a":1}, {"a":2}]`
//! - A single JSON object: `{"a":1}`
//! - Newline-delimited JSON (NDJSON / JSON Lines): `{"a":1}\n{"a":2}\n`
//!
//! Nested fields are supported using dot paths in schema field names (e.g. `user.name`).

use std::io::Read;
use std::path::Path;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, DataType, Schema, Value};

use super::location::open_location;

/// Parse a JSON / NDJSON file into an in-memory [`DataSet`].
pub fn ingest_json_from_path(path: impl AsRef<Path>, schema: &Schema) -> IngestionResult<DataSet> {
    let path = path.as_ref();
    let mut file = open_location(path, &path.display().to_string())?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    let text = std::str::from_utf8(&bytes).map_err(|e| IngestionError::SchemaMismatch {
        message: format!("json input is not valid utf-8: {e}"),
    })?;
    ingest_json_from_str(text, schema)
}

/// Parse JSON from an in-memory string into a [`DataSet`].
pub fn ingest_json_from_str(input: &str, schema: &Schema) -> IngestionResult<DataSet> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(IngestionError::SchemaMismatch {
            message: "json input is empty".to_string(),
        });
    }

    // An array can only be a whole document; report its own error position.
    if trimmed.starts_with('[') {
        let v = serde_json::from_str::<serde_json::Value>(input).map_err(|e| IngestionError::Json {
            line: e.line(),
            source: e,
        })?;
        return ingest_json_document(v, schema);
    }

    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(v) => ingest_json_document(v, schema),
        Err(_) => {
            let mut values = Vec::new();
            // Number lines against the untrimmed input so they match the file.
            for (i, line) in input.lines().enumerate() {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let v = serde_json::from_str::<serde_json::Value>(line)
                    .map_err(|e| IngestionError::Json { line: i + 1, source: e })?;
                values.push(v);
            }
            ingest_json_values(&values, schema)
        }
    }
}

fn ingest_json_document(v: serde_json::Value, schema: &Schema) -> IngestionResult<DataSet> {
    match v {
        serde_json::Value::Array(items) => ingest_json_values(&items, schema),
        serde_json::Value::Object(_) => ingest_json_values(std::slice::from_ref(&v), schema),
        _ => Err(IngestionError::SchemaMismatch {
            message: "json must be an object, an array of objects, or NDJSON".to_string(),
        }),
    }
}

fn ingest_json_values(values: &[serde_json::Value], schema: &Schema) -> IngestionResult<DataSet> {
    let mut rows: Vec<Vec<Value>> = Vec::with_capacity(values.len());

    for (idx0, v) in values.iter().enumerate() {
        let row_num = idx0 + 1;
        let obj = v.as_object().ok_or_else(|| IngestionError::SchemaMismatch {
            message: format!("row {row_num} is not a json object"),
        })?;

        let mut row: Vec<Value> = Vec::with_capacity(schema.fields.len());
        for field in &schema.fields {
            let jv = get_by_dot_path(obj, &field.name).ok_or_else(|| IngestionError::SchemaMismatch {
                message: format!("row {row_num} missing required field '{}'", field.name),
            })?;
            row.push(convert_json_value(row_num, &field.name, field.data_type, jv)?);
        }
        rows.push(row);
    }

    Ok(DataSet::new(schema.clone(), rows))
}

fn get_by_dot_path<'a>(
    root: &'a serde_json::Map<String, serde_json::Value>,
    path: &str,
) -> Option<&'a serde_json::Value> {
    // A literal key containing dots wins over nested lookup.
    if let Some(v) = root.get(path) {
        return Some(v);
    }

    let mut segments = path.split('.');
    let mut current = root.get(segments.next()?)?;
    for segment in segments {
        match current {
            serde_json::Value::Object(map) => current = map.get(segment)?,
            _ => return None,
        }
    }
    Some(current)
}

fn convert_json_value(
    row: usize,
    column: &str,
    data_type: DataType,
    v: &serde_json::Value,
) -> IngestionResult<Value> {
    if v.is_null() {
        return Ok(Value::Null);
    }

    let parse_err = |message: &str| IngestionError::ParseError {
        row,
        column: column.to_string(),
        raw: v.to_string(),
        message: message.to_string(),
    };

    match data_type {
        DataType::Utf8 => v
            .as_str()
            .map(|s| Value::Utf8(s.to_string()))
            .ok_or_else(|| parse_err("expected string")),
        DataType::Bool => v.as_bool().map(Value::Bool).ok_or_else(|| parse_err("expected bool")),
        DataType::Int64 => {
            if let Some(n) = v.as_i64() {
                Ok(Value::Int64(n))
            } else if let Some(n) = v.as_u64() {
                i64::try_from(n)
                    .map(Value::Int64)
                    .map_err(|_| parse_err("u64 out of range for i64"))
            } else {
                Err(parse_err("expected integer number"))
            }
        }
        DataType::Float64 => v
            .as_f64()
            .map(Value::Float64)
            .ok_or_else(|| parse_err("expected number")),
    }
}

#[cfg(test)]
mod tests {
    use super::{get_by_dot_path, ingest_json_from_str};
    use crate::types::{DataType, Field, Schema};

    #[test]
    fn dot_path_prefers_literal_key() {
        let v: serde_json::Value =
            serde_json::from_str(r#"{"a.b": 1, "a": {"b": 2}, "x": {"y": {"z": 3}}}"#).unwrap();
        let obj = v.as_object().unwrap();
        assert_eq!(get_by_dot_path(obj, "a.b"), Some(&serde_json::json!(1)));
        assert_eq!(get_by_dot_path(obj, "x.y.z"), Some(&serde_json::json!(3)));
        assert_eq!(get_by_dot_path(obj, "x.q"), None);
    }

    #[test]
    fn ndjson_errors_count_leading_blank_lines() {
        let schema = Schema::new(vec![Field::new("id", DataType::Int64)]);
        let err = ingest_json_from_str("\n\n{\"id\": 1}\n{\"id\": ", &schema).unwrap_err();
        assert!(err.to_string().contains("line 4"), "{err}");
    }
}
