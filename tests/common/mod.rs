#![allow(dead_code)]

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use parquet::column::writer::ColumnWriter;
use parquet::data_type::ByteArray;
use parquet::file::properties::WriterProperties;
use parquet::file::writer::SerializedFileWriter;
use parquet::schema::parser::parse_message_type;

use recipe_ingest::types::{DataType, Field, Schema};

pub fn people_schema() -> Schema {
    Schema::new(vec![
        Field::new("id", DataType::Int64),
        Field::new("name", DataType::Utf8),
        Field::new("score", DataType::Float64),
        Field::new("active", DataType::Bool),
    ])
}

/// One parquet row: (id, name, score, active).
pub type PersonRow<'a> = (i64, &'a str, f64, bool);

/// Write `rows` as a single-row-group parquet file.
///
/// `include_active = false` drops the `active` column; `id_as_binary = true` stores ids as UTF8.
pub fn write_people_parquet(path: &Path, rows: &[PersonRow<'_>], include_active: bool, id_as_binary: bool) {
    let id_col = if id_as_binary {
        "REQUIRED BINARY id (UTF8);"
    } else {
        "REQUIRED INT64 id;"
    };
    let active_col = if include_active { "REQUIRED BOOLEAN active;" } else { "" };
    let schema_str = format!(
        "message schema {{ {id_col} REQUIRED BINARY name (UTF8); REQUIRED DOUBLE score; {active_col} }}"
    );

    let schema = Arc::new(parse_message_type(&schema_str).unwrap());
    let props = Arc::new(WriterProperties::builder().build());
    let file = File::create(path).unwrap();
    let mut writer = SerializedFileWriter::new(file, schema, props).unwrap();

    let mut rg = writer.next_row_group().unwrap();
    let mut col_idx: usize = 0;
    while let Some(mut col) = rg.next_column().unwrap() {
        match col.untyped() {
            ColumnWriter::Int64ColumnWriter(w) => {
                let ids: Vec<i64> = rows.iter().map(|r| r.0).collect();
                w.write_batch(&ids, None, None).unwrap();
            }
            ColumnWriter::ByteArrayColumnWriter(w) => {
                // Column 0 is `id` only when ids are binary; otherwise this is `name`.
                let values: Vec<ByteArray> = if id_as_binary && col_idx == 0 {
                    rows.iter().map(|r| ByteArray::from(r.0.to_string().as_str())).collect()
                } else {
                    rows.iter().map(|r| ByteArray::from(r.1)).collect()
                };
                w.write_batch(&values, None, None).unwrap();
            }
            ColumnWriter::DoubleColumnWriter(w) => {
                let scores: Vec<f64> = rows.iter().map(|r| r.2).collect();
                w.write_batch(&scores, None, None).unwrap();
            }
            ColumnWriter::BoolColumnWriter(w) => {
                let actives: Vec<bool> = rows.iter().map(|r| r.3).collect();
                w.write_batch(&actives, None, None).unwrap();
            }
            _ => panic!("unexpected column writer in test"),
        }
        col.close().unwrap();
        col_idx += 1;
    }
    rg.close().unwrap();
    writer.close().unwrap();
}

pub const ADA_AND_GRACE: [PersonRow<'static>; 2] = [(1, "Ada", 98.5, true), (2, "Grace", 87.25, false)];
