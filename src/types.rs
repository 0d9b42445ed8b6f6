//! Core data model types for loaded tables.
//!
//! Every loader produces an in-memory [`DataSet`] shaped by a [`Schema`] (a list of typed
//! [`Field`]s). Files belonging to the same logical dataset must produce identical schemas so
//! their rows can be concatenated.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Logical data type for a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// 64-bit signed integer.
    #[serde(alias = "integer", alias = "long")]
    Int64,
    /// 64-bit floating point number.
    #[serde(alias = "double", alias = "float")]
    Float64,
    /// Boolean.
    #[serde(alias = "boolean")]
    Bool,
    /// UTF-8 string.
    #[serde(alias = "string", alias = "str")]
    Utf8,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Int64 => "int64",
            Self::Float64 => "float64",
            Self::Bool => "bool",
            Self::Utf8 => "utf8",
        };
        f.write_str(s)
    }
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    /// Field/column name.
    pub name: String,
    /// Field data type.
    #[serde(rename = "type")]
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// A list of fields describing the expected shape of incoming data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// Renders as `name:type` pairs, e.g. `id:int64, name:utf8`.
impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}:{}", field.name, field.data_type)?;
        }
        Ok(())
    }
}

/// A single typed value in a [`DataSet`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
}

/// In-memory tabular dataset.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as the [`Schema`] fields.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl DataSet {
    /// Create a dataset from schema and rows.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns the values of one column, in row order.
    ///
    /// A row too short to hold the column yields [`Value::Null`] for it.
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        static NULL: Value = Value::Null;
        let idx = self.schema.index_of(name)?;
        Some(self.rows.iter().map(|row| row.get(idx).unwrap_or(&NULL)).collect())
    }

    /// First row whose width differs from the schema, as `(row_index, width)`.
    pub fn first_ragged_row(&self) -> Option<(usize, usize)> {
        let expected = self.schema.fields.len();
        self.rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != expected)
            .map(|(idx, row)| (idx, row.len()))
    }

    /// Move all rows of `other` to the end of this dataset.
    ///
    /// Returns `other` back unchanged if its schema differs from `self.schema`.
    pub fn append(&mut self, other: DataSet) -> Result<(), DataSet> {
        if other.schema != self.schema {
            return Err(other);
        }
        self.rows.extend(other.rows);
        Ok(())
    }
}
