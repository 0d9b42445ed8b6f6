//! `recipe-ingest` implements the ingest-side extension point of a regression recipe: a
//! [`ingestion::FileLoader`] maps one dataset file location to one typed in-memory
//! [`types::DataSet`], and [`ingestion::ingest_dataset`] runs a loader over every file of a
//! dataset and concatenates the results.
//!
//! ## The loader contract
//!
//! ```text
//! fn load_file(&self, location: &str) -> IngestionResult<DataSet>
//! ```
//!
//! - called once per file; no state is shared between calls, so calls may run in parallel
//! - files of the same dataset must produce the same [`types::Schema`]
//! - failures are typed: [`IngestionError::UnsupportedFormat`] when no parsing logic exists for
//!   the format (the placeholder [`ingestion::UnimplementedLoader`] always fails this way),
//!   parse errors for malformed content, [`IngestionError::NotFound`] / [`IngestionError::Io`]
//!   for unreadable locations. [`IngestionError::kind`] groups them.
//!
//! ## Built-in formats
//!
//! [`ingestion::SchemaLoader`] implements the contract for files auto-detected by extension:
//!
//! - **CSV**: `.csv`; **TSV**: `.tsv`
//! - **JSON**: `.json` (array-of-objects or single object), `.ndjson` / `.jsonl`
//! - **Parquet**: `.parquet`, `.pq`
//!
//! Cells are typed [`types::Value`]s matching the schema ([`types::DataType::Int64`],
//! [`types::DataType::Float64`], [`types::DataType::Bool`], [`types::DataType::Utf8`]). Empty
//! cells, empty strings and JSON `null` map to [`types::Value::Null`].
//!
//! ## Custom loaders
//!
//! ```rust
//! use recipe_ingest::ingestion::{FileLoader, LoaderRegistry};
//! use recipe_ingest::types::{DataSet, DataType, Field, Schema, Value};
//! use recipe_ingest::{ErrorKind, IngestionResult};
//!
//! fn load_pipe_delimited(location: &str) -> IngestionResult<DataSet> {
//!     let text = std::fs::read_to_string(location)?;
//!     let schema = Schema::new(vec![Field::new("line", DataType::Utf8)]);
//!     let rows = text.lines().map(|l| vec![Value::Utf8(l.to_string())]).collect();
//!     Ok(DataSet::new(schema, rows))
//! }
//!
//! let mut registry = LoaderRegistry::new();
//! registry.register("load_pipe_delimited", load_pipe_delimited);
//!
//! // No loader configured: the placeholder refuses instead of returning an empty table.
//! let placeholder = registry.resolve(None).unwrap();
//! let err = placeholder.load_file("data/sample.xyz").unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: loader contract, built-in parsers, dataset ingestion, observer hooks
//! - [`config`]: the YAML `ingest` step block
//! - [`types`]: schema + in-memory dataset types
//! - [`error`]: error types

pub mod config;
pub mod error;
pub mod ingestion;
pub mod types;

pub use error::{ErrorKind, IngestionError, IngestionResult};
