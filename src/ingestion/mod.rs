//! File loading and dataset ingestion.
//!
//! - [`loader`]: the [`FileLoader`] contract, the [`UnimplementedLoader`] placeholder, the
//!   schema-first [`SchemaLoader`], and the [`LoaderRegistry`]
//! - [`dataset`]: expands a dataset location into files, loads each one and concatenates the
//!   results ([`ingest_dataset`])
//! - [`location`]: location strings → local paths / file lists
//! - [`observability`]: per-file success/failure hooks
//!
//! Format-specific parsers are available under [`csv`], [`json`] and [`parquet`].

pub mod csv;
pub mod dataset;
pub mod json;
pub mod loader;
pub mod location;
pub mod observability;
pub mod parquet;

pub use dataset::{ingest_dataset, ingest_from_config, IngestOptions};
pub use loader::{FileLoader, IngestionFormat, LoaderRegistry, SchemaLoader, UnimplementedLoader};
pub use observability::{
    CompositeObserver, IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats, TracingObserver,
};
