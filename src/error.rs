use std::error::Error as StdError;

use thiserror::Error;

/// Convenience result type for ingestion operations.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Error type returned by loaders and dataset ingestion.
///
/// A single enum is shared by the built-in parsers, user-supplied [`crate::ingestion::FileLoader`]s
/// and the dataset-level concatenation step. Use [`IngestionError::kind`] to branch on the broad
/// category instead of matching every variant.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// No parsing logic exists for this file's format.
    ///
    /// This is what the placeholder loader returns for every location.
    #[error("unsupported format '{format}' for location '{location}'")]
    UnsupportedFormat { location: String, format: String },

    /// The location does not exist.
    #[error("location not found: '{location}'")]
    NotFound { location: String },

    /// The location string cannot be mapped to something this crate can read (e.g. `s3://`).
    #[error("cannot read location '{location}': {reason}")]
    UnreadableLocation { location: String, reason: String },

    /// Underlying I/O error (e.g. permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV/TSV decoding error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Malformed JSON / NDJSON content.
    #[error("json error at line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// Parquet decoding error.
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// The input does not conform to the provided schema (missing required fields/columns, etc.).
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// A value could not be parsed into the required [`crate::types::DataType`].
    #[error("failed to parse value at row {row} column '{column}': {message} (raw='{raw}')")]
    ParseError {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },

    /// A file produced a table whose schema differs from the rest of the dataset.
    #[error("inconsistent schema in '{location}': expected [{expected}], found [{found}]")]
    InconsistentSchema {
        location: String,
        expected: String,
        found: String,
    },

    /// Invalid ingest configuration (unknown loader, bad YAML, ...).
    #[error("config error: {message}")]
    Config { message: String },
}

/// Broad classification of an [`IngestionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No loader logic for the format.
    UnsupportedFormat,
    /// The location does not exist.
    NotFound,
    /// The location exists (or might) but could not be read.
    Io,
    /// The content could not be decoded into a well-formed table.
    Parse,
    /// Tables from different files of one dataset disagree on schema.
    Schema,
    /// The ingest configuration is invalid.
    Config,
}

impl IngestionError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::UnreadableLocation { .. } => ErrorKind::Io,
            Self::Io(e) if e.kind() == std::io::ErrorKind::NotFound => ErrorKind::NotFound,
            Self::Io(_) => ErrorKind::Io,
            Self::Csv(e) => match e.kind() {
                csv::ErrorKind::Io(_) => ErrorKind::Io,
                _ => ErrorKind::Parse,
            },
            // Parquet errors sometimes wrap I/O, but not always in a structured way.
            Self::Parquet(e) if error_chain_contains_io(e) => ErrorKind::Io,
            Self::Parquet(_) => ErrorKind::Parse,
            Self::Json { .. } | Self::SchemaMismatch { .. } | Self::ParseError { .. } => {
                ErrorKind::Parse
            }
            Self::InconsistentSchema { .. } => ErrorKind::Schema,
            Self::Config { .. } => ErrorKind::Config,
        }
    }

    pub(crate) fn unsupported(location: &str, format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            location: location.to_owned(),
            format: format.into(),
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

fn error_chain_contains_io(e: &(dyn StdError + 'static)) -> bool {
    let mut cur: Option<&(dyn StdError + 'static)> = Some(e);
    while let Some(err) = cur {
        if err.is::<std::io::Error>() {
            return true;
        }
        cur = err.source();
    }
    false
}
