//! The file-loading contract and its implementations.
//!
//! A [`FileLoader`] maps one dataset file location to one [`DataSet`]. The ingest step calls it
//! once per file and concatenates the results (see [`super::dataset`]).
//!
//! - [`UnimplementedLoader`] is the placeholder: it fails every call with
//!   [`IngestionError::UnsupportedFormat`] instead of returning an empty table.
//! - [`SchemaLoader`] parses CSV/TSV/JSON/Parquet into a fixed [`Schema`].
//! - Any `Fn(&str) -> IngestionResult<DataSet> + Send + Sync` closure is a loader too.
//! - [`LoaderRegistry`] holds named loaders so configuration can refer to them.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, Schema};

use super::location::resolve_location;
use super::{csv, json, parquet};

/// Loads a single dataset file into a typed table.
///
/// Implementations must not keep mutable state between calls: the same location must yield an
/// equivalent table every time (as long as the file is unchanged), and calls for different
/// locations may run concurrently.
///
/// Errors:
///
/// - [`IngestionError::UnsupportedFormat`] when no parsing logic exists for the file's format
/// - a parse-kind error (see [`crate::ErrorKind::Parse`]) when the content is malformed
/// - [`IngestionError::NotFound`] / [`IngestionError::Io`] when the location cannot be read
pub trait FileLoader: Send + Sync {
    /// Load the file at `location`.
    fn load_file(&self, location: &str) -> IngestionResult<DataSet>;
}

impl<F> FileLoader for F
where
    F: Fn(&str) -> IngestionResult<DataSet> + Send + Sync,
{
    fn load_file(&self, location: &str) -> IngestionResult<DataSet> {
        self(location)
    }
}

/// Supported built-in formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IngestionFormat {
    /// Comma-separated values.
    Csv,
    /// Tab-separated values.
    Tsv,
    /// JSON array-of-objects, single object, or NDJSON.
    Json,
    /// Apache Parquet.
    Parquet,
}

impl IngestionFormat {
    /// Parse an ingestion format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "tsv" | "tab" => Some(Self::Tsv),
            "json" | "ndjson" | "jsonl" => Some(Self::Json),
            "parquet" | "pq" => Some(Self::Parquet),
            _ => None,
        }
    }

    /// Infer the format of `path` from its extension.
    ///
    /// `location` is the caller's original string, used in the error.
    pub fn infer(path: &Path, location: &str) -> IngestionResult<Self> {
        let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
        Self::from_extension(ext).ok_or_else(|| {
            IngestionError::unsupported(location, if ext.is_empty() { "<none>" } else { ext })
        })
    }
}

impl fmt::Display for IngestionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::Json => "json",
            Self::Parquet => "parquet",
        };
        f.write_str(s)
    }
}

impl FromStr for IngestionFormat {
    type Err = IngestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s.trim())
            .ok_or_else(|| IngestionError::config(format!("unknown ingestion format '{s}'")))
    }
}

/// The placeholder loader.
///
/// Every call fails with [`IngestionError::UnsupportedFormat`], naming the location's extension.
/// It never touches the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnimplementedLoader;

impl FileLoader for UnimplementedLoader {
    fn load_file(&self, location: &str) -> IngestionResult<DataSet> {
        let ext = Path::new(location)
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("<none>");
        Err(IngestionError::unsupported(location, ext))
    }
}

/// Schema-first loader backed by the built-in parsers.
///
/// If no format is forced with [`SchemaLoader::with_format`], it is inferred from the location's
/// extension; an unknown extension fails with [`IngestionError::UnsupportedFormat`].
///
/// ```no_run
/// use recipe_ingest::ingestion::{FileLoader, SchemaLoader};
/// use recipe_ingest::types::{DataType, Field, Schema};
///
/// # fn main() -> Result<(), recipe_ingest::IngestionError> {
/// let loader = SchemaLoader::new(Schema::new(vec![
///     Field::new("fixed_acidity", DataType::Float64),
///     Field::new("quality", DataType::Int64),
/// ]));
/// let ds = loader.load_file("data/wine.csv")?;
/// println!("rows={}", ds.row_count());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SchemaLoader {
    schema: Schema,
    format: Option<IngestionFormat>,
}

impl SchemaLoader {
    /// Create a loader that infers the format from each location's extension.
    pub fn new(schema: Schema) -> Self {
        Self { schema, format: None }
    }

    /// Force a format regardless of extension.
    pub fn with_format(mut self, format: IngestionFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// The schema every loaded table will have.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}

impl FileLoader for SchemaLoader {
    #[instrument(level = "debug", skip(self))]
    fn load_file(&self, location: &str) -> IngestionResult<DataSet> {
        let path = resolve_location(location)?;
        let format = match self.format {
            Some(f) => f,
            None => IngestionFormat::infer(&path, location)?,
        };

        let result = match format {
            IngestionFormat::Csv => csv::ingest_csv_from_path(&path, &self.schema),
            IngestionFormat::Tsv => csv::ingest_delimited_from_path(&path, &self.schema, b'\t'),
            IngestionFormat::Json => json::ingest_json_from_path(&path, &self.schema),
            IngestionFormat::Parquet => parquet::ingest_parquet_from_path(&path, &self.schema),
        };

        match result {
            Ok(ds) => {
                debug!(%format, rows = ds.row_count(), "loaded file");
                Ok(ds)
            }
            // Report the caller's location, not the resolved path.
            Err(IngestionError::NotFound { .. }) => Err(IngestionError::NotFound {
                location: location.to_owned(),
            }),
            Err(e) => Err(e),
        }
    }
}

/// Named loaders, registered explicitly.
///
/// The ingest configuration refers to a custom loader by name (`loader_method`); the registry
/// maps that name to an implementation.
#[derive(Clone, Default)]
pub struct LoaderRegistry {
    loaders: HashMap<String, Arc<dyn FileLoader>>,
}

impl LoaderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `loader` under `name`, replacing any previous registration.
    pub fn register(&mut self, name: impl Into<String>, loader: impl FileLoader + 'static) -> &mut Self {
        self.loaders.insert(name.into(), Arc::new(loader));
        self
    }

    /// Look up a loader by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn FileLoader>> {
        self.loaders.get(name).cloned()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.loaders.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Resolve an optional loader name.
    ///
    /// `None` yields the [`UnimplementedLoader`] placeholder. A name that was never registered is
    /// a configuration error, distinct from the placeholder's `UnsupportedFormat`.
    pub fn resolve(&self, name: Option<&str>) -> IngestionResult<Arc<dyn FileLoader>> {
        match name {
            None => Ok(Arc::new(UnimplementedLoader)),
            Some(name) => self.get(name).ok_or_else(|| {
                IngestionError::config(format!(
                    "no loader registered under '{name}' (registered: {:?})",
                    self.names()
                ))
            }),
        }
    }
}

impl fmt::Debug for LoaderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoaderRegistry")
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{FileLoader, IngestionFormat, LoaderRegistry, UnimplementedLoader};
    use crate::error::{ErrorKind, IngestionResult};
    use crate::types::{DataSet, Schema};

    #[test]
    fn format_from_extension_is_case_insensitive() {
        assert_eq!(IngestionFormat::from_extension("CSV"), Some(IngestionFormat::Csv));
        assert_eq!(IngestionFormat::from_extension("jsonl"), Some(IngestionFormat::Json));
        assert_eq!(IngestionFormat::from_extension("pq"), Some(IngestionFormat::Parquet));
        assert_eq!(IngestionFormat::from_extension("xyz"), None);
        assert_eq!("tsv".parse::<IngestionFormat>().unwrap(), IngestionFormat::Tsv);
        assert_eq!("avro".parse::<IngestionFormat>().unwrap_err().kind(), ErrorKind::Config);
    }

    #[test]
    fn placeholder_names_extension() {
        let err = UnimplementedLoader.load_file("data/sample.xyz").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
        assert!(err.to_string().contains("'xyz'"));

        let err = UnimplementedLoader.load_file("data/no_extension").unwrap_err();
        assert!(err.to_string().contains("<none>"));
    }

    #[test]
    fn registry_resolves_none_to_placeholder_and_unknown_to_config_error() {
        let mut registry = LoaderRegistry::new();
        registry.register("empty", |_location: &str| -> IngestionResult<DataSet> {
            Ok(DataSet::new(Schema::new(Vec::new()), Vec::new()))
        });

        let placeholder = registry.resolve(None).unwrap();
        assert_eq!(
            placeholder.load_file("a.xyz").unwrap_err().kind(),
            ErrorKind::UnsupportedFormat
        );

        assert!(registry.resolve(Some("empty")).is_ok());
        let err = registry.resolve(Some("missing")).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.to_string().contains("[\"empty\"]"));
    }
}
