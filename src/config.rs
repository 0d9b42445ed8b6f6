//! Ingest step configuration.
//!
//! The ingest step of a recipe is described declaratively:
//!
//! ```yaml
//! steps:
//!   ingest:
//!     using: custom
//!     location: ./data/sample.xyz
//!     loader_method: load_file_as_table
//! ```
//!
//! `using` is either `custom` (a loader looked up by `loader_method` in a
//! [`crate::ingestion::LoaderRegistry`]) or one of the built-in formats `csv`, `tsv`, `json`,
//! `parquet`, which require a `schema`.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{IngestionError, IngestionResult};
use crate::ingestion::{FileLoader, IngestionFormat, LoaderRegistry, SchemaLoader};
use crate::types::Schema;

/// `using:` value selecting user-supplied loader logic.
pub const USING_CUSTOM: &str = "custom";

/// One location or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Locations {
    One(String),
    Many(Vec<String>),
}

impl Locations {
    pub fn as_slice(&self) -> &[String] {
        match self {
            Self::One(s) => std::slice::from_ref(s),
            Self::Many(v) => v.as_slice(),
        }
    }
}

/// Configuration of the ingest step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IngestConfig {
    /// `custom` or a built-in format name.
    pub using: String,
    /// File, directory, or glob; or a list of those.
    pub location: Locations,
    /// Registry name of the custom loader (only with `using: custom`).
    #[serde(default)]
    pub loader_method: Option<String>,
    /// Expected schema (required for built-in formats).
    #[serde(default)]
    pub schema: Option<Schema>,
}

impl IngestConfig {
    /// Parse a bare ingest block.
    pub fn from_yaml_str(yaml: &str) -> IngestionResult<Self> {
        let config: Self = serde_yaml::from_str(yaml).map_err(yaml_err)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse the `steps.ingest` block out of a full recipe document; other keys are ignored.
    pub fn from_recipe_yaml(yaml: &str) -> IngestionResult<Self> {
        let doc: serde_yaml::Value = serde_yaml::from_str(yaml).map_err(yaml_err)?;
        let block = doc
            .get("steps")
            .and_then(|steps| steps.get("ingest"))
            .cloned()
            .ok_or_else(|| IngestionError::config("recipe has no 'steps.ingest' block"))?;
        let config: Self = serde_yaml::from_value(block).map_err(yaml_err)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a recipe file and extract its ingest block.
    pub fn from_recipe_path(path: impl AsRef<Path>) -> IngestionResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_recipe_yaml(&text)
    }

    /// `true` when the step uses a custom loader.
    pub fn is_custom(&self) -> bool {
        self.using.eq_ignore_ascii_case(USING_CUSTOM)
    }

    /// Check field combinations that serde alone cannot.
    pub fn validate(&self) -> IngestionResult<()> {
        if self.location.as_slice().is_empty() {
            return Err(IngestionError::config("'location' must name at least one path"));
        }
        if self.is_custom() {
            if self.schema.is_some() {
                return Err(IngestionError::config(format!(
                    "'schema' is not used with 'using: {USING_CUSTOM}'; the custom loader defines the schema"
                )));
            }
            return Ok(());
        }

        self.using.parse::<IngestionFormat>()?;
        if self.loader_method.is_some() {
            return Err(IngestionError::config(format!(
                "'loader_method' is only valid with 'using: {USING_CUSTOM}' (got '{}')",
                self.using
            )));
        }
        if self.schema.is_none() {
            return Err(IngestionError::config(format!(
                "'using: {}' requires a 'schema'",
                self.using
            )));
        }
        Ok(())
    }

    /// Build the loader this step runs.
    ///
    /// With `using: custom` and no `loader_method`, this is the placeholder loader, which fails
    /// every file with `UnsupportedFormat`.
    pub fn loader(&self, registry: &LoaderRegistry) -> IngestionResult<Arc<dyn FileLoader>> {
        if self.is_custom() {
            return registry.resolve(self.loader_method.as_deref());
        }
        let format: IngestionFormat = self.using.parse()?;
        let schema = self
            .schema
            .clone()
            .ok_or_else(|| IngestionError::config(format!("'using: {}' requires a 'schema'", self.using)))?;
        Ok(Arc::new(SchemaLoader::new(schema).with_format(format)))
    }
}

fn yaml_err(e: serde_yaml::Error) -> IngestionError {
    IngestionError::config(format!("invalid ingest config: {e}"))
}

#[cfg(test)]
mod tests {
    use super::{IngestConfig, Locations};
    use crate::error::ErrorKind;
    use crate::types::{DataType, Field, Schema};

    #[test]
    fn parses_custom_block_from_recipe() {
        let yaml = r#"
recipe: "regression/v1"
target_col: "fare_amount"
steps:
  ingest:
    using: custom
    location: ./data/sample.xyz
    loader_method: load_file_as_table
  split:
    split_ratios: [0.75, 0.125, 0.125]
"#;
        let config = IngestConfig::from_recipe_yaml(yaml).unwrap();
        assert!(config.is_custom());
        assert_eq!(config.location, Locations::One("./data/sample.xyz".to_string()));
        assert_eq!(config.loader_method.as_deref(), Some("load_file_as_table"));
    }

    #[test]
    fn parses_builtin_block_with_schema_and_location_list() {
        let yaml = r#"
using: csv
location:
  - data/part-0.csv
  - data/part-1.csv
schema:
  - name: trip_distance
    type: double
  - name: passenger_count
    type: int64
"#;
        let config = IngestConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.location.as_slice().len(), 2);
        assert_eq!(
            config.schema,
            Some(Schema::new(vec![
                Field::new("trip_distance", DataType::Float64),
                Field::new("passenger_count", DataType::Int64),
            ]))
        );
    }

    #[test]
    fn builtin_format_without_schema_is_rejected() {
        let err = IngestConfig::from_yaml_str("using: parquet\nlocation: a.parquet\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.to_string().contains("requires a 'schema'"));
    }

    #[test]
    fn unknown_using_and_unknown_keys_are_rejected() {
        let err = IngestConfig::from_yaml_str("using: avro\nlocation: a.avro\n").unwrap_err();
        assert!(err.to_string().contains("unknown ingestion format 'avro'"));

        let err = IngestConfig::from_yaml_str("using: custom\nlocation: a\nsql: SELECT 1\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn custom_with_schema_is_rejected() {
        let yaml = "using: custom\nlocation: a.xyz\nschema:\n  - name: id\n    type: int64\n";
        let err = IngestConfig::from_yaml_str(yaml).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.to_string().contains("'schema' is not used"));
    }

    #[test]
    fn missing_ingest_block_is_a_config_error() {
        let err = IngestConfig::from_recipe_yaml("steps:\n  split: {}\n").unwrap_err();
        assert!(err.to_string().contains("steps.ingest"));
    }
}
