//! Dataset-level ingestion.
//!
//! A dataset location (file, directory, glob, or several of those) is expanded into files; the
//! loader runs once per file and the resulting tables are concatenated in file order. Every file
//! must produce the same schema as the first one.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tracing::{debug, info, instrument};

use crate::config::IngestConfig;
use crate::error::{IngestionError, IngestionResult};
use crate::types::DataSet;

use super::loader::{FileLoader, LoaderRegistry};
use super::location::expand_location;
use super::observability::{IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats};

/// Options controlling how a dataset is ingested.
///
/// Use [`Default`] for sequential loading without an observer.
#[derive(Clone)]
pub struct IngestOptions {
    /// Load files concurrently on a rayon pool.
    pub parallel: bool,
    /// Pool size when `parallel` is set. `None` uses rayon's global pool.
    pub max_threads: Option<usize>,
    /// Optional observer for per-file outcomes.
    pub observer: Option<Arc<dyn IngestionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IngestionSeverity,
}

impl fmt::Debug for IngestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestOptions")
            .field("parallel", &self.parallel)
            .field("max_threads", &self.max_threads)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            parallel: false,
            max_threads: None,
            observer: None,
            alert_at_or_above: IngestionSeverity::Critical,
        }
    }
}

/// Ingest every file named by `locations` with `loader` and concatenate the results.
///
/// - each location is expanded with [`super::location::expand_location`]; files are loaded in
///   the order of `locations`, then path order within each location
/// - the first failure (in file order) is returned unchanged; there are no retries
/// - a file whose schema differs from the first file's fails with
///   [`IngestionError::InconsistentSchema`]
///
/// ```no_run
/// use recipe_ingest::ingestion::{ingest_dataset, IngestOptions, SchemaLoader};
/// use recipe_ingest::types::{DataType, Field, Schema};
///
/// # fn main() -> Result<(), recipe_ingest::IngestionError> {
/// let loader = SchemaLoader::new(Schema::new(vec![Field::new("quality", DataType::Int64)]));
/// let opts = IngestOptions { parallel: true, ..Default::default() };
/// let ds = ingest_dataset(&["data/wine/*.csv"], &loader, &opts)?;
/// println!("rows={}", ds.row_count());
/// # Ok(())
/// # }
/// ```
#[instrument(level = "info", skip_all, fields(locations = locations.len(), parallel = options.parallel))]
pub fn ingest_dataset<S, L>(locations: &[S], loader: &L, options: &IngestOptions) -> IngestionResult<DataSet>
where
    S: AsRef<str>,
    L: FileLoader + ?Sized,
{
    let start = Instant::now();

    let mut files: Vec<PathBuf> = Vec::new();
    for location in locations {
        files.extend(expand_location(location.as_ref())?);
    }
    let Some(first) = files.first() else {
        return Err(IngestionError::config("no dataset locations given"));
    };
    debug!(files = files.len(), first = %first.display(), "resolved dataset files");

    let contexts: Vec<IngestionContext> = files
        .iter()
        .enumerate()
        .map(|(file_index, path)| IngestionContext {
            location: path.to_string_lossy().into_owned(),
            file_index,
            file_count: files.len(),
        })
        .collect();

    let tables = if options.parallel {
        load_parallel(&contexts, loader, options)?
    } else {
        contexts
            .iter()
            .map(|ctx| load_one(ctx, loader, options))
            .collect::<IngestionResult<Vec<_>>>()?
    };

    let combined = concat_tables(&contexts, tables)?;
    info!(
        files = contexts.len(),
        rows = combined.row_count(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "ingested dataset"
    );
    Ok(combined)
}

/// Ingest the dataset described by `config`, resolving custom loaders through `registry`.
pub fn ingest_from_config(
    config: &IngestConfig,
    registry: &LoaderRegistry,
    options: &IngestOptions,
) -> IngestionResult<DataSet> {
    config.validate()?;
    let loader = config.loader(registry)?;
    ingest_dataset(config.location.as_slice(), loader.as_ref(), options)
}

fn load_parallel<L>(contexts: &[IngestionContext], loader: &L, options: &IngestOptions) -> IngestionResult<Vec<DataSet>>
where
    L: FileLoader + ?Sized,
{
    let run = || {
        contexts
            .par_iter()
            .map(|ctx| load_one(ctx, loader, options))
            .collect::<Vec<_>>()
    };

    let results = match options.max_threads {
        Some(n) => {
            if n == 0 {
                return Err(IngestionError::config("max_threads must be > 0 when set"));
            }
            let pool = ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| IngestionError::config(format!("failed to build thread pool: {e}")))?;
            pool.install(run)
        }
        None => run(),
    };

    // Report the earliest failing file, same as sequential loading would.
    results.into_iter().collect()
}

fn load_one<L>(ctx: &IngestionContext, loader: &L, options: &IngestOptions) -> IngestionResult<DataSet>
where
    L: FileLoader + ?Sized,
{
    let start = Instant::now();
    let result = loader.load_file(&ctx.location).and_then(|ds| check_row_widths(ctx, ds));

    if let Some(obs) = options.observer.as_ref() {
        match &result {
            Ok(ds) => obs.on_success(
                ctx,
                IngestionStats {
                    rows: ds.row_count(),
                    elapsed: start.elapsed(),
                },
            ),
            Err(e) => {
                let sev = IngestionSeverity::for_error(e);
                obs.on_failure(ctx, sev, e);
                if sev >= options.alert_at_or_above {
                    obs.on_alert(ctx, sev, e);
                }
            }
        }
    }

    result
}

/// Custom loaders are not trusted to keep rows as wide as their schema.
fn check_row_widths(ctx: &IngestionContext, ds: DataSet) -> IngestionResult<DataSet> {
    match ds.first_ragged_row() {
        None => Ok(ds),
        Some((row_idx, width)) => Err(IngestionError::SchemaMismatch {
            message: format!(
                "'{}' row {} has {width} values but the schema has {} fields",
                ctx.location,
                row_idx + 1,
                ds.schema.fields.len()
            ),
        }),
    }
}

fn concat_tables(contexts: &[IngestionContext], tables: Vec<DataSet>) -> IngestionResult<DataSet> {
    let mut tables = tables.into_iter();
    let Some(mut combined) = tables.next() else {
        return Err(IngestionError::config("no dataset files loaded"));
    };

    for (ctx, table) in contexts.iter().skip(1).zip(tables) {
        combined.append(table).map_err(|rejected| IngestionError::InconsistentSchema {
            location: ctx.location.clone(),
            expected: combined.schema.to_string(),
            found: rejected.schema.to_string(),
        })?;
    }
    Ok(combined)
}
