use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::error::{ErrorKind, IngestionError};

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IngestionSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (operation failed).
    Error,
    /// Critical error (missing files, I/O failures).
    Critical,
}

impl IngestionSeverity {
    /// Severity of a failed file load.
    pub fn for_error(e: &IngestionError) -> Self {
        match e.kind() {
            ErrorKind::NotFound | ErrorKind::Io => Self::Critical,
            ErrorKind::UnsupportedFormat
            | ErrorKind::Parse
            | ErrorKind::Schema
            | ErrorKind::Config => Self::Error,
        }
    }
}

/// Context about a single file load.
#[derive(Debug, Clone)]
pub struct IngestionContext {
    /// Location string passed to the loader.
    pub location: String,
    /// Position of the file within the dataset (0-based).
    pub file_index: usize,
    /// Number of files in the dataset.
    pub file_count: usize,
}

/// Stats reported on a successful file load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionStats {
    /// Number of loaded rows.
    pub rows: usize,
    /// Wall time spent in the loader.
    pub elapsed: Duration,
}

/// Observer interface for file load outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts. Callbacks may arrive from several
/// threads at once when a dataset is ingested in parallel.
pub trait IngestionObserver: Send + Sync {
    /// Called when a file loads successfully.
    fn on_success(&self, _ctx: &IngestionContext, _stats: IngestionStats) {}

    /// Called when a file fails to load.
    fn on_failure(&self, _ctx: &IngestionContext, _severity: IngestionSeverity, _error: &IngestionError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.on_failure(ctx, severity, error)
    }
}

/// Fans callbacks out to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn IngestionObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn IngestionObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl IngestionObserver for CompositeObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Emits `tracing` events for every outcome.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl IngestionObserver for TracingObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        info!(
            location = %ctx.location,
            file = ctx.file_index + 1,
            of = ctx.file_count,
            rows = stats.rows,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "loaded"
        );
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        warn!(
            location = %ctx.location,
            file = ctx.file_index + 1,
            of = ctx.file_count,
            ?severity,
            error = %error,
            "load failed"
        );
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        error!(
            location = %ctx.location,
            ?severity,
            error = %error,
            "ingest alert"
        );
    }
}
