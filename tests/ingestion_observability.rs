use std::sync::{Arc, Mutex};

use recipe_ingest::IngestionError;
use recipe_ingest::ingestion::{
    ingest_dataset, CompositeObserver, FileLoader, IngestOptions, IngestionContext, IngestionFormat,
    IngestionObserver, IngestionSeverity, IngestionStats, SchemaLoader, TracingObserver,
};
use recipe_ingest::types::{DataType, Field, Schema};

#[derive(Default)]
struct RecordingObserver {
    successes: Mutex<Vec<(String, usize)>>,
    failures: Mutex<Vec<IngestionSeverity>>,
    alerts: Mutex<Vec<IngestionSeverity>>,
}

impl IngestionObserver for RecordingObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        self.successes.lock().unwrap().push((ctx.location.clone(), stats.rows));
    }

    fn on_failure(&self, _ctx: &IngestionContext, severity: IngestionSeverity, _error: &IngestionError) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &IngestionContext, severity: IngestionSeverity, _error: &IngestionError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

fn schema_id_only() -> Schema {
    Schema::new(vec![Field::new("id", DataType::Int64)])
}

fn schema_missing_col() -> Schema {
    Schema::new(vec![Field::new("definitely_missing", DataType::Utf8)])
}

fn opts_with(obs: Arc<RecordingObserver>) -> IngestOptions {
    IngestOptions {
        observer: Some(obs),
        alert_at_or_above: IngestionSeverity::Critical,
        ..Default::default()
    }
}

#[test]
fn observer_receives_success_per_file() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let obs = Arc::new(RecordingObserver::default());
    let composite = CompositeObserver::new(vec![
        obs.clone() as Arc<dyn IngestionObserver>,
        Arc::new(TracingObserver) as Arc<dyn IngestionObserver>,
    ]);
    let opts = IngestOptions {
        observer: Some(Arc::new(composite)),
        ..Default::default()
    };

    let loader = SchemaLoader::new(schema_id_only());
    ingest_dataset(
        &["tests/fixtures/people.csv", "tests/fixtures/people_more.csv"],
        &loader,
        &opts,
    )
    .unwrap();

    let successes = obs.successes.lock().unwrap().clone();
    assert_eq!(successes.len(), 2);
    assert_eq!(successes[0].1, 2);
    assert_eq!(successes[1].1, 3);
    assert!(successes[1].0.ends_with("people_more.csv"));
}

#[test]
fn observer_receives_failure_and_alert_on_critical_error() {
    let obs = Arc::new(RecordingObserver::default());

    // The file exists when the dataset is expanded but the loader cannot open it.
    let loader = |location: &str| {
        SchemaLoader::new(schema_id_only())
            .with_format(IngestionFormat::Csv)
            .load_file(&format!("{location}.gone"))
    };
    let _ = ingest_dataset(&["tests/fixtures/people.csv"], &loader, &opts_with(obs.clone())).unwrap_err();

    assert_eq!(obs.failures.lock().unwrap().clone(), vec![IngestionSeverity::Critical]);
    assert_eq!(obs.alerts.lock().unwrap().clone(), vec![IngestionSeverity::Critical]);
}

#[test]
fn observer_receives_failure_without_alert_for_non_critical_error() {
    let obs = Arc::new(RecordingObserver::default());

    // Schema mismatch -> Error severity (not Critical) -> should not alert
    let loader = SchemaLoader::new(schema_missing_col());
    let _ = ingest_dataset(&["tests/fixtures/people.csv"], &loader, &opts_with(obs.clone())).unwrap_err();

    assert_eq!(obs.failures.lock().unwrap().clone(), vec![IngestionSeverity::Error]);
    assert!(obs.alerts.lock().unwrap().is_empty());
}

#[test]
fn unsupported_format_is_error_severity() {
    let err = IngestionError::UnsupportedFormat {
        location: "data/sample.xyz".to_string(),
        format: "xyz".to_string(),
    };
    assert_eq!(IngestionSeverity::for_error(&err), IngestionSeverity::Error);
}
