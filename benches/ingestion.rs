use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use recipe_ingest::ingestion::{ingest_dataset, FileLoader, IngestOptions, SchemaLoader};
use recipe_ingest::types::{DataType, Field, Schema};

fn schema() -> Schema {
    Schema::new(vec![
        Field::new("id", DataType::Int64),
        Field::new("name", DataType::Utf8),
        Field::new("score", DataType::Float64),
        Field::new("active", DataType::Bool),
    ])
}

fn write_csv(path: &Path, first_id: usize, rows: usize) {
    let mut out = String::from("id,name,score,active\n");
    for i in first_id..first_id + rows {
        let _ = writeln!(out, "{i},name-{i},{}.5,{}", i % 100, i % 2 == 0);
    }
    fs::write(path, out).expect("write bench csv");
}

fn bench_single_file(c: &mut Criterion) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("single.csv");
    write_csv(&path, 0, 50_000);
    let location = path.to_string_lossy().into_owned();
    let loader = SchemaLoader::new(schema());

    c.bench_function("load_file_csv_50k", |b| {
        b.iter(|| loader.load_file(&location).expect("load"))
    });
}

fn bench_dataset(c: &mut Criterion) {
    let dir = tempfile::tempdir().expect("tempdir");
    for part in 0..16 {
        write_csv(&dir.path().join(format!("part-{part:02}.csv")), part * 5_000, 5_000);
    }
    let location = dir.path().to_string_lossy().into_owned();
    let loader = SchemaLoader::new(schema());

    let mut group = c.benchmark_group("ingest_dataset_16x5k");
    for parallel in [false, true] {
        let opts = IngestOptions {
            parallel,
            ..Default::default()
        };
        group.bench_with_input(BenchmarkId::from_parameter(parallel), &opts, |b, opts| {
            b.iter(|| ingest_dataset(&[&location], &loader, opts).expect("ingest"))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_single_file, bench_dataset);
criterion_main!(benches);
