//! Performance benchmarks for the analysis hot path
//!
//! Targets:
//! - Relevance filtering: <1ms for 1000 records
//! - Vocabulary extraction: <1ms for 1000 records
//! - CSV serialization: <1ms for 1000 rows
//! - Local fallback report: <5ms for 1000 records

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ratinglens_core::analysis::{analyze_locally, filter, to_delimited_text, vocabulary};
use ratinglens_core::types::{Record, COL_INSTRUCTOR};

const INSTRUCTORS: [&str; 5] = [
    "John Doe",
    "Jane Smith",
    "Priya Patel",
    "Omar Haddad",
    "Li Wei",
];
const DOMAINS: [&str; 4] = ["Backend", "Frontend", "Fullstack", "Data Engineering"];

/// Build a synthetic record set cycling through instructors and domains
fn synthetic_records(count: usize) -> Vec<Record> {
    (0..count)
        .map(|i| {
            let instructor = INSTRUCTORS[i % INSTRUCTORS.len()];
            let domain = DOMAINS[i % DOMAINS.len()];
            Record::new(vec![
                ("Instructor".to_string(), Some(instructor.to_string())),
                ("Domain".to_string(), Some(domain.to_string())),
                ("Topic Code".to_string(), Some(format!("T-{:04}", i))),
                (
                    "Session Date".to_string(),
                    Some(format!("2024-01-{:02}", (i % 28) + 1)),
                ),
                (
                    "Overall Average Rating".to_string(),
                    Some(format!("{:.1}", 3.0 + ((i % 20) as f64) / 10.0)),
                ),
                ("Cohorts".to_string(), Some(format!("C{}", i % 7))),
            ])
        })
        .collect()
}

fn bench_headers() -> Vec<String> {
    [
        "Instructor",
        "Domain",
        "Topic Code",
        "Session Date",
        "Overall Average Rating",
        "Cohorts",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Benchmark 1: Relevance Filtering
fn bench_relevance_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("relevance_filter");

    for num_records in [100, 500, 1000, 2000].iter() {
        group.throughput(Throughput::Elements(*num_records as u64));

        let records = synthetic_records(*num_records);

        group.bench_with_input(
            BenchmarkId::new("instructor_query", num_records),
            num_records,
            |b, _| {
                b.iter(|| {
                    let subset = filter(
                        black_box("What is John Doe's average rating?"),
                        black_box(&records),
                    );
                    black_box(subset);
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("domain_query", num_records),
            num_records,
            |b, _| {
                b.iter(|| {
                    let subset = filter(
                        black_box("How did the backend sessions go?"),
                        black_box(&records),
                    );
                    black_box(subset);
                });
            },
        );
    }

    // No tier matches this query, so the sampling path runs
    group.bench_function("sampling_query_1000", |b| {
        let records = synthetic_records(1000);
        b.iter(|| {
            let subset = filter(
                black_box("Tell me something interesting"),
                black_box(&records),
            );
            black_box(subset);
        });
    });

    group.finish();
}

/// Benchmark 2: Vocabulary Extraction
fn bench_vocabulary(c: &mut Criterion) {
    let mut group = c.benchmark_group("vocabulary");
    group.throughput(Throughput::Elements(1000));

    let records = synthetic_records(1000);

    group.bench_function("instructors_1000", |b| {
        b.iter(|| {
            let values = vocabulary(black_box(&records), black_box(COL_INSTRUCTOR));
            black_box(values);
        });
    });

    group.finish();
}

/// Benchmark 3: CSV Serialization
fn bench_serialization(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialization");

    for num_records in [100, 1000].iter() {
        group.throughput(Throughput::Elements(*num_records as u64));

        let headers = bench_headers();
        let records = synthetic_records(*num_records);
        let subset: Vec<&Record> = records.iter().collect();

        group.bench_with_input(
            BenchmarkId::new("to_delimited_text", num_records),
            num_records,
            |b, _| {
                b.iter(|| {
                    let csv = to_delimited_text(black_box(&headers), black_box(&subset));
                    black_box(csv);
                });
            },
        );
    }

    group.finish();
}

/// Benchmark 4: Local Fallback Report
fn bench_fallback(c: &mut Criterion) {
    let mut group = c.benchmark_group("fallback");

    for num_records in [100, 1000].iter() {
        group.throughput(Throughput::Elements(*num_records as u64));

        let records = synthetic_records(*num_records);

        group.bench_with_input(
            BenchmarkId::new("instructor_report", num_records),
            num_records,
            |b, _| {
                b.iter(|| {
                    let report = analyze_locally(
                        black_box("What is John Doe's average rating?"),
                        black_box(&records),
                    );
                    black_box(report);
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_relevance_filter,
    bench_vocabulary,
    bench_serialization,
    bench_fallback,
);

criterion_main!(benches);
