//! Benchmarks for Vaidya symptom matching and diagnosis

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::sync::Arc;
use vaidya::inference::{normalize, partial_ratio};
use vaidya::{
    DiagnosisContext, DiagnosisPipeline, ModelArtifact, RemedyRecord, RemedyResolver,
    RemedyTable, SymptomExtractor, Vocabulary,
};

const TERMS: [&str; 24] = [
    "itching",
    "skin rash",
    "continuous sneezing",
    "shivering",
    "chills",
    "joint pain",
    "stomach pain",
    "acidity",
    "vomiting",
    "fatigue",
    "weight loss",
    "restlessness",
    "cough",
    "high fever",
    "breathlessness",
    "sweating",
    "headache",
    "nausea",
    "loss of appetite",
    "back pain",
    "constipation",
    "abdominal pain",
    "diarrhoea",
    "mild fever",
];

const CONDITIONS: [&str; 6] = [
    "Allergy",
    "Common Cold",
    "Fungal infection",
    "GERD",
    "Malaria",
    "Typhoid",
];

const INPUT: &str = "I have had a high fever with chills, joint pain and vomiting since Monday";

/// Artifact whose class `i` is centered on a band of four terms
fn artifact() -> ModelArtifact {
    let centroids = (0..CONDITIONS.len())
        .map(|class| {
            (0..TERMS.len())
                .map(|term| if term / 4 == class { 1.0 } else { 0.0 })
                .collect()
        })
        .collect();
    ModelArtifact {
        features: TERMS.iter().map(|t| t.to_string()).collect(),
        classes: CONDITIONS.iter().map(|c| c.to_string()).collect(),
        centroids,
    }
}

fn remedies() -> RemedyTable {
    RemedyTable::from_records(
        CONDITIONS
            .iter()
            .map(|c| RemedyRecord::new(*c, format!("{} remedy", c))),
    )
}

/// Benchmark the windowed similarity score
fn bench_partial_ratio(c: &mut Criterion) {
    let mut group = c.benchmark_group("partial_ratio");

    for (name, a, b) in [
        ("exact", "fever", "high fever"),
        ("typo", "nausia", "nausea"),
        ("miss", "xyzzy", "loss of appetite"),
    ] {
        group.bench_function(name, |bench| {
            bench.iter(|| black_box(partial_ratio(black_box(a), black_box(b))))
        });
    }

    group.finish();
}

/// Benchmark normalization plus extraction
fn bench_extract(c: &mut Criterion) {
    let vocabulary = Vocabulary::new(TERMS).unwrap();
    let extractor = SymptomExtractor::new(&vocabulary);
    let mut group = c.benchmark_group("extract");
    group.throughput(Throughput::Bytes(INPUT.len() as u64));

    group.bench_function("sentence", |b| {
        b.iter(|| black_box(extractor.extract(&normalize(black_box(INPUT)))))
    });

    group.finish();
}

/// Benchmark remedy ranking
fn bench_resolve(c: &mut Criterion) {
    let table = remedies();
    let resolver = RemedyResolver::new();

    c.bench_function("resolve_first", |b| {
        b.iter(|| black_box(resolver.resolve_first(black_box("Malaria"), &table)))
    });
}

/// Benchmark a full diagnosis
fn bench_diagnose(c: &mut Criterion) {
    let context = DiagnosisContext::from_artifact(artifact(), remedies()).unwrap();
    let pipeline = DiagnosisPipeline::new(Arc::new(context));

    c.bench_function("diagnose", |b| {
        b.iter(|| black_box(pipeline.diagnose(black_box(INPUT))))
    });
}

criterion_group!(
    benches,
    bench_partial_ratio,
    bench_extract,
    bench_resolve,
    bench_diagnose
);
criterion_main!(benches);
