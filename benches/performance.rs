//! Performance benchmarks for searchio.
//!
//! Run with: cargo bench
//!
//! Target performance:
//! - Merge of a few hundred saved searches: < 20ms
//! - Regeneration of the document: < 5ms

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use searchio::core::ledger::DeletionLedger;
use searchio::core::regenerate::Regenerator;
use searchio::core::repository::Repository;
use searchio::services::document::WorkflowDocument;
use searchio::services::filter::SearchFilter;
use searchio::services::settings::MemorySettings;
use searchio::NewSearch;
use tempfile::TempDir;

/// Store with `count` saved searches.
fn populated_store(count: usize) -> (TempDir, Repository) {
    let temp_dir = TempDir::new().expect("temp dir");
    let repository = Repository::new(temp_dir.path());

    for i in 0..count {
        let record = NewSearch {
            uid: Some(format!("search-{:04}", i)),
            keyword: format!("k{}", i),
            title: format!("Engine {} Search", i),
            search_url: format!("https://engine{}.example.com/?q={{query}}", i),
            ..Default::default()
        }
        .into_record()
        .expect("valid record");
        repository.save(&record).expect("save record");
    }

    (temp_dir, repository)
}

/// Benchmark loading and merging the collection.
fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");
    let ledger = DeletionLedger::new(MemorySettings::new());

    for count in [10, 100, 500] {
        let (_temp_dir, repository) = populated_store(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| black_box(repository.merged(&ledger).expect("merge")))
        });
    }

    group.finish();
}

/// Benchmark regeneration into a document that already holds the nodes.
fn bench_regenerate(c: &mut Criterion) {
    let mut group = c.benchmark_group("regenerate");
    let ledger = DeletionLedger::new(MemorySettings::new());
    let regenerator = Regenerator::default();

    for count in [10, 100, 500] {
        let (_temp_dir, repository) = populated_store(count);
        let records = repository.merged(&ledger).expect("merge");
        let mut doc = WorkflowDocument::default();
        regenerator.regenerate(&mut doc, &records, None);

        group.bench_with_input(BenchmarkId::from_parameter(count), &records, |b, records| {
            b.iter(|| black_box(regenerator.regenerate(&mut doc, records, None)))
        });
    }

    group.finish();
}

/// Benchmark serializing a regenerated document.
fn bench_serialize(c: &mut Criterion) {
    let ledger = DeletionLedger::new(MemorySettings::new());
    let (_temp_dir, repository) = populated_store(100);
    let records = repository.merged(&ledger).expect("merge");
    let mut doc = WorkflowDocument::default();
    Regenerator::default().regenerate(&mut doc, &records, None);

    c.bench_function("document_to_xml_100", |b| {
        b.iter(|| black_box(doc.to_xml().expect("serialize")))
    });
}

/// Benchmark fuzzy narrowing of the list.
fn bench_fuzzy_filter(c: &mut Criterion) {
    let ledger = DeletionLedger::new(MemorySettings::new());
    let (_temp_dir, repository) = populated_store(500);
    let records = repository.merged(&ledger).expect("merge");
    let filter = SearchFilter::new();

    let mut group = c.benchmark_group("fuzzy_filter");
    for query in ["e", "engine 4", "xyz"] {
        group.bench_with_input(BenchmarkId::from_parameter(query), &query, |b, query| {
            b.iter(|| black_box(filter.filter(black_box(query), &records)))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_merge,
    bench_regenerate,
    bench_serialize,
    bench_fuzzy_filter,
);

criterion_main!(benches);
