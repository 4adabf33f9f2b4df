//! # Filter Benchmarks
//!
//! Performance benchmarks for the spacebio-core filter engine.
//!
//! Run with: `cargo bench -p spacebio-core`

use chrono::{Days, NaiveDate};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use spacebio_core::{
    Category, DateRange, FilterState, Mission, Record, RecordId, apply_filters,
};
use std::hint::black_box;

/// Create a catalog of N records cycling through categories and missions.
fn create_catalog(size: usize) -> Vec<Record> {
    let base = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default();
    (0..size)
        .map(|i| {
            let category = Category::ALL[i % Category::ALL.len()];
            let mission = Mission::ALL[i % Mission::ALL.len()];
            let date = base
                .checked_add_days(Days::new((i % 1500) as u64))
                .unwrap_or(base);
            Record::new(
                RecordId(i as u64),
                format!("Study {i} of microgravity effects"),
                category,
                date,
            )
            .with_authors(format!("Author {}, Author {}", i % 97, i % 89))
            .with_abstract("Long-duration exposure of model organisms to spaceflight conditions.")
            .with_tags(["Microgravity", "Radiation Biology", "Human Health"])
            .with_missions([mission])
        })
        .collect()
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_text_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("text_filter");
    let state = FilterState {
        query_text: "radiation".to_string(),
        ..FilterState::default()
    };

    for size in [100, 1000, 10000].iter() {
        let catalog = create_catalog(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(apply_filters(&catalog, &state)));
        });
    }

    group.finish();
}

fn bench_all_predicates(c: &mut Criterion) {
    let mut group = c.benchmark_group("all_predicates");
    let state = FilterState {
        query_text: "study 1".to_string(),
        selected_categories: [Category::ResearchPapers, Category::OsdrData]
            .into_iter()
            .collect(),
        selected_missions: [Mission::Mars, Mission::Iss].into_iter().collect(),
        date_range: DateRange::parse("2020-06-01", "2023-06-01"),
    };

    for size in [100, 1000, 10000].iter() {
        let catalog = create_catalog(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(apply_filters(&catalog, &state)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_text_filter, bench_all_predicates);
criterion_main!(benches);
