use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use datafoot::fake_season;
use datafoot::ranking::SortDirection;
use datafoot::reports::{
    ReportKind, ReportOptions, best_scorer_per_team, build_report, compute_all_reports, standings,
};
use datafoot::schema::SeasonSnapshot;
use datafoot::source::read_snapshot_json;
use datafoot::view::{ViewParams, apply_view};

fn full_season() -> SeasonSnapshot {
    fake_season::generate(2024, 20, 30)
}

fn bench_standings(c: &mut Criterion) {
    let snapshot = full_season();
    c.bench_function("standings", |b| {
        b.iter(|| {
            let rows = standings(black_box(&snapshot));
            black_box(rows.len());
        })
    });
}

fn bench_best_scorer_per_team(c: &mut Criterion) {
    let snapshot = full_season();
    c.bench_function("best_scorer_per_team", |b| {
        b.iter(|| {
            let rows = best_scorer_per_team(black_box(&snapshot));
            black_box(rows.len());
        })
    });
}

fn bench_all_reports(c: &mut Criterion) {
    let snapshot = full_season();
    let opts = ReportOptions::default();
    c.bench_function("compute_all_reports", |b| {
        b.iter(|| {
            let tables = compute_all_reports(black_box(&snapshot), &opts);
            black_box(tables.len());
        })
    });
}

fn bench_view_search_sort_page(c: &mut Criterion) {
    let snapshot = full_season();
    let opts = ReportOptions {
        limit: 600,
        ..ReportOptions::default()
    };
    let table = build_report(&snapshot, ReportKind::MostDecisive, None, &opts);
    let params = ViewParams {
        search: Some("man".to_string()),
        sort_column: Some("assists".to_string()),
        sort_direction: SortDirection::Ascending,
        page_size: 25,
        page: 2,
    };
    c.bench_function("apply_view", |b| {
        b.iter(|| {
            let outcome = apply_view(black_box(&table), &params).unwrap();
            black_box(outcome.total_pages());
        })
    });
}

fn bench_snapshot_json_parse(c: &mut Criterion) {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/mini_season.json");
    c.bench_function("snapshot_json_parse", |b| {
        b.iter(|| {
            let snapshot = read_snapshot_json(black_box(&path)).unwrap();
            black_box(snapshot.results.len());
        })
    });
}

criterion_group!(
    perf,
    bench_standings,
    bench_best_scorer_per_team,
    bench_all_reports,
    bench_view_search_sort_page,
    bench_snapshot_json_parse
);
criterion_main!(perf);
