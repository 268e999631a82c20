//! Criterion benchmarks for the quality pipeline.
//!
//! Benchmarks:
//! 1. Full pipeline on a 300 × 1500 panel with scattered gaps
//! 2. Bounded forward-fill on a single long column
//! 3. Log-return derivation on a clean panel

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use chrono::{Duration, NaiveDate};
use panelprep_core::domain::PriceTable;
use panelprep_core::quality::{
    derive_log_returns, enforce_completeness, forward_fill_bounded, run_quality_pipeline,
    QualityConfig,
};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_panel(tickers: usize, rows: usize) -> PriceTable {
    let base = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
    let dates = (0..rows).map(|i| base + Duration::days(i as i64)).collect();
    let columns = (0..tickers)
        .map(|t| {
            let column = (0..rows)
                .map(|i| {
                    // every 7th ticker gets short gaps, every 29th a long one
                    let short_gap = t % 7 == 0 && i % 97 < 2;
                    let long_gap = t % 29 == 0 && (700..720).contains(&i);
                    if short_gap || long_gap {
                        None
                    } else {
                        Some(100.0 + ((i + t) as f64 * 0.01).sin() * 10.0)
                    }
                })
                .collect();
            (format!("T{t:03}"), column)
        })
        .collect();
    PriceTable::new(dates, columns).unwrap()
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("quality_pipeline");
    let config = QualityConfig::default();
    for &tickers in &[50usize, 300] {
        let panel = make_panel(tickers, 1500);
        group.bench_with_input(BenchmarkId::from_parameter(tickers), &panel, |b, panel| {
            b.iter(|| run_quality_pipeline(black_box(panel), black_box(&config)))
        });
    }
    group.finish();
}

fn bench_forward_fill(c: &mut Criterion) {
    let column: Vec<Option<f64>> = (0..10_000)
        .map(|i| if i % 13 < 3 { None } else { Some(i as f64) })
        .collect();
    c.bench_function("forward_fill_bounded_10k", |b| {
        b.iter(|| forward_fill_bounded(black_box(&column), black_box(5)))
    });
}

fn bench_log_returns(c: &mut Criterion) {
    let panel = make_panel(300, 1500);
    let (clean, _) = enforce_completeness(&panel);
    c.bench_function("log_returns_300x1500", |b| {
        b.iter(|| derive_log_returns(black_box(&clean)))
    });
}

criterion_group!(benches, bench_pipeline, bench_forward_fill, bench_log_returns);
criterion_main!(benches);
