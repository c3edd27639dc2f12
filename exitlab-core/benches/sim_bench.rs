//! Benchmark the simulator hot loop over a multi-year synthetic series.

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use exitlab_core::domain::{Bar, EntryEvent, IndicatorSeries};
use exitlab_core::percentile::percentile_ranks;
use exitlab_core::sim::{simulate, ExitStrategy, SimulationParams};

fn synthetic_bars(n: usize) -> Vec<Bar> {
    let base = NaiveDate::from_ymd_opt(2015, 1, 2).unwrap();
    (0..n)
        .map(|i| {
            let drift = i as f64 * 0.05;
            let wave = (i as f64 * 0.21).sin() * 4.0;
            let close = 100.0 + drift + wave;
            Bar {
                symbol: "BENCH".into(),
                date: base + chrono::Duration::days(i as i64),
                open: close - 0.3,
                high: close + 1.2,
                low: close - 1.2,
                close,
                volume: 10_000,
            }
        })
        .collect()
}

fn bench_simulate(c: &mut Criterion) {
    let bars = synthetic_bars(2_000);
    let series = IndicatorSeries::from_bars(&bars, 14, 5);
    let ranks = percentile_ranks(&series.rsi, 252);
    let event = EntryEvent {
        ticker: "BENCH".into(),
        entry_date: bars[1_000].date,
        entry_index: 1_000,
        entry_price: bars[1_000].close,
        entry_percentile: 4.0,
        threshold: 5.0,
    };
    let params = SimulationParams::default();

    c.bench_function("simulate_adaptive_2000_bars", |b| {
        b.iter(|| {
            simulate(
                black_box(&bars),
                black_box(&ranks),
                black_box(&event),
                &ExitStrategy::AdaptivePressure,
                &params,
                None,
            )
        })
    });
}

criterion_group!(benches, bench_simulate);
criterion_main!(benches);
