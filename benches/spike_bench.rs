//! Benchmarks for the spike test and the full QC pipeline.
//!
//! Run with: `cargo bench --bench spike_bench`

use chrono::{Duration, TimeZone, Utc};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use waterframe::qc::spike::{auto_window, spike_mask};
use waterframe::{QcConfig, WaterFrame};

/// Ten-minute temperature record with a spike every 500 samples
fn synthetic_series(count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| {
            let base = 14.0 + 0.8 * (i as f64 / 144.0).sin() + 0.02 * ((i * 13) % 7) as f64;
            if i % 500 == 250 { base + 5.0 } else { base }
        })
        .collect()
}

fn bench_spike_mask(c: &mut Criterion) {
    let mut group = c.benchmark_group("spike_mask");

    for count in [1_000, 10_000, 100_000] {
        let values = synthetic_series(count);
        let window = auto_window(count);
        group.bench_with_input(BenchmarkId::new("auto_window", count), &count, |b, _| {
            b.iter(|| spike_mask(black_box(&values), window, 3.5, 0.5));
        });
    }

    group.finish();
}

fn bench_qc_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc_pipeline");
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    for count in [1_000, 10_000] {
        let frame = WaterFrame::builder()
            .time((0..count as i64).map(|i| start + Duration::minutes(10 * i)))
            .parameter("TEMP", synthetic_series(count))
            .build()
            .unwrap();
        let config = QcConfig::default();

        group.bench_with_input(BenchmarkId::new("qc", count), &count, |b, _| {
            b.iter(|| frame.with_qc(&["TEMP"], black_box(&config)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_spike_mask, bench_qc_pipeline);
criterion_main!(benches);
