//! Benchmarks for resonance detection and the full extraction run

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ringres_core::extraction::{estimate_loss, find_peaks};
use ringres_core::{ExtractionOptions, ExtractionReport, PhysicalParameters, Pipeline, Trace};

/// Lorentzian resonances on a flat -50 dB floor, 0.5 to 6 GHz
fn create_resonator_trace(npoints: usize, nmodes: usize) -> Trace {
    let step = 5.5e9 / (npoints - 1) as f64;
    let freq: Vec<f64> = (0..npoints).map(|i| 0.5e9 + i as f64 * step).collect();
    let centers: Vec<f64> = (1..=nmodes).map(|n| n as f64 * 5.0e9 / nmodes as f64).collect();

    Trace::from_fn(freq, |f| {
        let response: f64 = centers
            .iter()
            .map(|&c| {
                let x = (f - c) / 10.0e6;
                1.0 / (1.0 + x * x)
            })
            .sum();
        -50.0 + 40.0 * response
    })
    .expect("valid trace")
}

fn bench_find_peaks(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_peaks");

    for npoints in [1_001, 10_001, 100_001].iter() {
        let trace = create_resonator_trace(*npoints, 4);
        group.bench_with_input(BenchmarkId::from_parameter(npoints), npoints, |b, _| {
            b.iter(|| black_box(find_peaks(&trace, 16.0)))
        });
    }

    group.finish();
}

fn bench_estimate_loss(c: &mut Criterion) {
    let trace = create_resonator_trace(100_001, 4);
    let peaks = find_peaks(&trace, 16.0);

    c.bench_function("estimate_loss", |b| {
        b.iter(|| {
            for &idx in &peaks.indices {
                black_box(estimate_loss(&trace, idx).ok());
            }
        })
    });
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let params = PhysicalParameters::from_mm(100.0, 1.6, 3.0);

    for nmodes in [1, 4, 16].iter() {
        let trace = create_resonator_trace(20_001, *nmodes);
        group.bench_with_input(BenchmarkId::new("modes", nmodes), nmodes, |b, _| {
            b.iter(|| {
                let mut sink: Vec<ExtractionReport> = Vec::new();
                black_box(
                    Pipeline::new(params, ExtractionOptions::default())
                        .run(trace.clone(), &mut sink)
                        .ok(),
                )
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_find_peaks, bench_estimate_loss, bench_pipeline);
criterion_main!(benches);
