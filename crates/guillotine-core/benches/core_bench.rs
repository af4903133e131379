//! Criterion benchmarks for guillotine-core primitives
//!
//! Run with: cargo bench -p guillotine-core
#![allow(missing_docs)]

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use guillotine_core::{
    Clipper, FilterType, Oversampler, OversamplerDesign, OversamplingFactor, sanitize,
};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 256, 1024];

fn generate_test_signal(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE;
            (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.9
        })
        .collect()
}

fn bench_clipper(c: &mut Criterion) {
    let mut group = c.benchmark_group("Clipper");

    for &block_size in BLOCK_SIZES {
        let input = generate_test_signal(block_size);
        for (name, sharpness) in [("hard", 1.0), ("soft", 0.0)] {
            let clipper = Clipper::new(0.5, sharpness);
            group.bench_with_input(BenchmarkId::new(name, block_size), &block_size, |b, _| {
                let mut buf = input.clone();
                b.iter(|| {
                    buf.copy_from_slice(&input);
                    clipper.process_unlinked(black_box(&mut buf));
                });
            });
        }

        let clipper = Clipper::new(0.5, 0.5);
        group.bench_with_input(BenchmarkId::new("linked", block_size), &block_size, |b, _| {
            let mut left = input.clone();
            let mut right = input.clone();
            b.iter(|| {
                left.copy_from_slice(&input);
                right.copy_from_slice(&input);
                clipper.process_linked(black_box(&mut left), black_box(&mut right));
            });
        });
    }

    group.finish();
}

fn bench_oversampler(c: &mut Criterion) {
    let mut group = c.benchmark_group("Oversampler");
    let design = Arc::new(OversamplerDesign::new());
    let block_size = 256;
    let input = generate_test_signal(block_size);

    for factor in &OversamplingFactor::ALL[1..] {
        for filter in [FilterType::MinimumPhase, FilterType::LinearPhase] {
            let id = format!("{}x_{:?}", factor.ratio(), filter);
            group.bench_function(BenchmarkId::new("roundtrip", id), |b| {
                let mut os = Oversampler::new(design.clone(), 1, block_size);
                os.set_mode(*factor, filter);
                let mut output = vec![0.0; block_size];
                b.iter(|| {
                    os.upsample(0, black_box(&input));
                    os.downsample(0, &mut output);
                    black_box(&output);
                });
            });
        }
    }

    group.bench_function("design", |b| {
        b.iter(|| black_box(OversamplerDesign::new()));
    });

    group.finish();
}

fn bench_sanitize(c: &mut Criterion) {
    let input = generate_test_signal(1024);
    c.bench_function("sanitize_1024", |b| {
        let mut buf = input.clone();
        b.iter(|| {
            buf.copy_from_slice(&input);
            black_box(sanitize(black_box(&mut buf)));
        });
    });
}

criterion_group!(benches, bench_clipper, bench_oversampler, bench_sanitize);
criterion_main!(benches);
