//! Benchmark for noise sampling performance.
//!
//! Run with: cargo bench --package wander_procedural --bench noise_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use wander_core::config::NoiseLayerConfig;
use wander_procedural::noise::{GradientNoise, NoiseField, NoiseVector, WorldSeed};

fn layers() -> Vec<NoiseLayerConfig> {
    vec![
        NoiseLayerConfig { scale: 0.03, offset_x: 0.0, offset_y: 0.0 },
        NoiseLayerConfig { scale: 0.03, offset_x: 300.0, offset_y: 200.0 },
        NoiseLayerConfig { scale: 0.004, offset_x: 200.0, offset_y: 300.0 },
    ]
}

fn benchmark_single_sample(c: &mut Criterion) {
    let noise = GradientNoise::new(WorldSeed::new(42));

    c.bench_function("single_noise_sample", |b| {
        let mut x = 0.0f64;
        b.iter(|| {
            x += 0.1;
            black_box(noise.sample(black_box(x), black_box(x * 0.7)))
        });
    });
}

fn benchmark_million_samples(c: &mut Criterion) {
    let noise = GradientNoise::new(WorldSeed::new(42));

    let mut group = c.benchmark_group("million_samples");
    group.throughput(Throughput::Elements(1_000_000));
    group.sample_size(10);

    group.bench_function("1M_noise_samples", |b| {
        b.iter(|| {
            for i in 0..1_000_000 {
                let x = f64::from(i % 1000) * 0.1;
                let y = f64::from(i / 1000) * 0.1;
                black_box(noise.sample(x, y));
            }
        });
    });

    group.finish();
}

fn benchmark_layered_vector(c: &mut Criterion) {
    let field = NoiseField::new(WorldSeed::new(42), layers());

    c.bench_function("three_layer_vector", |b| {
        let mut x = 0.0f64;
        b.iter(|| {
            x += 1.0;
            black_box(field.sample_vector(black_box(x), black_box(x * 0.7)))
        });
    });
}

fn benchmark_vector_into_scratch(c: &mut Criterion) {
    let field = NoiseField::new(WorldSeed::new(42), layers());
    let mut scratch = NoiseVector::with_layers(field.layer_count());

    c.bench_function("three_layer_vector_into_scratch", |b| {
        let mut x = 0.0f64;
        b.iter(|| {
            x += 1.0;
            field.sample_vector_into(black_box(x), black_box(x * 0.7), &mut scratch);
            black_box(scratch.get(0))
        });
    });
}

criterion_group!(
    benches,
    benchmark_single_sample,
    benchmark_million_samples,
    benchmark_layered_vector,
    benchmark_vector_into_scratch
);
criterion_main!(benches);
