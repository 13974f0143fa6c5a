//! Benchmark for chunk generation performance.
//!
//! Run with: cargo bench --package wander_procedural --bench chunk_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use wander_core::config::WorldConfig;
use wander_procedural::chunk::{ChunkCoord, ChunkGenerator};
use wander_procedural::rules::CompiledRuleTable;

fn generator() -> ChunkGenerator {
    ChunkGenerator::from_config(&WorldConfig::default()).expect("stock catalog compiles")
}

fn benchmark_single_chunk(c: &mut Criterion) {
    let gen = generator();
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    c.bench_function("single_chunk_generation", |b| {
        let mut coord = 0i32;
        b.iter(|| {
            coord = coord.wrapping_add(1);
            black_box(gen.generate(ChunkCoord::new(coord, coord / 2), &mut rng))
        });
    });
}

fn benchmark_chunk_grid(c: &mut Criterion) {
    let gen = generator();
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    let mut group = c.benchmark_group("chunk_grid");
    group.sample_size(10);
    group.throughput(Throughput::Elements(8 * 8));

    group.bench_function("8x8_chunks", |b| {
        b.iter(|| {
            for y in 0..8 {
                for x in 0..8 {
                    black_box(gen.generate(ChunkCoord::new(x, y), &mut rng));
                }
            }
        });
    });

    group.finish();
}

fn benchmark_warm_cache_chunk(c: &mut Criterion) {
    // Generating the same chunk repeatedly hits the appearance cache on
    // every tile; this is the steady-state cost of a loaded world.
    let gen = generator();
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let coord = ChunkCoord::new(3, 3);
    let _ = gen.generate(coord, &mut rng);

    c.bench_function("warm_cache_chunk_generation", |b| {
        b.iter(|| black_box(gen.generate(coord, &mut rng)));
    });
}

fn benchmark_classification(c: &mut Criterion) {
    let config = WorldConfig::default();
    let table = CompiledRuleTable::from_config(&config).expect("stock catalog compiles");
    let gen = generator();

    c.bench_function("terrain_classification_per_tile", |b| {
        let mut x = 0i32;
        b.iter(|| {
            x = x.wrapping_add(1);
            black_box(gen.classify_tile(black_box(x), black_box(x / 3)))
        });
    });

    c.bench_function("rule_table_lookup", |b| {
        let vector = wander_procedural::noise::NoiseVector::from_values(vec![0.2, -0.1, 0.6]);
        b.iter(|| black_box(table.classify(black_box(&vector))));
    });
}

criterion_group!(
    benches,
    benchmark_single_chunk,
    benchmark_chunk_grid,
    benchmark_warm_cache_chunk,
    benchmark_classification
);
criterion_main!(benches);
