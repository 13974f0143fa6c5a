//! # World Quality Integration Test
//!
//! Exercises the stock terrain catalog end to end: variety of terrain,
//! bounded appearance cache, plausible detail density and seed
//! stability.

use std::collections::HashSet;
use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use wander_core::color::SHADE_BANDS;
use wander_core::config::WorldConfig;
use wander_procedural::{ChunkCoord, ChunkGenerator};

fn generator() -> Arc<ChunkGenerator> {
    Arc::new(ChunkGenerator::from_config(&WorldConfig::default()).expect("stock catalog compiles"))
}

/// Test: a broad sweep of the default world shows real terrain variety.
#[test]
fn test_stock_catalog_produces_variety() {
    let gen = generator();

    let mut seen: HashSet<String> = HashSet::new();
    // 400x400 tiles at stride 4 crosses many noise features.
    for y in (0..400).step_by(4) {
        for x in (0..400).step_by(4) {
            let terrain = gen.classify_tile(x, y);
            seen.insert(gen.table().definition(terrain).name.clone());
        }
    }

    println!("Terrains seen: {seen:?}");
    assert!(
        seen.len() >= 4,
        "expected at least 4 of 6 stock terrains over a 400x400 sweep, saw {seen:?}"
    );
    assert!(seen.contains("GRASS"), "grass dominates the stock catalog");
}

/// Test: the appearance cache is bounded by terrains x shade bands, and
/// after a few chunks the hit rate dwarfs the miss rate.
#[test]
fn test_appearance_cache_stays_bounded() {
    let gen = generator();
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    for i in 0..4 {
        let _ = gen.generate(ChunkCoord::new(i, -i), &mut rng);
    }

    let synth = gen.synthesizer();
    let terrains = gen.table().definitions().len();
    let bound = terrains * SHADE_BANDS as usize;
    let stats = synth.stats();

    println!("Cached bitmaps: {} (bound {bound})", synth.cached_bitmaps());
    println!("Hits: {} Misses: {}", stats.hits, stats.misses);

    assert!(synth.cached_bitmaps() <= bound);
    assert!(
        stats.hits > stats.misses * 10,
        "four chunks of tiles must be overwhelmingly cache hits"
    );
}

/// Test: detail density lands near the configured chance.
#[test]
fn test_detail_density_is_plausible() {
    let gen = generator();
    let mut rng = ChaCha8Rng::seed_from_u64(2);

    let mut tiles = 0usize;
    let mut details = 0usize;
    for i in 0..4 {
        let chunk = gen.generate(ChunkCoord::new(i * 3, i), &mut rng);
        tiles += chunk.tiles().len();
        details += chunk.details().len();
    }

    #[allow(clippy::cast_precision_loss)]
    let rate = details as f64 / tiles as f64;
    println!("Detail rate: {rate:.4} over {tiles} tiles");

    // Stock chance is 0.1 for most terrains, 0.3 for lakes.
    assert!(rate > 0.02 && rate < 0.4, "detail rate {rate} implausible");
}

/// Test: two independently built pipelines agree tile for tile.
#[test]
fn test_world_is_seed_stable() {
    let gen_a = generator();
    let gen_b = generator();

    for y in -50..50 {
        for x in -50..50 {
            assert_eq!(
                gen_a.classify_tile(x * 7, y * 7),
                gen_b.classify_tile(x * 7, y * 7),
                "divergence at ({x}, {y})"
            );
        }
    }
}

/// Test: a different seed actually produces a different world.
#[test]
fn test_seed_changes_the_world() {
    let mut other = WorldConfig::default();
    other.seed ^= 0xDEAD_BEEF;

    let gen_a = generator();
    let gen_b =
        Arc::new(ChunkGenerator::from_config(&other).expect("stock catalog compiles"));

    let mut differing = 0usize;
    let mut total = 0usize;
    for y in (0..200).step_by(2) {
        for x in (0..200).step_by(2) {
            total += 1;
            if gen_a.classify_tile(x, y) != gen_b.classify_tile(x, y) {
                differing += 1;
            }
        }
    }

    println!("Differing tiles: {differing}/{total}");
    assert!(differing > total / 20, "seeds must decorrelate the terrain");
}
