//! # Infinite Pan Integration Test
//!
//! Proves the camera can pan forever: the streamer keeps exactly the
//! view rectangle resident, evicts what falls behind, and reproduces
//! identical terrain when the camera returns.

use std::sync::Arc;
use std::time::Instant;

use wander_core::config::WorldConfig;
use wander_procedural::{ChunkCoord, ChunkGenerator, TerrainId, Viewport, ViewportStreamer};

fn streamer(config: &WorldConfig) -> ViewportStreamer {
    let generator = Arc::new(ChunkGenerator::from_config(config).expect("catalog compiles"));
    ViewportStreamer::new(generator, config)
}

fn chunk_pixels(config: &WorldConfig) -> f64 {
    f64::from(config.chunk_size) * f64::from(config.tile_size)
}

fn terrains_of(s: &ViewportStreamer, coord: ChunkCoord) -> Vec<TerrainId> {
    s.store()
        .get(coord)
        .expect("chunk resident")
        .tiles()
        .iter()
        .map(|t| t.terrain)
        .collect()
}

/// Test: pan 100 chunk-widths east; residency always matches the rect.
#[test]
fn test_long_eastward_pan() {
    let config = WorldConfig::test();
    let mut s = streamer(&config);
    let span = chunk_pixels(&config);

    let start = Instant::now();
    for step in 0..100 {
        let view = Viewport::new(f64::from(step) * span, 0.0, span, span);
        s.update_blocking(view);

        let rect = s.rect().expect("rect set after update");
        assert_eq!(
            s.store().len() as u64,
            rect.area(),
            "residency must equal the rect at step {step}"
        );
        for coord in rect.coords() {
            assert!(s.store().has(coord), "missing {coord:?} at step {step}");
        }
    }

    let elapsed = start.elapsed();
    println!("Panned 100 chunk-widths in {elapsed:?}");
    println!("Requested: {}", s.stats().requested);
    println!("Merged: {}", s.stats().merged);
    println!("Evicted: {}", s.store().stats().evicted);

    assert!(s.store().stats().evicted > 0, "a long pan must evict");
}

/// Test: leave and come back; the world must be exactly as it was.
#[test]
fn test_return_trip_reproduces_world() {
    let config = WorldConfig::test();
    let mut s = streamer(&config);
    let span = chunk_pixels(&config);
    let home = Viewport::new(0.0, 0.0, span, span);

    s.update_blocking(home);
    let origin = ChunkCoord::new(0, 0);
    let before = terrains_of(&s, origin);

    // Far enough that everything from home is evicted.
    s.update_blocking(Viewport::new(span * 50.0, span * 50.0, span, span));
    assert!(!s.store().has(origin), "home chunk evicted while away");

    s.update_blocking(home);
    let after = terrains_of(&s, origin);

    assert_eq!(before, after, "terrain must be identical on return");
    println!("Round trip: {} tiles verified identical", before.len());
}

/// Test: teleport across the world repeatedly; every destination loads
/// fully and the store never grows past one rectangle.
#[test]
fn test_teleport_stress() {
    let config = WorldConfig::test();
    let mut s = streamer(&config);
    let span = chunk_pixels(&config);

    let destinations = [
        (0.0, 0.0),
        (1_000_000.0, 0.0),
        (-1_000_000.0, -1_000_000.0),
        (123_456.0, -654_321.0),
        (0.0, 0.0),
    ];

    for (i, &(x, y)) in destinations.iter().enumerate() {
        s.update_blocking(Viewport::new(x, y, span * 2.0, span * 2.0));

        let rect = s.rect().expect("rect set");
        assert_eq!(
            s.store().len() as u64,
            rect.area(),
            "destination {i} must be exactly resident"
        );
        assert_eq!(s.pending(), 0, "blocking update leaves nothing pending");
    }

    println!("Teleported {} times", destinations.len());
    println!("Rect changes: {}", s.stats().rect_changes);
    println!("Stale results dropped: {}", s.stats().stale_dropped);
}

/// Test: non-blocking updates eventually converge to full residency.
#[test]
fn test_async_updates_converge() {
    let config = WorldConfig::test();
    let mut s = streamer(&config);
    let span = chunk_pixels(&config);
    let view = Viewport::new(0.0, 0.0, span, span);

    let deadline = Instant::now() + std::time::Duration::from_secs(10);
    loop {
        s.update(view);
        let rect = s.rect().expect("rect set");
        if rect.coords().all(|c| s.store().has(c)) {
            break;
        }
        assert!(Instant::now() < deadline, "streaming did not converge");
        std::thread::sleep(std::time::Duration::from_millis(5));
    }

    println!("Converged after {} requests", s.stats().requested);
}
