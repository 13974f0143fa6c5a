//! # Viewport Streaming
//!
//! Drives chunk residency from a camera viewport: chunks overlapping the
//! margin-padded view rectangle are requested from the background pool,
//! merged as they complete, and chunks that fall outside the rectangle
//! are evicted.
//!
//! The streamer is the only component that mutates the store, so the
//! residency invariant is simple to state: after a blocking update,
//! exactly the chunks of the current view rectangle are resident.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use wander_core::config::WorldConfig;

use crate::chunk::{ChunkCoord, ChunkGenerator, ChunkStore};
use crate::noise::WorldSeed;
use crate::worker::{GenerationPool, GenerationResult};

/// Camera viewport in world pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Viewport {
    /// Creates a viewport.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }
}

/// Inclusive rectangle of chunk coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkRect {
    /// Leftmost chunk column.
    pub min_x: i32,
    /// Topmost chunk row.
    pub min_y: i32,
    /// Rightmost chunk column, inclusive.
    pub max_x: i32,
    /// Bottom chunk row, inclusive.
    pub max_y: i32,
}

impl ChunkRect {
    /// True if `coord` lies inside the rectangle.
    #[inline]
    #[must_use]
    pub const fn contains(&self, coord: ChunkCoord) -> bool {
        coord.x >= self.min_x && coord.x <= self.max_x && coord.y >= self.min_y && coord.y <= self.max_y
    }

    /// Every coordinate in the rectangle, row-major.
    pub fn coords(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        let xs = self.min_x..=self.max_x;
        (self.min_y..=self.max_y).flat_map(move |y| xs.clone().map(move |x| ChunkCoord::new(x, y)))
    }

    /// Number of chunks covered.
    #[must_use]
    pub fn area(&self) -> u64 {
        let w = i64::from(self.max_x) - i64::from(self.min_x) + 1;
        let h = i64::from(self.max_y) - i64::from(self.min_y) + 1;
        #[allow(clippy::cast_sign_loss)]
        {
            (w * h) as u64
        }
    }
}

/// Streaming counters for one session.
#[derive(Clone, Copy, Debug, Default)]
pub struct StreamStats {
    /// Viewport updates that changed the chunk rectangle.
    pub rect_changes: u64,
    /// Jobs submitted to the pool.
    pub requested: u64,
    /// Completed chunks merged into the store.
    pub merged: u64,
    /// Completed chunks discarded because the view had moved on.
    pub stale_dropped: u64,
    /// Skipped jobs resubmitted under a fresh epoch.
    pub resubmitted: u64,
}

/// Keeps the chunk store in sync with a moving camera.
pub struct ViewportStreamer {
    store: ChunkStore,
    pool: GenerationPool,
    pending: HashSet<ChunkCoord>,
    rect: Option<ChunkRect>,
    chunk_pixels: f64,
    margin: f64,
    stats: StreamStats,
}

impl ViewportStreamer {
    /// Creates a streamer over a shared pipeline, using the config's
    /// worker and margin settings.
    #[must_use]
    pub fn new(generator: Arc<ChunkGenerator>, config: &WorldConfig) -> Self {
        let seed = WorldSeed::new(config.seed);
        let pool = GenerationPool::new(
            Arc::clone(&generator),
            seed,
            config.workers,
            config.queue_depth,
        );

        Self {
            store: ChunkStore::new(generator, seed),
            pool,
            pending: HashSet::new(),
            rect: None,
            chunk_pixels: f64::from(config.chunk_size) * f64::from(config.tile_size),
            margin: config.load_margin,
            stats: StreamStats::default(),
        }
    }

    /// Chunk rectangle covered by a viewport plus the load margin.
    #[must_use]
    pub fn visible_rect(&self, viewport: Viewport) -> ChunkRect {
        let pad = self.margin * self.chunk_pixels;
        let lo_x = viewport.x - pad;
        let lo_y = viewport.y - pad;
        let hi_x = viewport.x + viewport.width + pad;
        let hi_y = viewport.y + viewport.height + pad;

        #[allow(clippy::cast_possible_truncation)]
        ChunkRect {
            min_x: (lo_x / self.chunk_pixels).floor() as i32,
            min_y: (lo_y / self.chunk_pixels).floor() as i32,
            max_x: (hi_x / self.chunk_pixels).floor() as i32,
            max_y: (hi_y / self.chunk_pixels).floor() as i32,
        }
    }

    /// Non-blocking update: requests missing chunks, merges any finished
    /// results, and evicts chunks outside the view rectangle.
    ///
    /// Idempotent with respect to the camera: an unchanged viewport
    /// submits no new work.
    pub fn update(&mut self, viewport: Viewport) {
        let rect = self.visible_rect(viewport);
        if self.rect != Some(rect) {
            if self.rect.is_some() {
                // In-flight jobs for the old rectangle are now suspect;
                // workers will answer them as skipped and pump decides.
                self.pool.advance_epoch();
            }
            self.rect = Some(rect);
            self.stats.rect_changes += 1;
            tracing::debug!(
                min_x = rect.min_x,
                min_y = rect.min_y,
                max_x = rect.max_x,
                max_y = rect.max_y,
                "view rectangle changed"
            );
        }

        self.request_missing();
        self.pump();
        self.evict_outside();
    }

    /// Blocking update: as [`Self::update`], but waits for every
    /// requested chunk before evicting, so the full new rectangle is
    /// resident on return.
    pub fn update_blocking(&mut self, viewport: Viewport) {
        let rect = self.visible_rect(viewport);
        if self.rect != Some(rect) {
            if self.rect.is_some() {
                self.pool.advance_epoch();
            }
            self.rect = Some(rect);
            self.stats.rect_changes += 1;
        }

        self.request_missing();
        while !self.pending.is_empty() {
            if let Some(result) = self.pool.recv_timeout(Duration::from_millis(200)) {
                self.merge(result);
            }
            self.request_missing();
        }
        self.evict_outside();
    }

    /// Merges any finished results without touching residency targets.
    pub fn pump(&mut self) {
        while let Some(result) = self.pool.try_recv() {
            self.merge(result);
        }
    }

    fn merge(&mut self, result: GenerationResult) {
        match result {
            GenerationResult::Completed { coord, chunk, .. } => {
                self.pending.remove(&coord);
                if self.rect.is_some_and(|r| r.contains(coord)) {
                    self.store.register(chunk);
                    self.stats.merged += 1;
                } else {
                    self.stats.stale_dropped += 1;
                }
            }
            GenerationResult::Skipped { coord, .. } => {
                self.pending.remove(&coord);
                // Still wanted under the new rectangle: resubmit at the
                // current epoch.
                if self.rect.is_some_and(|r| r.contains(coord))
                    && !self.store.has(coord)
                    && self.pool.submit(coord)
                {
                    self.pending.insert(coord);
                    self.stats.resubmitted += 1;
                }
            }
        }
    }

    fn request_missing(&mut self) {
        let Some(rect) = self.rect else { return };
        let wanted: Vec<ChunkCoord> = rect
            .coords()
            .filter(|c| !self.store.has(*c) && !self.pending.contains(c))
            .collect();
        for coord in wanted {
            if self.pool.submit(coord) {
                self.pending.insert(coord);
                self.stats.requested += 1;
            } else {
                // Queue full; the remainder waits for a later update.
                break;
            }
        }
    }

    fn evict_outside(&mut self) {
        let Some(rect) = self.rect else { return };
        let stale: Vec<ChunkCoord> = self.store.coords().filter(|c| !rect.contains(*c)).collect();
        for coord in stale {
            self.store.evict(coord);
        }
    }

    /// The chunk store, for render queries.
    #[must_use]
    pub const fn store(&self) -> &ChunkStore {
        &self.store
    }

    /// Coordinates requested but not yet answered.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// The current view rectangle, if an update has run.
    #[must_use]
    pub const fn rect(&self) -> Option<ChunkRect> {
        self.rect
    }

    /// Streaming counters.
    #[must_use]
    pub const fn stats(&self) -> StreamStats {
        self.stats
    }
}
