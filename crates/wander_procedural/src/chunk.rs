//! # Chunk System
//!
//! The world is generated, cached and evicted in fixed-size square
//! chunks of classified, textured tiles.
//!
//! ## Ownership
//!
//! The [`ChunkStore`] exclusively owns the coordinate → chunk mapping;
//! no other component mutates it. A chunk is created whole — consumers
//! never observe a partially generated chunk — and destroyed whole on
//! eviction. The shared bitmap cache is *not* touched by eviction:
//! appearances repeat across the world and survive any single chunk.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use wander_core::config::WorldConfig;

use crate::detail::{DetailId, DetailPlacer};
use crate::noise::{NoiseField, NoiseVector, WorldSeed};
use crate::rules::{CompiledRuleTable, TableResult, TerrainId};
use crate::synth::{BitmapHandle, TileSynthesizer};
use crate::texture::TextureFieldSet;

/// Chunk coordinate in the world grid (in chunks, not tiles).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChunkCoord {
    /// X coordinate.
    pub x: i32,
    /// Y coordinate.
    pub y: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chunk containing a world tile coordinate.
    #[inline]
    #[must_use]
    pub const fn from_tile(tile_x: i32, tile_y: i32, chunk_size: u32) -> Self {
        Self {
            x: tile_x.div_euclid(chunk_size as i32),
            y: tile_y.div_euclid(chunk_size as i32),
        }
    }

    /// World tile coordinate of this chunk's origin corner.
    #[inline]
    #[must_use]
    pub const fn origin_tile(self, chunk_size: u32) -> (i64, i64) {
        (
            self.x as i64 * chunk_size as i64,
            self.y as i64 * chunk_size as i64,
        )
    }
}

/// One classified, textured grid cell. Immutable after creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tile {
    /// Classified terrain.
    pub terrain: TerrainId,
    /// Resolved appearance, ready for the renderer.
    pub bitmap: BitmapHandle,
}

/// A decorative sprite attached to one tile of a chunk.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetailInstance {
    /// Local tile x within the chunk.
    pub local_x: u32,
    /// Local tile y within the chunk.
    pub local_y: u32,
    /// Variant identifier, resolved to a sprite by the renderer.
    pub variant: DetailId,
    /// Display scale.
    pub scale: f64,
}

/// A generated chunk: `size × size` tiles plus decorative details.
pub struct Chunk {
    coord: ChunkCoord,
    size: u32,
    tiles: Vec<Tile>,
    details: Vec<DetailInstance>,
}

impl Chunk {
    /// This chunk's grid coordinate.
    #[inline]
    #[must_use]
    pub const fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Edge length in tiles.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Tile at local coordinates.
    #[inline]
    #[must_use]
    pub fn tile(&self, x: u32, y: u32) -> Tile {
        self.tiles[(y * self.size + x) as usize]
    }

    /// All tiles, row-major.
    #[inline]
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Decorative details placed in this chunk.
    #[inline]
    #[must_use]
    pub fn details(&self) -> &[DetailInstance] {
        &self.details
    }
}

/// The full per-tile generation pipeline: noise → classification →
/// appearance → decoration.
///
/// Constructed once per session and shared (via `Arc`) between the
/// synchronous store and the background workers. The bitmap cache is
/// the only interior-mutable piece and sits behind its own lock.
pub struct ChunkGenerator {
    field: NoiseField,
    table: CompiledRuleTable,
    synth: Mutex<TileSynthesizer>,
    placer: DetailPlacer,
    chunk_size: u32,
    shade_layer: usize,
}

impl ChunkGenerator {
    /// Builds the pipeline from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::rules::TableError`] if the terrain catalog
    /// does not compile.
    pub fn from_config(config: &WorldConfig) -> TableResult<Self> {
        let seed = WorldSeed::new(config.seed);
        let table = CompiledRuleTable::from_config(config)?;
        let placer = DetailPlacer::from_config(config, &table);
        let fields = TextureFieldSet::generate(
            seed.derive(0xF1E1D),
            config.tile_size,
            config.field_instances,
        );

        Ok(Self {
            field: NoiseField::new(seed, config.layers.clone()),
            table,
            synth: Mutex::new(TileSynthesizer::new(fields, config.tile_size)),
            placer,
            chunk_size: config.chunk_size,
            shade_layer: config.shade_layer,
        })
    }

    /// Generates one complete chunk.
    ///
    /// Classification is a pure function of coordinate and seed; the
    /// random source only feeds texture-instance picks and detail draws.
    #[must_use]
    pub fn generate<R: Rng>(&self, coord: ChunkCoord, rng: &mut R) -> Chunk {
        let size = self.chunk_size;
        let (origin_x, origin_y) = coord.origin_tile(size);
        let mut tiles = Vec::with_capacity((size * size) as usize);
        let mut details = Vec::new();
        let mut vector = NoiseVector::with_layers(self.field.layer_count());

        for local_y in 0..size {
            for local_x in 0..size {
                #[allow(clippy::cast_precision_loss)]
                let world_x = (origin_x + i64::from(local_x)) as f64;
                #[allow(clippy::cast_precision_loss)]
                let world_y = (origin_y + i64::from(local_y)) as f64;

                self.field.sample_vector_into(world_x, world_y, &mut vector);
                let terrain = self.table.classify(&vector);
                let def = self.table.definition(terrain);
                let bitmap =
                    self.synth
                        .lock()
                        .get_tile(def, vector.get(self.shade_layer), rng);

                tiles.push(Tile { terrain, bitmap });

                if let Some(choice) = self.placer.maybe_place(terrain, rng) {
                    details.push(DetailInstance {
                        local_x,
                        local_y,
                        variant: choice.variant,
                        scale: choice.scale,
                    });
                }
            }
        }

        Chunk {
            coord,
            size,
            tiles,
            details,
        }
    }

    /// Classifies a single world tile without building a chunk.
    #[must_use]
    pub fn classify_tile(&self, tile_x: i32, tile_y: i32) -> TerrainId {
        let vector = self
            .field
            .sample_vector(f64::from(tile_x), f64::from(tile_y));
        self.table.classify(&vector)
    }

    /// The compiled terrain catalog.
    #[inline]
    #[must_use]
    pub const fn table(&self) -> &CompiledRuleTable {
        &self.table
    }

    /// The detail placer (and its variant registry).
    #[inline]
    #[must_use]
    pub const fn placer(&self) -> &DetailPlacer {
        &self.placer
    }

    /// Locks and returns the shared bitmap cache, for renderers fetching
    /// pixel data behind handles.
    #[must_use]
    pub fn synthesizer(&self) -> MutexGuard<'_, TileSynthesizer> {
        self.synth.lock()
    }

    /// Chunk edge length in tiles.
    #[inline]
    #[must_use]
    pub const fn chunk_size(&self) -> u32 {
        self.chunk_size
    }
}

/// Store counters for one session.
#[derive(Clone, Copy, Debug, Default)]
pub struct StoreStats {
    /// Chunks generated (synchronously or merged from workers).
    pub generated: u64,
    /// Chunks evicted.
    pub evicted: u64,
}

/// Generates, caches and evicts chunks, keyed by chunk coordinate.
pub struct ChunkStore {
    chunks: HashMap<ChunkCoord, Chunk>,
    generator: Arc<ChunkGenerator>,
    rng: ChaCha8Rng,
    stats: StoreStats,
}

impl ChunkStore {
    /// Creates an empty store over a shared generator.
    #[must_use]
    pub fn new(generator: Arc<ChunkGenerator>, seed: WorldSeed) -> Self {
        Self {
            chunks: HashMap::new(),
            generator,
            rng: ChaCha8Rng::seed_from_u64(seed.derive(0xD1CE).value()),
            stats: StoreStats::default(),
        }
    }

    /// Generates and registers the chunk at `coord` if it is not already
    /// resident. Idempotent; repeated calls are no-ops.
    pub fn ensure(&mut self, coord: ChunkCoord) {
        if self.chunks.contains_key(&coord) {
            return;
        }
        let chunk = self.generator.generate(coord, &mut self.rng);
        self.register(chunk);
    }

    /// Registers a finished chunk (the worker-pool merge path).
    ///
    /// If the coordinate is already resident the incoming chunk is
    /// dropped: a key maps to at most one live chunk.
    pub fn register(&mut self, chunk: Chunk) {
        let coord = chunk.coord();
        if self.chunks.insert(coord, chunk).is_none() {
            self.stats.generated += 1;
            tracing::debug!(x = coord.x, y = coord.y, "chunk registered");
        }
    }

    /// Removes the chunk at `coord`, releasing its tile and detail
    /// records. Shared bitmaps are left in the cache.
    pub fn evict(&mut self, coord: ChunkCoord) {
        if self.chunks.remove(&coord).is_some() {
            self.stats.evicted += 1;
            tracing::debug!(x = coord.x, y = coord.y, "chunk evicted");
        }
    }

    /// True if the chunk at `coord` is resident.
    #[must_use]
    pub fn has(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    /// The resident chunk at `coord`, if any.
    #[must_use]
    pub fn get(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord)
    }

    /// Number of resident chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// True if no chunks are resident.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Coordinates of every resident chunk.
    pub fn coords(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.chunks.keys().copied()
    }

    /// The shared generation pipeline.
    #[must_use]
    pub const fn generator(&self) -> &Arc<ChunkGenerator> {
        &self.generator
    }

    /// Store counters.
    #[must_use]
    pub const fn stats(&self) -> StoreStats {
        self.stats
    }
}
