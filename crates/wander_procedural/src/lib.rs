//! # Wander Procedural Generation
//!
//! Deterministic tile-world generation for infinite, reproducible maps.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: same seed always produces the same terrain
//! 2. **Chunked**: the world is generated in fixed-size chunks
//! 3. **Streamable**: residency follows the camera; chunks load and
//!    unload independently
//! 4. **Cached**: tile appearances are memoized, so the per-tile hot
//!    path is a hash lookup
//!
//! ## Core Components
//!
//! - `GradientNoise` / `NoiseField`: layered 2-D coherent noise
//! - `CompiledRuleTable`: ordered terrain classification
//! - `TileSynthesizer`: shaded, textured tile bitmaps behind a cache
//! - `DetailPlacer`: weighted decorative sprite draws
//! - `ChunkGenerator` / `ChunkStore`: chunk production and residency
//! - `GenerationPool` / `ViewportStreamer`: background generation driven
//!   by the camera
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use wander_core::config::WorldConfig;
//! use wander_procedural::{ChunkGenerator, Viewport, ViewportStreamer};
//!
//! let config = WorldConfig::default();
//! let generator = Arc::new(ChunkGenerator::from_config(&config)?);
//! let mut streamer = ViewportStreamer::new(generator, &config);
//!
//! // Camera at the origin, 800x600 view.
//! streamer.update_blocking(Viewport::new(0.0, 0.0, 800.0, 600.0));
//! assert!(streamer.store().len() > 0);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod chunk;
pub mod detail;
pub mod noise;
pub mod rules;
pub mod streamer;
pub mod synth;
pub mod texture;
pub mod worker;

pub use chunk::{Chunk, ChunkCoord, ChunkGenerator, ChunkStore, DetailInstance, StoreStats, Tile};
pub use detail::{DetailChoice, DetailId, DetailPlacer, DetailRegistry};
pub use noise::{GradientNoise, NoiseField, NoiseVector, WorldSeed};
pub use rules::{CompiledRuleTable, TableError, TableResult, TerrainDefinition, TerrainId};
pub use streamer::{ChunkRect, StreamStats, Viewport, ViewportStreamer};
pub use synth::{AppearanceKey, BitmapHandle, CacheStats, TileBitmap, TileSynthesizer};
pub use texture::{TextureField, TextureFieldSet};
pub use worker::{GenerationPool, GenerationResult};
