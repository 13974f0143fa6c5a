//! # WANDER Core Types
//!
//! Leaf types shared by every crate in the workspace.
//!
//! ## Design Principles
//!
//! 1. **Data only**: no generation logic, no I/O beyond config loading
//! 2. **Loaded once**: a [`WorldConfig`] is built at startup, validated,
//!    and then treated as immutable for the whole session
//! 3. **Explicit failure**: malformed configuration is a fatal startup
//!    error, never a runtime surprise

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod color;
pub mod config;
pub mod error;

pub use color::Rgba8;
pub use config::{
    ConditionSpec, DetailTableSpec, DetailVariantSpec, NoiseLayerConfig, TerrainSpec,
    TextureVariant, WorldConfig,
};
pub use error::{ConfigError, ConfigResult};
