//! # Configuration Error Types
//!
//! Every way a world configuration can be rejected at startup.
//!
//! Configuration problems are fatal: a session is never started on top of
//! a half-valid terrain catalog.

use thiserror::Error;

/// Errors produced while loading or validating a world configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The TOML document itself could not be parsed.
    #[error("invalid configuration file: {0}")]
    Parse(#[from] toml::de::Error),

    /// No noise layers were declared.
    #[error("configuration declares no noise layers")]
    NoLayers,

    /// No terrain definitions were declared.
    #[error("configuration declares no terrains")]
    NoTerrains,

    /// Two terrains share the same name.
    #[error("duplicate terrain name: {0}")]
    DuplicateTerrain(String),

    /// The designated fallback terrain is not in the catalog.
    #[error("fallback terrain not declared: {0}")]
    UnknownFallback(String),

    /// A terrain declares no classification rules at all.
    #[error("terrain {terrain} declares no rules")]
    NoRules {
        /// The offending terrain name.
        terrain: String,
    },

    /// A rule constrains zero noise layers, which would match everything.
    #[error("terrain {terrain} has a rule with no conditions")]
    EmptyRule {
        /// The offending terrain name.
        terrain: String,
    },

    /// A rule references a noise layer that does not exist.
    #[error("terrain {terrain} references layer {layer}, only {layer_count} declared")]
    LayerOutOfRange {
        /// The offending terrain name.
        terrain: String,
        /// The referenced layer index.
        layer: usize,
        /// How many layers the configuration declares.
        layer_count: usize,
    },

    /// A rule range has `min > max` and can never match.
    #[error("terrain {terrain} has an inverted range on layer {layer}")]
    InvertedRange {
        /// The offending terrain name.
        terrain: String,
        /// The constrained layer index.
        layer: usize,
    },

    /// A detail table targets a terrain that is not in the catalog.
    #[error("detail table targets unknown terrain: {0}")]
    UnknownDetailTerrain(String),

    /// A detail table's weights are malformed.
    #[error("detail table for {terrain} has bad weights (sum {sum})")]
    BadDetailWeights {
        /// The offending terrain name.
        terrain: String,
        /// The observed weight sum.
        sum: f64,
    },

    /// A probability is outside `[0, 1]`.
    #[error("chance {value} outside [0, 1]")]
    BadChance {
        /// The offending value.
        value: f64,
    },

    /// A size field that must be positive is zero.
    #[error("{field} must be greater than zero")]
    ZeroDimension {
        /// Which field was zero.
        field: &'static str,
    },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
