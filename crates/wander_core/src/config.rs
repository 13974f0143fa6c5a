//! # World Configuration
//!
//! Everything a world session needs to know, loaded once from TOML (or
//! built in code) and validated before any chunk is generated.
//!
//! The configuration is the *only* authority on terrain classification:
//! noise layers, threshold rules, palettes, texture variants and detail
//! tables all live here. Declaration order of terrains is significant —
//! it is the tie-break key for overlapping rules — and is preserved
//! exactly as written.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// One coherent-noise sampling pass.
///
/// Each layer contributes one scalar to a world coordinate's noise
/// vector; rules reference layers by their index in [`WorldConfig::layers`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoiseLayerConfig {
    /// Coordinate scale (smaller = broader features).
    pub scale: f64,
    /// X offset applied after scaling, decorrelates layers.
    #[serde(default)]
    pub offset_x: f64,
    /// Y offset applied after scaling.
    #[serde(default)]
    pub offset_y: f64,
}

/// Procedural texture category for a terrain's tile bitmaps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureVariant {
    /// Soft, plain mottling (grass, generic ground).
    Mottle,
    /// High-frequency grain (sand).
    Grain,
    /// Cellular, plate-like structure (rock).
    Cellular,
    /// Directional ripple (water).
    Ripple,
    /// Stretched horizontal streaks (ice, snow).
    Streak,
}

impl TextureVariant {
    /// Every variant, in a fixed order.
    pub const ALL: [Self; 5] = [
        Self::Mottle,
        Self::Grain,
        Self::Cellular,
        Self::Ripple,
        Self::Streak,
    ];

    /// Stable index of this variant into per-variant tables.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Mottle => 0,
            Self::Grain => 1,
            Self::Cellular => 2,
            Self::Ripple => 3,
            Self::Streak => 4,
        }
    }
}

/// One inclusive range constraint on one noise layer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConditionSpec {
    /// Index of the constrained noise layer.
    pub layer: usize,
    /// Inclusive lower bound (`-inf` = unbounded below).
    pub min: f64,
    /// Inclusive upper bound (`inf` = unbounded above).
    pub max: f64,
}

/// One terrain definition: palette, texture category and threshold rules.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainSpec {
    /// Terrain name, unique within the catalog.
    pub name: String,
    /// Light palette endpoint as `0xRRGGBB`.
    pub light: u32,
    /// Dark palette endpoint as `0xRRGGBB`.
    pub dark: u32,
    /// Secondary color blended in by the texture field; defaults to `dark`.
    #[serde(default)]
    pub secondary: Option<u32>,
    /// Texture category for this terrain's bitmaps.
    #[serde(default = "default_texture")]
    pub texture: TextureVariant,
    /// Classification rules; a rule matches when *all* its conditions hold.
    pub rules: Vec<Vec<ConditionSpec>>,
}

/// One weighted decorative variant inside a detail table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetailVariantSpec {
    /// Variant identifier, resolved to a sprite by the renderer.
    pub name: String,
    /// Selection weight; weights across a table sum to at most 1.
    pub weight: f64,
    /// Display scale override for this variant.
    #[serde(default)]
    pub scale: Option<f64>,
}

/// Decorative detail table for one terrain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetailTableSpec {
    /// Terrain this table applies to.
    pub terrain: String,
    /// Per-terrain placement chance, overriding the global default.
    #[serde(default)]
    pub chance: Option<f64>,
    /// Weighted variant list, walked in declaration order.
    pub variants: Vec<DetailVariantSpec>,
}

/// Complete world-session configuration.
///
/// Static for the lifetime of a session; there is no hot-reload contract.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// World seed; terrain classification is a pure function of this.
    #[serde(default)]
    pub seed: u64,
    /// Chunk edge length in tiles.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u32,
    /// Tile edge length in pixels.
    #[serde(default = "default_tile_size")]
    pub tile_size: u32,
    /// Pre-fetch margin around the viewport, in chunk widths.
    #[serde(default = "default_load_margin")]
    pub load_margin: f64,
    /// Global chance of a decorative detail per tile.
    #[serde(default = "default_detail_chance")]
    pub detail_chance: f64,
    /// Default display scale for details without an override.
    #[serde(default = "default_detail_scale")]
    pub detail_scale: f64,
    /// Variant used when weight accumulation exhausts a table.
    #[serde(default = "default_detail_name")]
    pub default_detail: String,
    /// Terrain returned when no rule matches a noise vector.
    pub fallback_terrain: String,
    /// Index of the noise layer that drives tile shading.
    #[serde(default)]
    pub shade_layer: usize,
    /// Pre-generated texture field instances per variant.
    #[serde(default = "default_field_instances")]
    pub field_instances: u32,
    /// Background generation worker threads.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Bound of the generation job/result queues.
    #[serde(default = "default_queue_depth")]
    pub queue_depth: usize,
    /// Noise layers, in vector order.
    pub layers: Vec<NoiseLayerConfig>,
    /// Terrain catalog, in declaration (tie-break) order.
    pub terrains: Vec<TerrainSpec>,
    /// Decorative detail tables.
    #[serde(default)]
    pub details: Vec<DetailTableSpec>,
}

fn default_texture() -> TextureVariant {
    TextureVariant::Mottle
}

fn default_chunk_size() -> u32 {
    64
}

fn default_tile_size() -> u32 {
    32
}

fn default_load_margin() -> f64 {
    0.5
}

fn default_detail_chance() -> f64 {
    0.1
}

fn default_detail_scale() -> f64 {
    2.0
}

fn default_detail_name() -> String {
    "stick".to_string()
}

fn default_field_instances() -> u32 {
    4
}

fn default_workers() -> usize {
    2
}

fn default_queue_depth() -> usize {
    256
}

impl WorldConfig {
    /// Parses and validates a configuration from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the document does not parse or fails
    /// any validation rule.
    pub fn from_toml_str(doc: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(doc)?;
        config.validate()?;
        Ok(config)
    }

    /// A small three-terrain world for tests: one noise layer, lake
    /// below -0.5, mountain above 0.5, grass between.
    #[must_use]
    pub fn test() -> Self {
        Self {
            seed: 42,
            chunk_size: 8,
            tile_size: 8,
            load_margin: 0.0,
            detail_chance: 0.1,
            detail_scale: 2.0,
            default_detail: "stick".to_string(),
            fallback_terrain: "GRASS".to_string(),
            shade_layer: 0,
            field_instances: 2,
            workers: 2,
            queue_depth: 64,
            layers: vec![NoiseLayerConfig {
                scale: 0.05,
                offset_x: 0.0,
                offset_y: 0.0,
            }],
            terrains: vec![
                terrain("LAKE", 0x87CE_FA, 0x4682_B4, TextureVariant::Ripple, vec![
                    vec![cond(0, f64::NEG_INFINITY, -0.5)],
                ]),
                terrain("GRASS", 0x98FB_98, 0x8FF4_8F, TextureVariant::Mottle, vec![
                    vec![cond(0, -0.5, 0.5)],
                ]),
                terrain("MOUNTAIN", 0xBEBE_BE, 0xB4B4_B4, TextureVariant::Cellular, vec![
                    vec![cond(0, 0.5, f64::INFINITY)],
                ]),
            ],
            details: vec![DetailTableSpec {
                terrain: "GRASS".to_string(),
                chance: None,
                variants: vec![
                    variant("flower", 0.6),
                    variant("stick", 0.4),
                ],
            }],
        }
    }

    /// Validates the configuration as a whole.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found. Validation is exhaustive
    /// enough that a configuration passing here cannot fail rule-table
    /// compilation later.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroDimension { field: "chunk_size" });
        }
        if self.tile_size == 0 {
            return Err(ConfigError::ZeroDimension { field: "tile_size" });
        }
        if self.field_instances == 0 {
            return Err(ConfigError::ZeroDimension { field: "field_instances" });
        }
        if self.workers == 0 {
            return Err(ConfigError::ZeroDimension { field: "workers" });
        }
        if self.queue_depth == 0 {
            return Err(ConfigError::ZeroDimension { field: "queue_depth" });
        }
        if self.layers.is_empty() {
            return Err(ConfigError::NoLayers);
        }
        if self.terrains.is_empty() {
            return Err(ConfigError::NoTerrains);
        }
        if self.shade_layer >= self.layers.len() {
            return Err(ConfigError::LayerOutOfRange {
                terrain: "<shade_layer>".to_string(),
                layer: self.shade_layer,
                layer_count: self.layers.len(),
            });
        }
        if !(0.0..=1.0).contains(&self.detail_chance) {
            return Err(ConfigError::BadChance {
                value: self.detail_chance,
            });
        }

        let mut names = std::collections::HashSet::new();
        for spec in &self.terrains {
            if !names.insert(spec.name.as_str()) {
                return Err(ConfigError::DuplicateTerrain(spec.name.clone()));
            }
            self.validate_terrain(spec)?;
        }

        if !names.contains(self.fallback_terrain.as_str()) {
            return Err(ConfigError::UnknownFallback(self.fallback_terrain.clone()));
        }

        for table in &self.details {
            if !names.contains(table.terrain.as_str()) {
                return Err(ConfigError::UnknownDetailTerrain(table.terrain.clone()));
            }
            if let Some(chance) = table.chance {
                if !(0.0..=1.0).contains(&chance) {
                    return Err(ConfigError::BadChance { value: chance });
                }
            }
            let sum: f64 = table.variants.iter().map(|v| v.weight).sum();
            let malformed = table.variants.iter().any(|v| v.weight <= 0.0);
            if malformed || sum > 1.0 + 1e-9 {
                return Err(ConfigError::BadDetailWeights {
                    terrain: table.terrain.clone(),
                    sum,
                });
            }
        }

        Ok(())
    }

    fn validate_terrain(&self, spec: &TerrainSpec) -> ConfigResult<()> {
        if spec.rules.is_empty() {
            return Err(ConfigError::NoRules {
                terrain: spec.name.clone(),
            });
        }
        for rule in &spec.rules {
            if rule.is_empty() {
                return Err(ConfigError::EmptyRule {
                    terrain: spec.name.clone(),
                });
            }
            for cond in rule {
                if cond.layer >= self.layers.len() {
                    return Err(ConfigError::LayerOutOfRange {
                        terrain: spec.name.clone(),
                        layer: cond.layer,
                        layer_count: self.layers.len(),
                    });
                }
                if cond.min > cond.max {
                    return Err(ConfigError::InvertedRange {
                        terrain: spec.name.clone(),
                        layer: cond.layer,
                    });
                }
            }
        }
        Ok(())
    }
}

impl Default for WorldConfig {
    /// The stock overworld catalog: three noise layers (base terrain,
    /// variation, coarse biome) and six terrains with overlapping rules —
    /// lakes carved by the biome layer, sand islands inside lakes, grass
    /// islands on the variation layer, snow overriding everything.
    fn default() -> Self {
        let neg = f64::NEG_INFINITY;
        let inf = f64::INFINITY;
        Self {
            seed: 0,
            chunk_size: default_chunk_size(),
            tile_size: default_tile_size(),
            load_margin: default_load_margin(),
            detail_chance: default_detail_chance(),
            detail_scale: default_detail_scale(),
            default_detail: default_detail_name(),
            fallback_terrain: "GRASS".to_string(),
            shade_layer: 0,
            field_instances: default_field_instances(),
            workers: default_workers(),
            queue_depth: default_queue_depth(),
            layers: vec![
                // Main terrain noise.
                NoiseLayerConfig {
                    scale: 0.03,
                    offset_x: 0.0,
                    offset_y: 0.0,
                },
                // Variation in terrain noise.
                NoiseLayerConfig {
                    scale: 0.03,
                    offset_x: 300.0,
                    offset_y: 200.0,
                },
                // Biome noise.
                NoiseLayerConfig {
                    scale: 0.004,
                    offset_x: 200.0,
                    offset_y: 300.0,
                },
            ],
            terrains: vec![
                terrain("LAKE", 0x87CE_FA, 0x82C7_F5, TextureVariant::Ripple, vec![
                    vec![cond(0, neg, -0.3)],
                    // Lake biome band.
                    vec![cond(0, neg, 0.0), cond(2, -1.0, -0.8)],
                ]),
                terrain("SAND", 0xFAEB_D7, 0xF5E3_C9, TextureVariant::Grain, vec![
                    vec![cond(0, -0.3, -0.1)],
                    // Sand islands in lakes.
                    vec![cond(0, 0.0, 0.1), cond(2, -1.0, -0.8)],
                ]),
                terrain("GRASS", 0x98FB_98, 0x8FF4_8F, TextureVariant::Mottle, vec![
                    vec![cond(0, -0.1, 0.3)],
                    // Grass islands in lakes.
                    vec![cond(0, neg, -0.3), cond(1, 0.6, inf)],
                ]),
                terrain("FOREST", 0x2E8B_57, 0x2A82_51, TextureVariant::Mottle, vec![
                    vec![cond(0, 0.3, 0.7)],
                ]),
                terrain("MOUNTAIN", 0xBEBE_BE, 0xB4B4_B4, TextureVariant::Cellular, vec![
                    vec![cond(0, 0.4, inf)],
                ]),
                terrain("SNOW", 0xFFFF_FF, 0xF0F0_F0, TextureVariant::Streak, vec![
                    // Snow biome, overrides everything.
                    vec![cond(2, 0.7, inf)],
                ]),
            ],
            details: vec![
                DetailTableSpec {
                    terrain: "GRASS".to_string(),
                    chance: None,
                    variants: vec![
                        variant("flower", 0.4),
                        variant("stick", 0.2),
                        variant("bush", 0.4),
                    ],
                },
                DetailTableSpec {
                    terrain: "FOREST".to_string(),
                    chance: None,
                    variants: vec![
                        variant("flower", 0.4),
                        variant("stick", 0.2),
                        variant("bush", 0.4),
                    ],
                },
                DetailTableSpec {
                    terrain: "MOUNTAIN".to_string(),
                    chance: None,
                    variants: vec![variant("stone", 0.7), variant("pebbles", 0.3)],
                },
                DetailTableSpec {
                    terrain: "SAND".to_string(),
                    chance: None,
                    variants: vec![variant("stick", 0.8), variant("bush", 0.2)],
                },
                DetailTableSpec {
                    terrain: "LAKE".to_string(),
                    chance: Some(0.3),
                    variants: vec![variant("lily_pad", 1.0)],
                },
            ],
        }
    }
}

fn terrain(
    name: &str,
    light: u32,
    dark: u32,
    texture: TextureVariant,
    rules: Vec<Vec<ConditionSpec>>,
) -> TerrainSpec {
    TerrainSpec {
        name: name.to_string(),
        light,
        dark,
        secondary: None,
        texture,
        rules,
    }
}

const fn cond(layer: usize, min: f64, max: f64) -> ConditionSpec {
    ConditionSpec { layer, min, max }
}

fn variant(name: &str, weight: f64) -> DetailVariantSpec {
    DetailVariantSpec {
        name: name.to_string(),
        weight,
        scale: None,
    }
}
