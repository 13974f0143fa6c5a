//! # Terrain Rule Table
//!
//! Maps a noise vector to a terrain category through an ordered,
//! preprocessed threshold-rule table.
//!
//! ## Precedence model
//!
//! Rules are bucketed by the *highest* noise layer they reference, and
//! buckets are scanned from the highest layer down: a coarse biome band
//! (layer 2) overrides base elevation (layer 0) no matter where either
//! terrain sits in the catalog. Within a bucket, rules with more
//! conditions run first, and declaration order breaks remaining ties.
//! Overlapping ranges are a designed feature — oases inside deserts,
//! islands inside lakes — so this ordering must never be "optimized"
//! into a first-match-by-declaration scan.

use thiserror::Error;

use wander_core::color::Rgba8;
use wander_core::config::{TextureVariant, WorldConfig};

use crate::noise::NoiseVector;

/// Identifier of a terrain in the compiled catalog.
///
/// Indexes the table's definition list; stable for a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TerrainId(u16);

impl TerrainId {
    /// Index into [`CompiledRuleTable::definitions`].
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Errors raised while compiling a rule table.
///
/// All of these are fatal configuration errors; there is no runtime
/// recovery from a broken catalog.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// The catalog is empty.
    #[error("no terrains declared")]
    NoTerrains,

    /// A terrain declares no rules and could never be selected.
    #[error("terrain {0} declares no rules")]
    NoRules(String),

    /// A rule with zero conditions would shadow every rule below it.
    #[error("terrain {0} has a rule with no conditions")]
    EmptyRule(String),

    /// A rule references a layer the session does not sample.
    #[error("terrain {terrain} references layer {layer}, only {layer_count} sampled")]
    LayerOutOfRange {
        /// The offending terrain name.
        terrain: String,
        /// The referenced layer.
        layer: usize,
        /// Number of sampled layers.
        layer_count: usize,
    },

    /// The fallback terrain is not in the catalog, so `classify` could
    /// not be total.
    #[error("fallback terrain not declared: {0}")]
    UnknownFallback(String),
}

/// Result type for rule-table operations.
pub type TableResult<T> = Result<T, TableError>;

/// A compiled terrain definition: palette and texture category.
#[derive(Clone, Debug)]
pub struct TerrainDefinition {
    /// Terrain name as declared in configuration.
    pub name: String,
    /// Light palette endpoint.
    pub light: Rgba8,
    /// Dark palette endpoint.
    pub dark: Rgba8,
    /// Secondary color blended in by the texture field.
    pub secondary: Rgba8,
    /// Texture category for tile synthesis.
    pub texture: TextureVariant,
}

/// One inclusive range over one layer.
#[derive(Clone, Copy, Debug)]
struct Condition {
    layer: usize,
    min: f64,
    max: f64,
}

/// A rule ready for matching, placed in its bucket.
#[derive(Clone, Debug)]
struct CompiledRule {
    terrain: TerrainId,
    conditions: Vec<Condition>,
    /// Catalog position of the owning terrain; the tie-break key.
    declaration: usize,
}

impl CompiledRule {
    /// True when every constrained layer lies inside its range.
    /// Bounds are inclusive on both ends; ±∞ means unbounded.
    fn matches(&self, vector: &NoiseVector) -> bool {
        self.conditions
            .iter()
            .all(|c| vector.get(c.layer) >= c.min && vector.get(c.layer) <= c.max)
    }
}

/// Preprocessed, ordered terrain rule table.
///
/// Built once per session from the configured catalog. Every declared
/// rule lands in exactly one bucket (keyed by its highest referenced
/// layer); buckets are pre-sorted so `classify` is a straight scan.
#[derive(Debug)]
pub struct CompiledRuleTable {
    buckets: Vec<Vec<CompiledRule>>,
    definitions: Vec<TerrainDefinition>,
    fallback: TerrainId,
}

impl CompiledRuleTable {
    /// Compiles the table from a world configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TableError`] for any catalog defect: empty catalog,
    /// terrain without rules, rule without conditions, out-of-range
    /// layer, or a missing fallback terrain.
    pub fn from_config(config: &WorldConfig) -> TableResult<Self> {
        if config.terrains.is_empty() {
            return Err(TableError::NoTerrains);
        }

        let layer_count = config.layers.len();
        let mut buckets: Vec<Vec<CompiledRule>> = vec![Vec::new(); layer_count];
        let mut definitions = Vec::with_capacity(config.terrains.len());
        let mut fallback = None;

        for (declaration, spec) in config.terrains.iter().enumerate() {
            if spec.rules.is_empty() {
                return Err(TableError::NoRules(spec.name.clone()));
            }

            #[allow(clippy::cast_possible_truncation)]
            let id = TerrainId(declaration as u16);
            if spec.name == config.fallback_terrain {
                fallback = Some(id);
            }

            for rule in &spec.rules {
                if rule.is_empty() {
                    return Err(TableError::EmptyRule(spec.name.clone()));
                }
                let mut highest = 0;
                let mut conditions = Vec::with_capacity(rule.len());
                for cond in rule {
                    if cond.layer >= layer_count {
                        return Err(TableError::LayerOutOfRange {
                            terrain: spec.name.clone(),
                            layer: cond.layer,
                            layer_count,
                        });
                    }
                    highest = highest.max(cond.layer);
                    conditions.push(Condition {
                        layer: cond.layer,
                        min: cond.min,
                        max: cond.max,
                    });
                }
                buckets[highest].push(CompiledRule {
                    terrain: id,
                    conditions,
                    declaration,
                });
            }

            definitions.push(TerrainDefinition {
                name: spec.name.clone(),
                light: Rgba8::from_hex(spec.light),
                dark: Rgba8::from_hex(spec.dark),
                secondary: Rgba8::from_hex(spec.secondary.unwrap_or(spec.dark)),
                texture: spec.texture,
            });
        }

        let fallback =
            fallback.ok_or_else(|| TableError::UnknownFallback(config.fallback_terrain.clone()))?;

        // More conditions first, then catalog order.
        for bucket in &mut buckets {
            bucket.sort_by(|a, b| {
                b.conditions
                    .len()
                    .cmp(&a.conditions.len())
                    .then(a.declaration.cmp(&b.declaration))
            });
        }

        Ok(Self {
            buckets,
            definitions,
            fallback,
        })
    }

    /// Resolves a noise vector to a terrain.
    ///
    /// Total: if no rule matches, the configured fallback is returned.
    #[must_use]
    pub fn classify(&self, vector: &NoiseVector) -> TerrainId {
        debug_assert_eq!(vector.len(), self.buckets.len(), "vector from a different session");
        for bucket in self.buckets.iter().rev() {
            for rule in bucket {
                if rule.matches(vector) {
                    return rule.terrain;
                }
            }
        }
        self.fallback
    }

    /// The compiled definition behind an id.
    #[inline]
    #[must_use]
    pub fn definition(&self, id: TerrainId) -> &TerrainDefinition {
        &self.definitions[id.index()]
    }

    /// All definitions, in catalog order.
    #[inline]
    #[must_use]
    pub fn definitions(&self) -> &[TerrainDefinition] {
        &self.definitions
    }

    /// Looks up a terrain id by name.
    #[must_use]
    pub fn terrain_by_name(&self, name: &str) -> Option<TerrainId> {
        self.definitions.iter().position(|d| d.name == name).map(|i| {
            #[allow(clippy::cast_possible_truncation)]
            TerrainId(i as u16)
        })
    }

    /// The designated fallback terrain.
    #[inline]
    #[must_use]
    pub const fn fallback(&self) -> TerrainId {
        self.fallback
    }
}
