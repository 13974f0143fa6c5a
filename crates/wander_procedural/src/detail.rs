//! # Decorative Detail Placement
//!
//! Probabilistically attaches decorative sprites to tiles from
//! terrain-specific weighted tables.
//!
//! The engine only ever produces *variant identifiers*; resolving an id
//! to an actual sprite is the renderer's concern, and an unresolvable id
//! must not abort chunk generation. Detail draws are one of the two
//! sanctioned randomness points, fed by an injected seedable source.

use rand::Rng;

use wander_core::config::WorldConfig;

use crate::rules::{CompiledRuleTable, TerrainId};

/// Identifier of a detail variant in the session registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DetailId(u16);

impl DetailId {
    /// Index into [`DetailRegistry`] name storage.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Interned detail variant names for one session.
///
/// The renderer resolves ids back to names when it binds sprites.
pub struct DetailRegistry {
    names: Vec<String>,
}

impl DetailRegistry {
    fn intern(&mut self, name: &str) -> DetailId {
        if let Some(found) = self.resolve(name) {
            return found;
        }
        #[allow(clippy::cast_possible_truncation)]
        let id = DetailId(self.names.len() as u16);
        self.names.push(name.to_string());
        id
    }

    /// Looks up a variant id by name.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<DetailId> {
        self.names.iter().position(|n| n == name).map(|i| {
            #[allow(clippy::cast_possible_truncation)]
            DetailId(i as u16)
        })
    }

    /// The name behind an id.
    #[inline]
    #[must_use]
    pub fn name(&self, id: DetailId) -> &str {
        &self.names[id.index()]
    }

    /// Number of interned variants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True if nothing was interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// A detail chosen for one tile: the variant and its display scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetailChoice {
    /// Chosen variant.
    pub variant: DetailId,
    /// Display scale configured for the variant.
    pub scale: f64,
}

struct WeightedVariant {
    id: DetailId,
    weight: f64,
    scale: f64,
}

struct DetailTable {
    chance: f64,
    variants: Vec<WeightedVariant>,
}

/// Weighted decorative placement over the terrain catalog.
pub struct DetailPlacer {
    registry: DetailRegistry,
    /// Indexed by terrain id; `None` falls back to the default table.
    tables: Vec<Option<DetailTable>>,
    default_table: DetailTable,
    default_variant: DetailId,
    default_scale: f64,
}

impl DetailPlacer {
    /// Builds the placer from configuration, against a compiled catalog.
    ///
    /// Detail tables naming unknown terrains were already rejected by
    /// config validation; they are skipped defensively here.
    #[must_use]
    pub fn from_config(config: &WorldConfig, table: &CompiledRuleTable) -> Self {
        let mut registry = DetailRegistry { names: Vec::new() };
        let default_variant = registry.intern(&config.default_detail);

        let mut tables: Vec<Option<DetailTable>> = Vec::new();
        tables.resize_with(table.definitions().len(), || None);

        for spec in &config.details {
            let Some(terrain) = table.terrain_by_name(&spec.terrain) else {
                continue;
            };
            let variants = spec
                .variants
                .iter()
                .map(|v| WeightedVariant {
                    id: registry.intern(&v.name),
                    weight: v.weight,
                    scale: v.scale.unwrap_or(config.detail_scale),
                })
                .collect();
            tables[terrain.index()] = Some(DetailTable {
                chance: spec.chance.unwrap_or(config.detail_chance),
                variants,
            });
        }

        let default_table = DetailTable {
            chance: config.detail_chance,
            variants: vec![WeightedVariant {
                id: default_variant,
                weight: 1.0,
                scale: config.detail_scale,
            }],
        };

        Self {
            registry,
            tables,
            default_table,
            default_variant,
            default_scale: config.detail_scale,
        }
    }

    /// Rolls for a decorative detail on one tile.
    ///
    /// First draw gates on the table's chance; second draw walks the
    /// cumulative weight list. If float drift (or a weight sum below 1)
    /// exhausts the list, the designated default variant is chosen.
    pub fn maybe_place<R: Rng>(&self, terrain: TerrainId, rng: &mut R) -> Option<DetailChoice> {
        let table = self.tables[terrain.index()]
            .as_ref()
            .unwrap_or(&self.default_table);

        if rng.gen::<f64>() >= table.chance {
            return None;
        }

        let draw = rng.gen::<f64>();
        let mut cumulative = 0.0;
        for variant in &table.variants {
            cumulative += variant.weight;
            if draw < cumulative {
                return Some(DetailChoice {
                    variant: variant.id,
                    scale: variant.scale,
                });
            }
        }

        Some(DetailChoice {
            variant: self.default_variant,
            scale: self.default_scale,
        })
    }

    /// The session's variant registry.
    #[must_use]
    pub const fn registry(&self) -> &DetailRegistry {
        &self.registry
    }
}
