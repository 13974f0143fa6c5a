//! # Procedural Texture Fields
//!
//! Per-variant synthetic noise fields used by tile synthesis. Each field
//! is a tile-sized grid of unit-interval values generated **once at
//! startup** from the world seed and reused for every tile of that
//! variant; synthesis itself never samples noise.
//!
//! A few field instances exist per variant so that tiles of the same
//! terrain do not all carry the identical speckle pattern. Which
//! instance a given appearance uses is one of the two sanctioned
//! randomness points in the engine.

use rand::Rng;

use wander_core::config::TextureVariant;

use crate::noise::{mix64, GradientNoise, WorldSeed};

/// A tile-sized grid of unit-interval texture values.
pub struct TextureField {
    size: u32,
    values: Vec<f64>,
}

impl TextureField {
    /// Field value at pixel `(x, y)`, in `[0, 1]`.
    #[inline]
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> f64 {
        self.values[(y * self.size + x) as usize]
    }

    /// Edge length in pixels.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    fn generate(variant: TextureVariant, seed: WorldSeed, size: u32) -> Self {
        let noise = GradientNoise::new(seed);
        let mut values = Vec::with_capacity((size * size) as usize);
        for y in 0..size {
            for x in 0..size {
                values.push(sample_variant(variant, &noise, seed, size, x, y));
            }
        }
        Self { size, values }
    }
}

/// All texture fields for a session: `instances` grids per variant.
pub struct TextureFieldSet {
    /// Indexed `[variant][instance]`.
    fields: Vec<Vec<TextureField>>,
}

impl TextureFieldSet {
    /// Generates every field from the world seed.
    #[must_use]
    pub fn generate(seed: WorldSeed, tile_size: u32, instances: u32) -> Self {
        let mut fields = Vec::with_capacity(TextureVariant::ALL.len());
        for variant in TextureVariant::ALL {
            let mut per_variant = Vec::with_capacity(instances as usize);
            for instance in 0..instances {
                let sub = seed
                    .derive(0x7E57 + variant.index() as u64)
                    .derive(u64::from(instance));
                per_variant.push(TextureField::generate(variant, sub, tile_size));
            }
            fields.push(per_variant);
        }
        Self { fields }
    }

    /// Picks one field instance for a variant with the injected random
    /// source.
    #[must_use]
    pub fn pick<R: Rng>(&self, variant: TextureVariant, rng: &mut R) -> &TextureField {
        let per_variant = &self.fields[variant.index()];
        &per_variant[rng.gen_range(0..per_variant.len())]
    }

    /// Number of instances per variant.
    #[must_use]
    pub fn instances(&self) -> usize {
        self.fields[0].len()
    }
}

/// Computes one pixel of a variant's field.
fn sample_variant(
    variant: TextureVariant,
    noise: &GradientNoise,
    seed: WorldSeed,
    size: u32,
    x: u32,
    y: u32,
) -> f64 {
    let fx = f64::from(x);
    let fy = f64::from(y);
    match variant {
        // Soft mottling: plain mid-frequency noise.
        TextureVariant::Mottle => unit(noise.sample(fx * 0.1, fy * 0.1)),
        // Grain: high-frequency speckle.
        TextureVariant::Grain => unit(noise.sample(fx * 0.55, fy * 0.55)),
        // Cellular plates with bright crack lines between them.
        TextureVariant::Cellular => cellular(seed, size, fx, fy),
        // Directional ripple: sine bands along x, bent by slow noise.
        TextureVariant::Ripple => {
            let bend = noise.sample(fx * 0.08, fy * 0.08) * 3.0;
            unit((fx * 0.35 + fy * 0.1 + bend).sin())
        }
        // Streaks stretched along x.
        TextureVariant::Streak => unit(noise.sample(fx * 0.06, fy * 0.4)),
    }
}

/// Maps [-1, 1] noise to the unit interval.
#[inline]
fn unit(v: f64) -> f64 {
    ((v + 1.0) * 0.5).clamp(0.0, 1.0)
}

/// Distance-to-nearest-feature-point field (Voronoi F1), normalized so
/// plate interiors sit near 0 and crack lines near 1.
fn cellular(seed: WorldSeed, size: u32, fx: f64, fy: f64) -> f64 {
    let cell = f64::from((size / 4).max(2));
    #[allow(clippy::cast_possible_truncation)]
    let gx = (fx / cell).floor() as i64;
    #[allow(clippy::cast_possible_truncation)]
    let gy = (fy / cell).floor() as i64;

    let mut best = f64::INFINITY;
    for dy in -1..=1 {
        for dx in -1..=1 {
            let (px, py) = feature_point(seed, gx + dx, gy + dy, cell);
            let dist = (fx - px).hypot(fy - py);
            best = best.min(dist);
        }
    }
    (best / cell).clamp(0.0, 1.0)
}

/// Deterministic feature point inside a Voronoi cell.
#[allow(clippy::cast_precision_loss, clippy::cast_sign_loss)]
fn feature_point(seed: WorldSeed, gx: i64, gy: i64, cell: f64) -> (f64, f64) {
    let h = mix64(seed.value() ^ mix64((gx as u64).wrapping_mul(0x9E37_79B9).wrapping_add(gy as u64)));
    let ox = (h & 0xFFFF) as f64 / 65536.0;
    let oy = ((h >> 16) & 0xFFFF) as f64 / 65536.0;
    ((gx as f64 + ox) * cell, (gy as f64 + oy) * cell)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const SIZE: u32 = 16;

    #[test]
    fn test_fields_are_unit_interval() {
        let set = TextureFieldSet::generate(WorldSeed::new(42), SIZE, 2);
        for variant in TextureVariant::ALL {
            let mut rng = ChaCha8Rng::seed_from_u64(0);
            let field = set.pick(variant, &mut rng);
            for y in 0..SIZE {
                for x in 0..SIZE {
                    let v = field.get(x, y);
                    assert!((0.0..=1.0).contains(&v), "{variant:?} value {v} at ({x}, {y})");
                }
            }
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = TextureFieldSet::generate(WorldSeed::new(7), SIZE, 3);
        let b = TextureFieldSet::generate(WorldSeed::new(7), SIZE, 3);
        for variant in TextureVariant::ALL {
            for instance in 0..3 {
                let fa = &a.fields[variant.index()][instance];
                let fb = &b.fields[variant.index()][instance];
                assert_eq!(fa.values, fb.values, "{variant:?} instance {instance}");
            }
        }
    }

    #[test]
    fn test_instances_differ() {
        let set = TextureFieldSet::generate(WorldSeed::new(7), SIZE, 2);
        let a = &set.fields[TextureVariant::Mottle.index()][0];
        let b = &set.fields[TextureVariant::Mottle.index()][1];
        assert_ne!(a.values, b.values, "instances must be decorrelated");
        assert_eq!(set.instances(), 2);
    }

    #[test]
    fn test_variants_differ() {
        let set = TextureFieldSet::generate(WorldSeed::new(7), SIZE, 1);
        let grain = &set.fields[TextureVariant::Grain.index()][0];
        let streak = &set.fields[TextureVariant::Streak.index()][0];
        assert_ne!(grain.values, streak.values);
    }

    #[test]
    fn test_field_size() {
        let set = TextureFieldSet::generate(WorldSeed::new(1), 8, 1);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(set.pick(TextureVariant::Ripple, &mut rng).size(), 8);
    }
}
