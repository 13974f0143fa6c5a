//! # Tile Bitmap Synthesis
//!
//! Builds the shaded, textured bitmap for a terrain appearance, behind a
//! cache keyed by appearance. Appearances repeat constantly across the
//! world — the shade input is quantized into bands — so the cache hit
//! path is the dominant cost saving of the whole engine.
//!
//! Cached bitmaps outlive any chunk: eviction never touches this cache.

use std::collections::HashMap;

use rand::Rng;

use wander_core::color::{quantize_shade, Rgba8};
use wander_core::config::TextureVariant;

use crate::rules::TerrainDefinition;
use crate::texture::{TextureField, TextureFieldSet};

/// Field values above this take the terrain's secondary color.
const BLEND_THRESHOLD: f64 = 0.5;

/// Sinusoidal edge displacement: amplitude in pixels.
const WAVE_AMPLITUDE_X: f64 = 2.74;
/// Sinusoidal edge displacement, y axis amplitude.
const WAVE_AMPLITUDE_Y: f64 = 2.7;
/// Sinusoidal edge displacement: wavelength divisor.
const WAVE_FREQUENCY: f64 = 7.4;

/// Identifies a cacheable tile appearance: the quantized base color plus
/// the terrain's texture category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AppearanceKey {
    /// Quantized, palette-interpolated base color.
    pub color: Rgba8,
    /// Texture category of the owning terrain.
    pub variant: TextureVariant,
}

/// Opaque reference to a synthesized bitmap.
///
/// Valid for the lifetime of the synthesizer that issued it; the
/// renderer treats it as a resource id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BitmapHandle(u32);

impl BitmapHandle {
    /// Raw index value, for renderers that mirror the bitmap list.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A rasterized square tile bitmap.
pub struct TileBitmap {
    size: u32,
    pixels: Vec<Rgba8>,
}

impl TileBitmap {
    /// Edge length in pixels.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Pixel at `(x, y)`.
    #[inline]
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Rgba8 {
        self.pixels[(y * self.size + x) as usize]
    }

    /// The pixel buffer as raw RGBA bytes, for upload by the renderer.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}

/// Bitmap cache counters for one session.
#[derive(Clone, Copy, Debug, Default)]
pub struct CacheStats {
    /// Appearance lookups answered from the cache.
    pub hits: u64,
    /// Appearance lookups that required synthesis.
    pub misses: u64,
}

/// Synthesizes tile bitmaps and owns the appearance cache.
///
/// Constructed once per world session and shared (behind a lock) by all
/// generation workers; nothing else writes the cache.
pub struct TileSynthesizer {
    fields: TextureFieldSet,
    tile_size: u32,
    lookup: HashMap<AppearanceKey, BitmapHandle>,
    bitmaps: Vec<TileBitmap>,
    stats: CacheStats,
}

impl TileSynthesizer {
    /// Creates a synthesizer over pre-generated texture fields.
    #[must_use]
    pub fn new(fields: TextureFieldSet, tile_size: u32) -> Self {
        Self {
            fields,
            tile_size,
            lookup: HashMap::new(),
            bitmaps: Vec::new(),
            stats: CacheStats::default(),
        }
    }

    /// Resolves the appearance for a terrain at a shade-noise value.
    ///
    /// `shade_noise` is a raw noise sample in [-1, 1]; it is mapped to
    /// the unit interval and quantized into shade bands before palette
    /// interpolation, so near-identical noise on neighboring tiles
    /// resolves to the same appearance.
    #[must_use]
    pub fn appearance_for(def: &TerrainDefinition, shade_noise: f64) -> AppearanceKey {
        let t = quantize_shade((shade_noise + 1.0) * 0.5);
        AppearanceKey {
            color: def.light.lerp(def.dark, t),
            variant: def.texture,
        }
    }

    /// Returns the bitmap handle for a terrain appearance, synthesizing
    /// and caching it on first use.
    ///
    /// The random source only selects which pre-generated field instance
    /// textures a *new* appearance; cached appearances are returned
    /// untouched, so repeated calls with one resolved key yield one
    /// handle.
    pub fn get_tile<R: Rng>(
        &mut self,
        def: &TerrainDefinition,
        shade_noise: f64,
        rng: &mut R,
    ) -> BitmapHandle {
        let key = Self::appearance_for(def, shade_noise);
        if let Some(&handle) = self.lookup.get(&key) {
            self.stats.hits += 1;
            return handle;
        }

        self.stats.misses += 1;
        let field = self.fields.pick(key.variant, rng);
        let bitmap = rasterize(self.tile_size, key.color, def.secondary, field);

        #[allow(clippy::cast_possible_truncation)]
        let handle = BitmapHandle(self.bitmaps.len() as u32);
        self.bitmaps.push(bitmap);
        self.lookup.insert(key, handle);
        handle
    }

    /// The bitmap behind a handle.
    #[inline]
    #[must_use]
    pub fn bitmap(&self, handle: BitmapHandle) -> &TileBitmap {
        &self.bitmaps[handle.index()]
    }

    /// Number of distinct appearances synthesized so far.
    #[must_use]
    pub fn cached_bitmaps(&self) -> usize {
        self.bitmaps.len()
    }

    /// Cache counters.
    #[must_use]
    pub const fn stats(&self) -> CacheStats {
        self.stats
    }
}

/// Fills and textures one bitmap.
///
/// Every pixel starts from the base color; where the texture field
/// exceeds the blend threshold the secondary color substitutes. The
/// shade factor follows the field so plates and speckles read as relief
/// rather than flat stamps. Finally each pixel's draw position is
/// displaced by two small sine waves, one per axis, which breaks the
/// square tile edge into an irregular silhouette.
fn rasterize(size: u32, base: Rgba8, secondary: Rgba8, field: &TextureField) -> TileBitmap {
    let mut pixels = vec![base; (size * size) as usize];

    for y in 0..size {
        for x in 0..size {
            let v = field.get(x, y);
            let color = if v > BLEND_THRESHOLD { secondary } else { base };
            let color = color.scaled(0.95 + v * 0.1);

            let wave_x = (f64::from(y) / WAVE_FREQUENCY).sin() * WAVE_AMPLITUDE_X;
            let wave_y = (f64::from(x) / WAVE_FREQUENCY).cos() * WAVE_AMPLITUDE_Y;
            let tx = displace(x, wave_x, size);
            let ty = displace(y, wave_y, size);

            pixels[(ty * size + tx) as usize] = color;
        }
    }

    TileBitmap { size, pixels }
}

/// Applies a wave offset to a pixel coordinate, wrapping at tile edges
/// so displaced pixels stay inside the bitmap.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn displace(coord: u32, wave: f64, size: u32) -> u32 {
    let shifted = (f64::from(coord) + wave).round() as i64;
    shifted.rem_euclid(i64::from(size)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use crate::noise::WorldSeed;

    const TILE: u32 = 16;

    fn synthesizer() -> TileSynthesizer {
        // One field instance per variant keeps tests fully deterministic.
        let fields = TextureFieldSet::generate(WorldSeed::new(42), TILE, 1);
        TileSynthesizer::new(fields, TILE)
    }

    fn grass() -> TerrainDefinition {
        TerrainDefinition {
            name: "GRASS".to_string(),
            light: Rgba8::from_hex(0x98FB98),
            dark: Rgba8::from_hex(0x8FF48F),
            secondary: Rgba8::from_hex(0x2E8B57),
            texture: TextureVariant::Mottle,
        }
    }

    #[test]
    fn test_cache_idempotence() {
        let mut synth = synthesizer();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let def = grass();

        let first = synth.get_tile(&def, 0.25, &mut rng);
        let second = synth.get_tile(&def, 0.25, &mut rng);

        assert_eq!(first, second, "same appearance must reuse the handle");
        assert_eq!(synth.cached_bitmaps(), 1, "no re-synthesis on a hit");
        assert_eq!(synth.stats().hits, 1);
        assert_eq!(synth.stats().misses, 1);
    }

    #[test]
    fn test_quantization_collapses_nearby_shades() {
        let mut synth = synthesizer();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let def = grass();

        // Both values land in the same shade band.
        let a = synth.get_tile(&def, 0.002, &mut rng);
        let b = synth.get_tile(&def, 0.004, &mut rng);
        assert_eq!(a, b);

        // A value a full band away must not.
        let c = synth.get_tile(&def, 0.3, &mut rng);
        assert_ne!(a, c);
    }

    #[test]
    fn test_distinct_variants_do_not_collide() {
        let mut synth = synthesizer();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let mut rocky = grass();
        rocky.texture = TextureVariant::Cellular;

        let a = synth.get_tile(&grass(), 0.0, &mut rng);
        let b = synth.get_tile(&rocky, 0.0, &mut rng);
        assert_ne!(a, b, "texture variant is part of the appearance key");
    }

    #[test]
    fn test_bitmap_dimensions_and_bytes() {
        let mut synth = synthesizer();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let handle = synth.get_tile(&grass(), 0.5, &mut rng);

        let bitmap = synth.bitmap(handle);
        assert_eq!(bitmap.size(), TILE);
        assert_eq!(bitmap.as_bytes().len(), (TILE * TILE * 4) as usize);
    }

    #[test]
    fn test_bitmap_is_textured_not_flat() {
        let mut synth = synthesizer();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let handle = synth.get_tile(&grass(), 0.0, &mut rng);
        let bitmap = synth.bitmap(handle);

        let mut colors = std::collections::HashSet::new();
        for y in 0..TILE {
            for x in 0..TILE {
                colors.insert(bitmap.pixel(x, y));
            }
        }
        assert!(colors.len() > 1, "texturing must vary the fill");
    }

    #[test]
    fn test_shade_maps_light_to_dark() {
        let def = grass();
        let bright = TileSynthesizer::appearance_for(&def, -1.0);
        let dark = TileSynthesizer::appearance_for(&def, 1.0);
        assert_eq!(bright.color, def.light);
        // Top band sits one quantization step shy of the dark endpoint.
        assert_ne!(dark.color, bright.color);
    }

    #[test]
    fn test_displacement_stays_in_bounds() {
        for coord in 0..TILE {
            for wave in [-3.0, -0.4, 0.0, 1.7, 3.0] {
                let out = displace(coord, wave, TILE);
                assert!(out < TILE);
            }
        }
    }
}
