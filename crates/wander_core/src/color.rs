//! # Color Math
//!
//! Tile colors are plain RGBA quads. Terrain palettes interpolate between
//! a light and a dark endpoint; the interpolation parameter is quantized
//! into a fixed number of bands so that near-identical noise values on
//! adjacent tiles resolve to the *same* color instead of a one-bit-off
//! jitter that reads as visual static.

use bytemuck::{Pod, Zeroable};

/// Number of discrete shade bands between a palette's light and dark
/// endpoints. Small enough to keep the bitmap cache tight, large enough
/// that banding is invisible at tile scale.
pub const SHADE_BANDS: u32 = 20;

/// An 8-bit RGBA color.
///
/// `Pod` so a pixel buffer can be handed to a renderer as raw bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(C)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel (255 = opaque).
    pub a: u8,
}

impl Rgba8 {
    /// Creates an opaque color from a `0xRRGGBB` integer.
    #[inline]
    #[must_use]
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >> 8) & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
            a: 255,
        }
    }

    /// Returns the color as a `0xRRGGBB` integer (alpha dropped).
    #[inline]
    #[must_use]
    pub const fn to_hex(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
    }

    /// Linearly interpolates toward `other`.
    ///
    /// `t = 0.0` yields `self`, `t = 1.0` yields `other`. Values outside
    /// `[0, 1]` are clamped.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            r: lerp_channel(self.r, other.r, t),
            g: lerp_channel(self.g, other.g, t),
            b: lerp_channel(self.b, other.b, t),
            a: lerp_channel(self.a, other.a, t),
        }
    }

    /// Scales each color channel by `factor`, clamping to the valid range.
    ///
    /// Alpha is left untouched.
    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            r: scale_channel(self.r, factor),
            g: scale_channel(self.g, factor),
            b: scale_channel(self.b, factor),
            a: self.a,
        }
    }
}

/// Quantizes a unit-interval value into [`SHADE_BANDS`] discrete levels.
///
/// The result is the band's lower edge as a unit-interval value, so two
/// inputs inside the same band map to an identical output.
#[inline]
#[must_use]
pub fn quantize_shade(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    let band = (t * f64::from(SHADE_BANDS)).floor().min(f64::from(SHADE_BANDS - 1));
    band / f64::from(SHADE_BANDS)
}

#[inline]
fn lerp_channel(a: u8, b: u8, t: f64) -> u8 {
    let v = f64::from(a) + (f64::from(b) - f64::from(a)) * t;
    clamp_channel(v)
}

#[inline]
fn scale_channel(c: u8, factor: f64) -> u8 {
    clamp_channel(f64::from(c) * factor)
}

#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_channel(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        let c = Rgba8::from_hex(0x87CEFA);
        assert_eq!(c.r, 0x87);
        assert_eq!(c.g, 0xCE);
        assert_eq!(c.b, 0xFA);
        assert_eq!(c.a, 255);
        assert_eq!(c.to_hex(), 0x87CEFA);
    }

    #[test]
    fn test_lerp_endpoints() {
        let light = Rgba8::from_hex(0x000000);
        let dark = Rgba8::from_hex(0xFFFFFF);

        assert_eq!(light.lerp(dark, 0.0), light);
        assert_eq!(light.lerp(dark, 1.0), dark);
        assert_eq!(light.lerp(dark, -5.0), light, "t must clamp low");
        assert_eq!(light.lerp(dark, 5.0), dark, "t must clamp high");
    }

    #[test]
    fn test_lerp_midpoint() {
        let a = Rgba8::from_hex(0x000000);
        let b = Rgba8::from_hex(0xFF00FF);
        let mid = a.lerp(b, 0.5);
        assert_eq!(mid.r, 128);
        assert_eq!(mid.g, 0);
        assert_eq!(mid.b, 128);
    }

    #[test]
    fn test_scaled_clamps() {
        let c = Rgba8::from_hex(0xC0C0C0);
        let bright = c.scaled(10.0);
        assert_eq!((bright.r, bright.g, bright.b), (255, 255, 255));

        let dim = c.scaled(0.5);
        assert_eq!(dim.r, 96);
        assert_eq!(dim.a, 255, "alpha untouched by scaling");
    }

    #[test]
    fn test_quantize_collapses_neighbors() {
        // Two values inside the same band must quantize identically.
        let a = quantize_shade(0.501);
        let b = quantize_shade(0.549);
        assert!((a - b).abs() < f64::EPSILON);

        // Values in different bands must not.
        let c = quantize_shade(0.56);
        assert!((a - c).abs() > f64::EPSILON);
    }

    #[test]
    fn test_quantize_edges() {
        assert!((quantize_shade(0.0) - 0.0).abs() < f64::EPSILON);
        // 1.0 lands in the top band, not past it.
        let top = quantize_shade(1.0);
        assert!(top < 1.0);
        assert!((top - f64::from(SHADE_BANDS - 1) / f64::from(SHADE_BANDS)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_band_count_distinct_levels() {
        let mut levels = std::collections::HashSet::new();
        for i in 0..=1000 {
            let t = f64::from(i) / 1000.0;
            levels.insert(quantize_shade(t).to_bits());
        }
        assert_eq!(levels.len(), SHADE_BANDS as usize);
    }
}
