//! # Coherent Noise
//!
//! Deterministic 2-D gradient noise plus the layered sampling that turns
//! one world coordinate into a noise vector.
//!
//! ## Determinism Guarantee
//!
//! Given the same [`WorldSeed`], sampling produces **exactly** the same
//! values on any platform, any time. Everything downstream — terrain
//! classification, palettes, chunk contents — leans on this.

use wander_core::config::NoiseLayerConfig;

/// World seed for deterministic generation.
///
/// All procedural state derives from this seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WorldSeed(u64);

impl WorldSeed {
    /// Creates a new world seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Returns the raw seed value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Derives an independent sub-seed for a specific purpose
    /// (texture fields, detail draws, worker streams).
    #[inline]
    #[must_use]
    pub const fn derive(self, purpose: u64) -> Self {
        Self(mix64(self.0 ^ purpose.wrapping_mul(0x9E37_79B9_7F4A_7C15)))
    }
}

impl Default for WorldSeed {
    fn default() -> Self {
        Self(0xBAD5_EED5_0F75_0BAD)
    }
}

/// SplitMix64 finalizer. Full-avalanche, `const`-evaluable.
#[inline]
pub(crate) const fn mix64(v: u64) -> u64 {
    let mut z = v.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Unit gradient directions for 2-D sampling.
///
/// Eight directions, diagonals normalized, so the raw dot products stay
/// inside a known bound and the output can be rescaled to [-1, 1].
const GRADIENTS: [[f64; 2]; 8] = [
    [1.0, 0.0],
    [-1.0, 0.0],
    [0.0, 1.0],
    [0.0, -1.0],
    [std::f64::consts::FRAC_1_SQRT_2, std::f64::consts::FRAC_1_SQRT_2],
    [-std::f64::consts::FRAC_1_SQRT_2, std::f64::consts::FRAC_1_SQRT_2],
    [std::f64::consts::FRAC_1_SQRT_2, -std::f64::consts::FRAC_1_SQRT_2],
    [-std::f64::consts::FRAC_1_SQRT_2, -std::f64::consts::FRAC_1_SQRT_2],
];

/// 2-D gradient noise generator.
///
/// Produces smooth, continuous values in [-1, 1] for arbitrary float
/// coordinates.
///
/// # Performance
///
/// - O(1) per sample
/// - No allocations
pub struct GradientNoise {
    /// 512-entry permutation table (256 entries doubled to skip wrapping).
    perm: [u8; 512],
}

impl GradientNoise {
    /// Rescale factor: unit gradients bound raw 2-D output to ±√2/2.
    const AMPLITUDE: f64 = std::f64::consts::SQRT_2;

    /// Creates a generator from a seed.
    #[must_use]
    pub fn new(seed: WorldSeed) -> Self {
        let mut perm = [0u8; 512];
        for (i, slot) in perm.iter_mut().take(256).enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            {
                *slot = i as u8;
            }
        }

        // Fisher-Yates with a SplitMix64 stream.
        let mut state = seed.value();
        for i in (1..256usize).rev() {
            state = mix64(state);
            #[allow(clippy::cast_possible_truncation)]
            let j = (state as usize) % (i + 1);
            perm.swap(i, j);
        }
        for i in 0..256 {
            perm[256 + i] = perm[i];
        }

        Self { perm }
    }

    /// Samples noise at the given coordinates.
    ///
    /// # Returns
    ///
    /// A value in [-1, 1], continuous in both arguments.
    #[must_use]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let xi = fast_floor(x);
        let yi = fast_floor(y);
        let xf = x - f64::from(xi);
        let yf = y - f64::from(yi);

        let u = fade(xf);
        let v = fade(yf);

        let cx = (xi & 255) as usize;
        let cy = (yi & 255) as usize;

        let h00 = self.hash(cx, cy);
        let h10 = self.hash(cx + 1, cy);
        let h01 = self.hash(cx, cy + 1);
        let h11 = self.hash(cx + 1, cy + 1);

        let n00 = grad_dot(h00, xf, yf);
        let n10 = grad_dot(h10, xf - 1.0, yf);
        let n01 = grad_dot(h01, xf, yf - 1.0);
        let n11 = grad_dot(h11, xf - 1.0, yf - 1.0);

        let nx0 = lerp(n00, n10, u);
        let nx1 = lerp(n01, n11, u);
        let raw = lerp(nx0, nx1, v);

        (raw * Self::AMPLITUDE).clamp(-1.0, 1.0)
    }

    /// Hashes a lattice corner into a gradient selector.
    #[inline]
    fn hash(&self, cx: usize, cy: usize) -> u8 {
        self.perm[(self.perm[cx & 511] as usize + cy) & 511]
    }
}

/// One scalar per configured noise layer, in layer order.
///
/// Reused as a scratch buffer across tiles; never persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct NoiseVector {
    values: Vec<f64>,
}

impl NoiseVector {
    /// Creates a zeroed vector sized for `layer_count` layers.
    #[must_use]
    pub fn with_layers(layer_count: usize) -> Self {
        Self {
            values: vec![0.0; layer_count],
        }
    }

    /// Wraps explicit values (mainly for tests and rule-table callers).
    #[must_use]
    pub fn from_values(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Value of layer `index`.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> f64 {
        self.values[index]
    }

    /// All layer values, in layer order.
    #[inline]
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of layers.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if no layers are present.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Layered noise sampler: one coherent-noise source viewed through each
/// configured layer's scale and offset.
pub struct NoiseField {
    noise: GradientNoise,
    layers: Vec<NoiseLayerConfig>,
}

impl NoiseField {
    /// Creates a field from a seed and the session's layer list.
    #[must_use]
    pub fn new(seed: WorldSeed, layers: Vec<NoiseLayerConfig>) -> Self {
        Self {
            noise: GradientNoise::new(seed),
            layers,
        }
    }

    /// Number of configured layers.
    #[inline]
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Samples one layer at a world coordinate.
    ///
    /// The layer's scale multiplies the coordinate, then the offset is
    /// added, so layers with equal scale but different offsets are
    /// decorrelated views of the same noise.
    #[must_use]
    pub fn sample_layer(&self, index: usize, x: f64, y: f64) -> f64 {
        let layer = &self.layers[index];
        self.noise
            .sample(x * layer.scale + layer.offset_x, y * layer.scale + layer.offset_y)
    }

    /// Samples every layer into a fresh vector.
    #[must_use]
    pub fn sample_vector(&self, x: f64, y: f64) -> NoiseVector {
        let mut vector = NoiseVector::with_layers(self.layers.len());
        self.sample_vector_into(x, y, &mut vector);
        vector
    }

    /// Samples every layer into an existing vector, avoiding allocation
    /// in the per-tile hot path.
    ///
    /// # Panics
    ///
    /// Panics if `out` was not sized for this field's layer count.
    pub fn sample_vector_into(&self, x: f64, y: f64, out: &mut NoiseVector) {
        assert_eq!(out.values.len(), self.layers.len(), "vector sized for wrong layer count");
        for (index, slot) in out.values.iter_mut().enumerate() {
            let layer = &self.layers[index];
            *slot = self
                .noise
                .sample(x * layer.scale + layer.offset_x, y * layer.scale + layer.offset_y);
        }
    }
}

/// Quintic smoothstep; C2-continuous across lattice cell borders.
#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[inline]
fn grad_dot(hash: u8, dx: f64, dy: f64) -> f64 {
    let g = GRADIENTS[(hash & 7) as usize];
    g[0] * dx + g[1] * dy
}

/// Fast floor; `f64::floor` is measurably slower in this loop.
#[inline]
#[allow(clippy::cast_possible_truncation)]
fn fast_floor(x: f64) -> i32 {
    let xi = x as i32;
    if x < f64::from(xi) { xi - 1 } else { xi }
}
