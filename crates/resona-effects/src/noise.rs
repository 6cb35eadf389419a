//! Noise sources for impulse synthesis.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Produces one noise sample per call.
pub trait NoiseSource {
    /// Next sample, nominally in `[-1, 1)`.
    fn next_sample(&mut self) -> f32;
}

impl<N: NoiseSource + ?Sized> NoiseSource for &mut N {
    fn next_sample(&mut self) -> f32 {
        (**self).next_sample()
    }
}

/// Uniform white noise on `[-1, 1)` drawn from any `rand` generator.
///
/// ```rust
/// use resona_effects::{NoiseSource, UniformNoise};
///
/// let mut a = UniformNoise::seeded(7);
/// let mut b = UniformNoise::seeded(7);
/// let x = a.next_sample();
/// assert!((-1.0..1.0).contains(&x));
/// assert_eq!(x, b.next_sample());
/// ```
#[derive(Debug, Clone)]
pub struct UniformNoise<R = StdRng> {
    rng: R,
}

impl UniformNoise<StdRng> {
    /// Seeds from the operating system.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_os_rng())
    }

    /// Deterministic sequence for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> UniformNoise<R> {
    /// Wraps an existing generator.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Returns the wrapped generator.
    pub fn into_inner(self) -> R {
        self.rng
    }
}

impl Default for UniformNoise<StdRng> {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl<R: Rng> NoiseSource for UniformNoise<R> {
    #[inline]
    fn next_sample(&mut self) -> f32 {
        self.rng.random::<f32>() * 2.0 - 1.0
    }
}
