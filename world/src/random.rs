//! Seedable random source shared by every stochastic decision in the world.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seed applied when neither the configuration nor the caller supplies one.
pub const DEFAULT_SEED: u64 = 0x7c31_5a0e_94d2_b8f1;

/// Uniform sampling and percentage tests over an explicitly seeded generator.
#[derive(Clone, Debug)]
pub struct RandomSource {
    rng: ChaCha8Rng,
}

impl RandomSource {
    /// Creates a random source whose sequence is fully determined by `seed`.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Integer drawn uniformly from `[min, max]`. Returns `min` when the range is empty.
    pub fn uniform_int(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..=max)
    }

    /// Real drawn from `[min, max)` as a uniform integer in `[min, max - 1]` plus a fraction.
    pub fn uniform_real(&mut self, min: i64, max: i64) -> f64 {
        let whole = self.uniform_int(min, max - 1);
        let fraction: f64 = self.rng.gen();
        whole as f64 + fraction
    }

    /// Returns `true` with probability `percent / 100`, clamped to `[0, 1]`.
    pub fn probability(&mut self, percent: f64) -> bool {
        percent > self.uniform_real(0, 100)
    }

    /// Fair coin.
    pub fn coin_flip(&mut self) -> bool {
        self.probability(50.0)
    }

    /// `-1` or `+1` with equal probability.
    pub fn sign(&mut self) -> i32 {
        if self.probability(50.0) {
            -1
        } else {
            1
        }
    }

    /// Index drawn uniformly from `[0, len)`. `len` must be non-zero.
    pub fn index(&mut self, len: usize) -> usize {
        let max = i64::try_from(len).unwrap_or(i64::MAX).saturating_sub(1);
        usize::try_from(self.uniform_int(0, max)).unwrap_or(0)
    }
}

impl Default for RandomSource {
    fn default() -> Self {
        Self::seeded(DEFAULT_SEED)
    }
}
