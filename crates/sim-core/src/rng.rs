//! Deterministic pseudo-random source shared by every stochastic decision
//! in the engine so that a fixed seed reproduces a fixed run byte-for-byte.

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seeded RNG wrapper. Two `DeterministicRng`s constructed from the same
/// seed and driven with the same call sequence produce identical output,
/// stable across process restarts.
#[derive(Clone, Debug)]
pub struct DeterministicRng {
    inner: ChaCha8Rng,
}

impl DeterministicRng {
    /// Construct from an explicit 64-bit seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Construct from an optional seed, falling back to a fixed default
    /// seed when none is supplied (still deterministic, just not caller
    /// controlled).
    pub fn new(seed: Option<u64>) -> Self {
        Self::from_seed(seed.unwrap_or(0x5EED_0000_0000_0001))
    }

    /// Uniform sample in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    /// Uniform sample in `[0, 1)` as `f32`.
    pub fn next_f32(&mut self) -> f32 {
        self.inner.gen::<f32>()
    }

    /// Bernoulli trial with success probability `p`, clamped to `[0,1]`.
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.inner.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Uniform integer in `[low, high)`.
    pub fn gen_range_u64(&mut self, low: u64, high: u64) -> u64 {
        if high <= low {
            return low;
        }
        self.inner.gen_range(low..high)
    }

    /// Uniform float in `[low, high)`.
    pub fn gen_range_f64(&mut self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        self.inner.gen_range(low..high)
    }

    /// Pick an index into `weights` proportional to the weights (all
    /// non-negative; a cumulative draw selects the covering bucket). Falls
    /// back to index 0 if all weights are zero or the slice is empty.
    pub fn weighted_index(&mut self, weights: &[f64]) -> usize {
        let total: f64 = weights.iter().copied().filter(|w| *w > 0.0).sum();
        if total <= 0.0 || weights.is_empty() {
            return 0;
        }
        let draw = self.next_f64() * total;
        let mut cumulative = 0.0;
        for (idx, w) in weights.iter().enumerate() {
            if *w <= 0.0 {
                continue;
            }
            cumulative += w;
            if draw < cumulative {
                return idx;
            }
        }
        weights.len() - 1
    }

    /// Pick the choice whose cumulative weight covers a uniform draw.
    pub fn weighted_choice<'a, T>(&mut self, choices: &'a [T], weights: &[f64]) -> &'a T {
        let idx = self.weighted_index(weights);
        &choices[idx.min(choices.len().saturating_sub(1))]
    }

    /// Raw `u64` draw, for seeding sub-RNGs deterministically.
    pub fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = DeterministicRng::from_seed(42);
        let mut b = DeterministicRng::from_seed(42);
        for _ in 0..100 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn different_seed_diverges() {
        let mut a = DeterministicRng::from_seed(1);
        let mut b = DeterministicRng::from_seed(2);
        let seq_a: Vec<u64> = (0..20).map(|_| a.next_u64()).collect();
        let seq_b: Vec<u64> = (0..20).map(|_| b.next_u64()).collect();
        assert_ne!(seq_a, seq_b);
    }

    #[test]
    fn weighted_choice_respects_zero_weights() {
        let mut rng = DeterministicRng::from_seed(7);
        let choices = ["a", "b", "c"];
        let weights = [0.0, 1.0, 0.0];
        for _ in 0..50 {
            assert_eq!(*rng.weighted_choice(&choices, &weights), "b");
        }
    }

    #[test]
    fn next_f64_in_unit_interval() {
        let mut rng = DeterministicRng::from_seed(99);
        for _ in 0..1000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v));
        }
    }
}
