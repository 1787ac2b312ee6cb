//! Bounded random sampling of the corpus.

use crate::core::traits::Sampler;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Draws a uniform subset without replacement.
///
/// The sampler owns its RNG for the whole run; it is seeded once, either from
/// OS entropy or from an explicit seed for reproducible runs.
#[derive(Debug, Clone)]
pub struct BoundedSampler {
    rng: StdRng,
}

impl BoundedSampler {
    /// Creates a sampler seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a sampler with a fixed seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Creates a seeded sampler when `seed` is set, an entropy-seeded one otherwise.
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::with_seed)
    }
}

impl<T> Sampler<T> for BoundedSampler {
    /// Removes uniformly chosen elements until `n` remain.
    ///
    /// Each removal swaps the chosen element with the last one and pops it, so
    /// the survivors come back in no particular order.
    fn sample(&mut self, mut data: Vec<T>, n: usize) -> Vec<T> {
        if n == 0 || n >= data.len() {
            return data;
        }
        while data.len() > n {
            let idx = self.rng.gen_range(0..data.len());
            data.swap_remove(idx);
        }
        data
    }
}
