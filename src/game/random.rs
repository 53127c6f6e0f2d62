use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of randomness for spawn placement and food scattering.
pub trait RandomSource {
    /// Uniform integer in `0..bound`; zero when `bound` is zero.
    fn next_below(&mut self, bound: u32) -> u32;

    /// Uniform float in `[0, 1)`.
    fn next_unit(&mut self) -> f64;
}

#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        self.rng.gen_range(0..bound)
    }

    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}
