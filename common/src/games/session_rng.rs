use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::snake::Point;

/// Uniform random source consumed by the rules engine.
pub trait RandomSource {
    fn random_cell(&mut self, grid_size: i32) -> Point;

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn random_index(&mut self, len: usize) -> usize;
}

pub struct SessionRng {
    rng: StdRng,
    seed: u64,
}

impl SessionRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    pub fn from_random() -> Self {
        let seed: u64 = rand::rng().random();
        Self::new(seed)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for SessionRng {
    fn random_cell(&mut self, grid_size: i32) -> Point {
        Point::new(
            self.rng.random_range(0..grid_size),
            self.rng.random_range(0..grid_size),
        )
    }

    fn random_index(&mut self, len: usize) -> usize {
        self.rng.random_range(0..len)
    }
}
