//! Random sources for the local assigner

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::traits::RandomSource;

/// Unseeded randomness from the thread-local generator
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_index(&mut self, upper: usize) -> usize {
        rand::thread_rng().gen_range(0..upper.max(1))
    }
}

/// Reproducible randomness for a fixed seed
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
}

impl RandomSource for SeededRandom {
    fn next_index(&mut self, upper: usize) -> usize {
        self.rng.gen_range(0..upper.max(1))
    }
}

/// Seeded when a seed is configured, thread-local otherwise
#[derive(Debug, Clone)]
pub enum ConfiguredRandom {
    Thread(ThreadRandom),
    Seeded(SeededRandom),
}

impl ConfiguredRandom {
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => ConfiguredRandom::Seeded(SeededRandom::new(seed)),
            None => ConfiguredRandom::Thread(ThreadRandom),
        }
    }
}

impl RandomSource for ConfiguredRandom {
    fn next_index(&mut self, upper: usize) -> usize {
        match self {
            ConfiguredRandom::Thread(rng) => rng.next_index(upper),
            ConfiguredRandom::Seeded(rng) => rng.next_index(upper),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_stay_in_range() {
        let mut thread = ThreadRandom;
        let mut seeded = SeededRandom::new(7);
        for upper in 1..50 {
            assert!(thread.next_index(upper) < upper);
            assert!(seeded.next_index(upper) < upper);
        }
        assert_eq!(thread.next_index(1), 0);
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = ConfiguredRandom::from_seed(Some(42));
        let mut b = ConfiguredRandom::from_seed(Some(42));
        let first: Vec<usize> = (0..20).map(|_| a.next_index(100)).collect();
        let second: Vec<usize> = (0..20).map(|_| b.next_index(100)).collect();
        assert_eq!(first, second);
    }
}
