// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Source of randomness for selection, exploration and reinforcement.
//!
//! Every `rand` generator is an [`Entropy`]; tests substitute scripted
//! sources to force particular branches.

use rand::{Rng, RngCore};

pub trait Entropy: Send {
    /// Uniform sample in `[0, 1)`
    fn unit(&mut self) -> f64;

    /// Uniform integer in `[0, bound)`. `bound` must be non-zero.
    fn below(&mut self, bound: u64) -> u64;
}

impl<R: RngCore + Send> Entropy for R {
    fn unit(&mut self) -> f64 {
        self.random::<f64>()
    }

    fn below(&mut self, bound: u64) -> u64 {
        self.random_range(0..bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_rng_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let u = rng.unit();
            assert!((0.0..1.0).contains(&u));
            assert!(rng.below(3) < 3);
        }
    }
}
