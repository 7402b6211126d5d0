//! Deterministic random number generation for AI players.
//!
//! The rules themselves are deterministic; randomness only enters through
//! AI decisions. Each AI player draws from its own stream derived from the
//! game seed, so one player's choices never shift another's sequence.
//!
//! ```
//! use tragedy_looper::core::GameRng;
//!
//! let rng = GameRng::new(42);
//! let mut first = rng.for_context("player-1");
//! let mut again = GameRng::new(42).for_context("player-1");
//!
//! assert_eq!(first.gen_range_usize(0..100), again.gen_range_usize(0..100));
//! ```

use std::hash::{Hash, Hasher};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seeded ChaCha8 stream.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Derive an independent stream for `context`.
    ///
    /// The same seed and context always produce the same stream.
    #[must_use]
    pub fn for_context(&self, context: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;

        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        context.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    pub fn gen_range_usize(&mut self, range: std::ops::Range<usize>) -> usize {
        self.inner.gen_range(range)
    }

    #[must_use]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let mut rng1 = GameRng::new(7);
        let mut rng2 = GameRng::new(7);
        for _ in 0..50 {
            assert_eq!(rng1.gen_range_usize(0..1000), rng2.gen_range_usize(0..1000));
        }
    }

    #[test]
    fn test_contexts_are_independent() {
        let rng = GameRng::new(42);
        let mut a = rng.for_context("player-1");
        let mut b = rng.for_context("player-2");

        let seq_a: Vec<_> = (0..10).map(|_| a.gen_range_usize(0..1000)).collect();
        let seq_b: Vec<_> = (0..10).map(|_| b.gen_range_usize(0..1000)).collect();
        assert_ne!(seq_a, seq_b);
    }

    #[test]
    fn test_choose() {
        let mut rng = GameRng::new(42);
        let items = [1, 2, 3];
        assert!(items.contains(rng.choose(&items).unwrap()));

        let empty: [i32; 0] = [];
        assert!(rng.choose(&empty).is_none());
    }
}
