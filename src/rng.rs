//! Randomness used by maze generation and ghost steering.
//!
//! Everything random in the simulation goes through [`RandomSource`], so a
//! session can be replayed exactly by handing it a seeded or scripted source.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub trait RandomSource {
    /// Uniform sample in `[0, 1)`.
    fn next_f32(&mut self) -> f32;

    /// Uniform index in `0..len`. Returns 0 when `len <= 1`.
    fn pick_index(&mut self, len: usize) -> usize;

    fn chance(&mut self, probability: f32) -> bool {
        self.next_f32() < probability
    }
}

pub fn choose<T: Copy, R: RandomSource + ?Sized>(rng: &mut R, items: &[T]) -> Option<T> {
    if items.is_empty() {
        return None;
    }
    Some(items[rng.pick_index(items.len())])
}

#[derive(Debug, Clone)]
pub struct StdRandom {
    inner: StdRng,
}

impl StdRandom {
    pub fn from_entropy() -> Self {
        Self {
            inner: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for StdRandom {
    fn next_f32(&mut self) -> f32 {
        self.inner.gen::<f32>()
    }

    fn pick_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        self.inner.gen_range(0..len)
    }
}

/// Replays queued samples, then falls back to fixed values once drained.
///
/// With nothing queued every `chance` succeeds (for positive probabilities)
/// and every pick takes the first item, which makes ghost steering fully
/// predictable.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    floats: VecDeque<f32>,
    indices: VecDeque<usize>,
    fallback_float: f32,
    fallback_index: usize,
}

impl ScriptedRandom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_floats(mut self, floats: impl IntoIterator<Item = f32>) -> Self {
        self.floats.extend(floats);
        self
    }

    pub fn with_indices(mut self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.indices.extend(indices);
        self
    }

    pub fn with_fallback(mut self, float: f32, index: usize) -> Self {
        self.fallback_float = float;
        self.fallback_index = index;
        self
    }
}

impl RandomSource for ScriptedRandom {
    fn next_f32(&mut self) -> f32 {
        self.floats.pop_front().unwrap_or(self.fallback_float)
    }

    fn pick_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        let idx = self.indices.pop_front().unwrap_or(self.fallback_index);
        idx.min(len - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_replays_then_falls_back() {
        let mut rng = ScriptedRandom::new()
            .with_floats([0.9, 0.1])
            .with_indices([3, 7]);
        assert!(!rng.chance(0.5));
        assert!(rng.chance(0.5));
        assert!(rng.chance(0.5));
        assert_eq!(rng.pick_index(4), 3);
        assert_eq!(rng.pick_index(4), 3, "clamped to the last index");
        assert_eq!(rng.pick_index(4), 0);
    }

    #[test]
    fn seeded_sources_agree() {
        let mut a = StdRandom::seeded(42);
        let mut b = StdRandom::seeded(42);
        for _ in 0..32 {
            assert_eq!(a.pick_index(10), b.pick_index(10));
        }
        assert_eq!(a.pick_index(1), 0);
        assert_eq!(choose(&mut a, &[] as &[u32]), None);
    }
}
