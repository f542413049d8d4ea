//! Node heights for new insertions.
//!
//! Every insertion asks a [`LevelSource`] for the highest level the new node
//! will occupy. The default, [`GeometricLevels`], samples 32 random bits and
//! counts the run of set bits starting from the least significant one, so
//! level `k` comes up with probability `2^-(k+1)`. Combined with span-based
//! skipping this keeps searches at `O(log n)` expected depth.

use rand::rngs::SmallRng;
use rand::RngCore;
use rand::SeedableRng;

use crate::config::Config;

/// Upon the insertion of a new node, the node is replicated to higher levels
/// according to the height drawn here.
pub trait LevelSource {
    /// Draw the height for a new node. The list clamps anything above its
    /// configured maximum.
    fn draw(&mut self) -> usize;

    /// Produce an independent source for a list split off from this one.
    fn fork(&mut self) -> Self
    where
        Self: Sized;
}

/// Geometrically distributed heights from a fast non-cryptographic RNG.
#[derive(Clone, Debug)]
pub struct GeometricLevels {
    rng: SmallRng,
}

impl GeometricLevels {
    /// A source seeded from the operating system.
    pub fn new() -> GeometricLevels {
        GeometricLevels {
            rng: SmallRng::from_entropy(),
        }
    }

    /// A reproducible source: the same seed yields the same heights.
    pub fn seeded(seed: u64) -> GeometricLevels {
        GeometricLevels {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn from_config(config: &Config) -> GeometricLevels {
        match config.seed() {
            Some(seed) => GeometricLevels::seeded(seed),
            None => GeometricLevels::new(),
        }
    }
}

impl Default for GeometricLevels {
    fn default() -> Self {
        Self::new()
    }
}

impl LevelSource for GeometricLevels {
    fn draw(&mut self) -> usize {
        self.rng.next_u32().trailing_ones() as usize
    }

    fn fork(&mut self) -> Self {
        GeometricLevels::seeded(self.rng.next_u64())
    }
}

/// Replays a fixed script of heights, cycling when it runs out.
///
/// Useful wherever the exact shape of the list matters, such as tests that
/// assert on [`SkipList::height`](crate::SkipList::height).
#[derive(Clone, Debug)]
pub struct ScriptedLevels {
    script: Vec<usize>,
    next: usize,
}

impl ScriptedLevels {
    /// # Panics
    ///
    /// `script` must not be empty.
    pub fn new(script: Vec<usize>) -> ScriptedLevels {
        if script.is_empty() {
            panic!("script must contain at least one height.");
        }
        ScriptedLevels { script, next: 0 }
    }
}

impl LevelSource for ScriptedLevels {
    fn draw(&mut self) -> usize {
        let height = self.script[self.next];
        self.next = (self.next + 1) % self.script.len();
        height
    }

    fn fork(&mut self) -> Self {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_is_reproducible() {
        let mut a = GeometricLevels::seeded(7);
        let mut b = GeometricLevels::seeded(7);
        for _ in 0..100 {
            assert_eq!(a.draw(), b.draw());
        }
    }

    #[test]
    fn never_exceeds_sample_width() {
        let mut levels = GeometricLevels::seeded(1);
        for _ in 0..10_000 {
            assert!(levels.draw() <= 32);
        }
    }

    #[test]
    fn roughly_geometric() {
        let mut levels = GeometricLevels::seeded(99);
        let draws = 100_000;
        let mut counts = [0usize; 4];
        for _ in 0..draws {
            let level = levels.draw();
            if level < counts.len() {
                counts[level] += 1;
            }
        }
        // P(0) = 1/2, P(1) = 1/4, P(2) = 1/8, P(3) = 1/16
        for (level, count) in counts.iter().enumerate() {
            let expected = draws as f64 / (2u32 << level) as f64;
            let error = (*count as f64 - expected).abs() / expected;
            assert!(error < 0.1, "level {} drawn {} times, expected ~{}", level, count, expected);
        }
    }

    #[test]
    fn fork_diverges() {
        let mut parent = GeometricLevels::seeded(3);
        let mut child = parent.fork();
        let a: Vec<_> = (0..64).map(|_| parent.draw()).collect();
        let b: Vec<_> = (0..64).map(|_| child.draw()).collect();
        assert_ne!(a, b);
    }

    #[test]
    fn scripted_cycles() {
        let mut levels = ScriptedLevels::new(vec![2, 0, 1]);
        let drawn: Vec<_> = (0..7).map(|_| levels.draw()).collect();
        assert_eq!(drawn, vec![2, 0, 1, 2, 0, 1, 2]);
    }

    #[test]
    #[should_panic]
    fn scripted_empty() {
        ScriptedLevels::new(Vec::new());
    }
}
