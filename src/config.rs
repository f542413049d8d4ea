//! Construction-time settings for a [`SkipList`](crate::SkipList).

/// Default highest level a node may reach. A 32-bit sample never yields more
/// than 32 consecutive set bits, so draws from the default source always fit.
pub const DEFAULT_MAX_HEIGHT: usize = 32;

/// Upper bound accepted for [`Config::with_max_height`].
pub const MAX_HEIGHT_LIMIT: usize = 64;

/// Settings shared by a list and every list split off from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    max_height: usize,
    seed: Option<u64>,
}

impl Config {
    pub fn new() -> Config {
        Config {
            max_height: DEFAULT_MAX_HEIGHT,
            seed: None,
        }
    }

    /// Set the highest level a node may reach. Sentinels are allocated with
    /// `max_height + 1` levels up front, and taller draws are clamped.
    ///
    /// # Panics
    ///
    /// `max_height` must be in `1..=MAX_HEIGHT_LIMIT`.
    pub fn with_max_height(mut self, max_height: usize) -> Config {
        if max_height == 0 || max_height > MAX_HEIGHT_LIMIT {
            panic!("max_height must be in 1..={}, got {}", MAX_HEIGHT_LIMIT, max_height);
        }
        self.max_height = max_height;
        self
    }

    /// Seed the default level source so node heights are reproducible.
    pub fn with_seed(mut self, seed: u64) -> Config {
        self.seed = Some(seed);
        self
    }

    pub fn max_height(&self) -> usize {
        self.max_height
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
