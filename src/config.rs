use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::config::{DEFAULT_CACHE_DIR, DEFAULT_FOLD_COUNT, MIN_FOLD_COUNT};
use crate::errors::FoldError;

/// Construction parameters for trial-grouped k-fold partitioning.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KFoldConfig {
    /// Number of folds. Must be at least 2.
    pub fold_count: usize,
    /// Shuffle sample order inside each trial before cutting it into folds.
    ///
    /// Trials are never mixed, and the rows of a resulting subset keep their
    /// original relative order.
    pub shuffle: bool,
    /// Seed for reproducible shuffles. Ignored when `shuffle` is false.
    pub random_seed: Option<u64>,
    /// Directory holding persisted fold partitions.
    ///
    /// When it already exists its partitions are replayed as-is.
    pub cache_path: PathBuf,
}

impl Default for KFoldConfig {
    fn default() -> Self {
        Self {
            fold_count: DEFAULT_FOLD_COUNT,
            shuffle: false,
            random_seed: None,
            cache_path: PathBuf::from(DEFAULT_CACHE_DIR),
        }
    }
}

impl KFoldConfig {
    /// Set the number of folds.
    pub fn with_fold_count(mut self, fold_count: usize) -> Self {
        self.fold_count = fold_count;
        self
    }

    /// Enable or disable within-trial shuffling.
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Set (or clear) the shuffle seed.
    pub fn with_random_seed(mut self, random_seed: Option<u64>) -> Self {
        self.random_seed = random_seed;
        self
    }

    /// Set the fold cache directory.
    pub fn with_cache_path(mut self, cache_path: impl Into<PathBuf>) -> Self {
        self.cache_path = cache_path.into();
        self
    }

    /// Validate that the fold count is usable.
    pub fn validated(self) -> Result<Self, FoldError> {
        if self.fold_count < MIN_FOLD_COUNT {
            return Err(FoldError::Configuration(format!(
                "fold_count must be at least {MIN_FOLD_COUNT}, got {}",
                self.fold_count
            )));
        }
        Ok(self)
    }

    /// Seed actually used for shuffling, `None` when shuffling is off.
    pub fn effective_seed(&self) -> Option<u64> {
        if self.shuffle { self.random_seed } else { None }
    }
}
