/// Constants used by partitioner configuration defaults.
pub mod config {
    /// Fold count used when none is configured.
    pub const DEFAULT_FOLD_COUNT: usize = 5;
    /// Smallest fold count accepted by the k-fold generator.
    pub const MIN_FOLD_COUNT: usize = 2;
    /// Default directory for persisted fold partitions.
    pub const DEFAULT_CACHE_DIR: &str = "./split/k_fold_trial";
}

/// Constants used by metadata tables and their canonical grouping columns.
pub mod metadata {
    /// Column holding the subject identifier of each sample.
    pub const SUBJECT_ID_COLUMN: &str = "subject_id";
    /// Column holding the trial identifier of each sample.
    pub const TRIAL_ID_COLUMN: &str = "trial_id";
}

/// Constants used by fold-store persistence and file naming.
pub mod folds {
    /// Filename prefix for persisted train partitions (`train_fold_<i>.csv`).
    pub const TRAIN_FOLD_PREFIX: &str = "train_fold_";
    /// Filename prefix for persisted test partitions (`test_fold_<i>.csv`).
    pub const TEST_FOLD_PREFIX: &str = "test_fold_";
    /// Extension shared by every persisted partition file.
    pub const FOLD_FILE_EXTENSION: &str = "csv";
}

/// Constants used by the deterministic shuffle generator.
pub mod rng {
    /// Splitmix64 increment applied on every draw.
    pub const SPLITMIX_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;
    /// First splitmix64 output mixing multiplier.
    pub const SPLITMIX_MUL_1: u64 = 0xBF58_476D_1CE4_E5B9;
    /// Second splitmix64 output mixing multiplier.
    pub const SPLITMIX_MUL_2: u64 = 0x94D0_49BB_1331_11EB;
}
