#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Partitioner configuration.
pub mod config;
/// Centralized constants for defaults, column names, and fold file naming.
pub mod constants;
/// Dataset views sharing sample storage.
pub mod dataset;
/// Reusable demo runners.
pub mod example_apps;
/// Stable subject/trial grouping of metadata rows.
pub mod grouping;
/// K-fold index generation.
pub mod kfold;
/// Metadata tables and CSV I/O.
pub mod metadata;
/// Trial-grouped k-fold partitioning.
pub mod partitioner;
mod rng;
/// Fold persistence backends.
pub mod store;
/// Shared type aliases.
pub mod types;

mod errors;

pub use config::KFoldConfig;
pub use dataset::{FoldDataset, TrialDataset};
pub use errors::FoldError;
pub use grouping::{TrialGroup, group_rows_by_trial};
pub use kfold::{FoldIndices, KFold};
pub use metadata::MetadataTable;
pub use partitioner::{FoldPartition, FoldSplits, KFoldGroupbyTrial};
pub use store::{FileFoldStore, FoldRole, FoldStore, InMemoryFoldStore};
pub use types::{ColumnName, FoldId, MetadataRow, SubjectId, TrialId};
