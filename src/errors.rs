use std::io;

use thiserror::Error;

use crate::store::FoldRole;
use crate::types::{ColumnName, FoldId, SubjectId, TrialId};

/// Error type for fold configuration, partitioning, and persistence failures.
#[derive(Debug, Error)]
pub enum FoldError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("metadata table is missing required column '{0}'")]
    MissingColumn(ColumnName),
    #[error("malformed metadata table: {0}")]
    Table(String),
    #[error(
        "cannot have number of splits n_splits={fold_count} greater than the number of samples: n_samples={samples}"
    )]
    TooFewSamples { fold_count: usize, samples: usize },
    #[error(
        "trial '{trial_id}' of subject '{subject_id}' has {samples} samples, fewer than the {fold_count} folds requested"
    )]
    GroupTooSmall {
        subject_id: SubjectId,
        trial_id: TrialId,
        samples: usize,
        fold_count: usize,
    },
    #[error("fold {fold_id} has no persisted {role} partition")]
    MissingFold { fold_id: FoldId, role: FoldRole },
    #[error("fold store failure: {0}")]
    FoldStore(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}
