use std::fmt;
use std::vec;

use tracing::{debug, info, warn};

use crate::config::KFoldConfig;
use crate::dataset::FoldDataset;
use crate::errors::FoldError;
use crate::grouping::group_rows_by_trial;
use crate::kfold::KFold;
use crate::metadata::MetadataTable;
use crate::store::{FileFoldStore, FoldRole, FoldStore};
use crate::types::FoldId;

/// Materialized train/test rows of one fold.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FoldPartition {
    /// Zero-based fold index.
    pub fold_id: FoldId,
    /// Training rows, in group order.
    pub train: MetadataTable,
    /// Held-out rows, in group order.
    pub test: MetadataTable,
}

/// K-fold cross-validation that splits every trial on its own.
///
/// Rows are grouped by `subject_id`, then by `trial_id`, and each trial is
/// cut into `fold_count` folds independently. Fold `i` collects the i-th
/// train/test slice of every trial, in group order. With five unshuffled
/// folds, fold 0 tests on the first 20% of each trial and trains on the
/// remaining 80%.
///
/// Partitions are persisted through a [`FoldStore`] the first time
/// [`split`](Self::split) runs against an empty store; afterwards the stored
/// partitions are replayed as-is, without checking that they came from the
/// same dataset or fold count.
#[derive(Debug)]
pub struct KFoldGroupbyTrial<S = FileFoldStore> {
    config: KFoldConfig,
    k_fold: KFold,
    store: S,
}

impl KFoldGroupbyTrial<FileFoldStore> {
    /// Partitioner persisting CSV folds under `config.cache_path`.
    pub fn new(config: KFoldConfig) -> Result<Self, FoldError> {
        let store = FileFoldStore::open(config.cache_path.clone());
        Self::with_store(config, store)
    }
}

impl<S: FoldStore> KFoldGroupbyTrial<S> {
    /// Partitioner persisting folds through `store`.
    pub fn with_store(config: KFoldConfig, store: S) -> Result<Self, FoldError> {
        let config = config.validated()?;
        let k_fold = KFold::new(config.fold_count, config.shuffle, config.effective_seed())?;
        Ok(Self {
            config,
            k_fold,
            store,
        })
    }

    /// Validated configuration.
    pub fn config(&self) -> &KFoldConfig {
        &self.config
    }

    /// Backing fold store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Compute every fold of `info` without persisting anything.
    ///
    /// An empty table yields no folds.
    pub fn build_folds(&self, info: &MetadataTable) -> Result<Vec<FoldPartition>, FoldError> {
        let groups = group_rows_by_trial(info)?;
        if groups.is_empty() {
            return Ok(Vec::new());
        }

        let fold_count = self.k_fold.fold_count();
        let mut train_rows: Vec<Vec<usize>> = vec![Vec::new(); fold_count];
        let mut test_rows: Vec<Vec<usize>> = vec![Vec::new(); fold_count];
        for group in &groups {
            let folds = self
                .k_fold
                .split(group.rows.len())
                .map_err(|err| match err {
                    FoldError::TooFewSamples {
                        fold_count,
                        samples,
                    } => FoldError::GroupTooSmall {
                        subject_id: group.subject_id.clone(),
                        trial_id: group.trial_id.clone(),
                        samples,
                        fold_count,
                    },
                    other => other,
                })?;
            for (fold_id, fold) in folds.into_iter().enumerate() {
                train_rows[fold_id].extend(fold.train.iter().map(|&local| group.rows[local]));
                test_rows[fold_id].extend(fold.test.iter().map(|&local| group.rows[local]));
            }
        }
        debug!(
            groups = groups.len(),
            folds = fold_count,
            "computed trial-grouped folds"
        );

        train_rows
            .into_iter()
            .zip(test_rows)
            .enumerate()
            .map(|(fold_id, (train, test))| {
                Ok(FoldPartition {
                    fold_id,
                    train: info.select(&train)?,
                    test: info.select(&test)?,
                })
            })
            .collect()
    }

    /// Compute every fold of `info` and persist it, replacing stored folds
    /// with the same ids. Returns the number of folds written.
    ///
    /// All folds are computed before the first write, so a trial that is too
    /// small for `fold_count` leaves the store untouched.
    pub fn compute_and_persist(&self, info: &MetadataTable) -> Result<usize, FoldError> {
        let folds = self.build_folds(info)?;
        self.store.initialize()?;
        for fold in &folds {
            self.store
                .store_fold(fold.fold_id, FoldRole::Train, &fold.train)?;
            self.store
                .store_fold(fold.fold_id, FoldRole::Test, &fold.test)?;
        }
        info!(
            folds = folds.len(),
            rows = info.len(),
            cache = %self.config.cache_path.display(),
            "persisted trial-grouped folds"
        );
        Ok(folds.len())
    }

    /// Sorted ids of the folds currently persisted.
    pub fn fold_ids(&self) -> Result<Vec<FoldId>, FoldError> {
        self.store.fold_ids()
    }

    /// Remove persisted folds so the next [`split`](Self::split) recomputes.
    pub fn clear_cache(&self) -> Result<(), FoldError> {
        self.store.clear()
    }

    /// Train/test views of `dataset` for every persisted fold, in fold order.
    ///
    /// Folds are computed from `dataset.metadata()` and persisted only when
    /// the store does not exist yet. Each fold is read lazily as the
    /// iterator advances; calling `split` again starts over at the first
    /// fold.
    pub fn split<'a, D: FoldDataset>(
        &'a self,
        dataset: &'a D,
    ) -> Result<FoldSplits<'a, S, D>, FoldError> {
        if self.store.exists()? {
            info!(
                cache = %self.config.cache_path.display(),
                "reusing persisted folds"
            );
        } else {
            self.compute_and_persist(dataset.metadata())?;
        }

        let fold_ids = self.fold_ids()?;
        if fold_ids.len() != self.config.fold_count {
            warn!(
                cached = fold_ids.len(),
                configured = self.config.fold_count,
                "persisted fold count differs from configuration; using persisted folds"
            );
        }
        Ok(FoldSplits {
            store: &self.store,
            dataset,
            fold_ids: fold_ids.into_iter(),
        })
    }
}

impl<S> fmt::Display for KFoldGroupbyTrial<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "KFoldGroupbyTrial(n_splits={}, shuffle={}, random_state=",
            self.config.fold_count, self.config.shuffle
        )?;
        match self.config.random_seed {
            Some(seed) => write!(f, "{seed}")?,
            None => f.write_str("None")?,
        }
        write!(f, ", split_path='{}')", self.config.cache_path.display())
    }
}

/// Lazy sequence of `(train, test)` views, one per persisted fold.
pub struct FoldSplits<'a, S, D> {
    store: &'a S,
    dataset: &'a D,
    fold_ids: vec::IntoIter<FoldId>,
}

impl<S, D> FoldSplits<'_, S, D> {
    /// Fold ids not yet yielded.
    pub fn remaining_fold_ids(&self) -> &[FoldId] {
        self.fold_ids.as_slice()
    }
}

impl<S: FoldStore, D: FoldDataset> FoldSplits<'_, S, D> {
    fn load(&self, fold_id: FoldId) -> Result<(D, D), FoldError> {
        let train = self.store.load_fold(fold_id, FoldRole::Train)?;
        let test = self.store.load_fold(fold_id, FoldRole::Test)?;
        debug!(
            fold_id,
            train_rows = train.len(),
            test_rows = test.len(),
            "loaded fold"
        );
        Ok((
            self.dataset.with_metadata(train),
            self.dataset.with_metadata(test),
        ))
    }
}

impl<S: FoldStore, D: FoldDataset> Iterator for FoldSplits<'_, S, D> {
    type Item = Result<(D, D), FoldError>;

    fn next(&mut self) -> Option<Self::Item> {
        let fold_id = self.fold_ids.next()?;
        Some(self.load(fold_id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.fold_ids.size_hint()
    }
}

impl<S: FoldStore, D: FoldDataset> ExactSizeIterator for FoldSplits<'_, S, D> {}
