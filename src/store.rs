use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::debug;

use crate::constants::folds::{FOLD_FILE_EXTENSION, TEST_FOLD_PREFIX, TRAIN_FOLD_PREFIX};
use crate::errors::FoldError;
use crate::metadata::MetadataTable;
use crate::types::FoldId;

/// Which side of a fold a persisted partition belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FoldRole {
    /// Rows used for training.
    Train,
    /// Rows held out for evaluation.
    Test,
}

/// Canonical role order used when storing/loading a fold.
pub const ALL_ROLES: [FoldRole; 2] = [FoldRole::Train, FoldRole::Test];

impl FoldRole {
    /// Filename prefix for this role (`train_fold_` / `test_fold_`).
    pub const fn file_prefix(self) -> &'static str {
        match self {
            FoldRole::Train => TRAIN_FOLD_PREFIX,
            FoldRole::Test => TEST_FOLD_PREFIX,
        }
    }
}

impl fmt::Display for FoldRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FoldRole::Train => f.write_str("train"),
            FoldRole::Test => f.write_str("test"),
        }
    }
}

/// Filename of the persisted partition, e.g. `test_fold_3.csv`.
pub fn fold_file_name(fold_id: FoldId, role: FoldRole) -> String {
    format!("{}{fold_id}.{FOLD_FILE_EXTENSION}", role.file_prefix())
}

/// Extract the fold id from a persisted partition filename.
pub fn parse_fold_file_name(name: &str) -> Option<(FoldId, FoldRole)> {
    let stem = name.strip_suffix(FOLD_FILE_EXTENSION)?.strip_suffix('.')?;
    ALL_ROLES.into_iter().find_map(|role| {
        let digits = stem.strip_prefix(role.file_prefix())?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok().map(|fold_id| (fold_id, role))
    })
}

/// Persistence backend for fold partitions.
///
/// Implementations address one metadata table per `(fold id, role)` pair.
/// No completion marker is kept: an interrupted run can leave an incomplete
/// fold set behind, which callers must [`FoldStore::clear`] themselves.
pub trait FoldStore: Send + Sync {
    /// Whether the cache exists (even if it holds no folds).
    fn exists(&self) -> Result<bool, FoldError>;
    /// Create the cache if missing.
    fn initialize(&self) -> Result<(), FoldError>;
    /// Persist one partition, replacing any previous one.
    fn store_fold(
        &self,
        fold_id: FoldId,
        role: FoldRole,
        table: &MetadataTable,
    ) -> Result<(), FoldError>;
    /// Load one persisted partition.
    fn load_fold(&self, fold_id: FoldId, role: FoldRole) -> Result<MetadataTable, FoldError>;
    /// Sorted, distinct fold ids with at least one persisted partition.
    fn fold_ids(&self) -> Result<Vec<FoldId>, FoldError>;
    /// Drop every persisted partition and the cache itself.
    fn clear(&self) -> Result<(), FoldError>;
}

/// Directory of CSV partitions (`train_fold_<i>.csv`, `test_fold_<i>.csv`).
#[derive(Clone, Debug)]
pub struct FileFoldStore {
    root: PathBuf,
}

impl FileFoldStore {
    /// Use `root` as the cache directory. Nothing is touched until written.
    pub fn open<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Cache directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of one persisted partition.
    pub fn fold_path(&self, fold_id: FoldId, role: FoldRole) -> PathBuf {
        self.root.join(fold_file_name(fold_id, role))
    }
}

impl FoldStore for FileFoldStore {
    fn exists(&self) -> Result<bool, FoldError> {
        Ok(self.root.try_exists()?)
    }

    fn initialize(&self) -> Result<(), FoldError> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    fn store_fold(
        &self,
        fold_id: FoldId,
        role: FoldRole,
        table: &MetadataTable,
    ) -> Result<(), FoldError> {
        table.to_csv_path(self.fold_path(fold_id, role))
    }

    fn load_fold(&self, fold_id: FoldId, role: FoldRole) -> Result<MetadataTable, FoldError> {
        let path = self.fold_path(fold_id, role);
        match MetadataTable::from_csv_path(&path) {
            Err(FoldError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
                Err(FoldError::MissingFold { fold_id, role })
            }
            other => other,
        }
    }

    fn fold_ids(&self) -> Result<Vec<FoldId>, FoldError> {
        let mut ids = BTreeSet::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let name = entry.file_name();
            match name.to_str().and_then(parse_fold_file_name) {
                Some((fold_id, _)) => {
                    ids.insert(fold_id);
                }
                None => debug!(
                    file = %entry.path().display(),
                    "ignoring non-fold file in fold cache"
                ),
            }
        }
        Ok(ids.into_iter().collect())
    }

    fn clear(&self) -> Result<(), FoldError> {
        match fs::remove_dir_all(&self.root) {
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            other => Ok(other?),
        }
    }
}

/// In-memory fold store, for tests and callers that manage persistence
/// elsewhere.
#[derive(Debug, Default)]
pub struct InMemoryFoldStore {
    initialized: RwLock<bool>,
    folds: RwLock<BTreeMap<(FoldId, FoldRole), MetadataTable>>,
}

impl InMemoryFoldStore {
    /// Empty, uninitialized store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl FoldStore for InMemoryFoldStore {
    fn exists(&self) -> Result<bool, FoldError> {
        self.initialized
            .read()
            .map(|guard| *guard)
            .map_err(|_| FoldError::FoldStore("initialized flag lock poisoned".into()))
    }

    fn initialize(&self) -> Result<(), FoldError> {
        *self
            .initialized
            .write()
            .map_err(|_| FoldError::FoldStore("initialized flag lock poisoned".into()))? = true;
        Ok(())
    }

    fn store_fold(
        &self,
        fold_id: FoldId,
        role: FoldRole,
        table: &MetadataTable,
    ) -> Result<(), FoldError> {
        if !self.exists()? {
            return Err(FoldError::FoldStore(
                "fold store must be initialized before writing".into(),
            ));
        }
        self.folds
            .write()
            .map_err(|_| FoldError::FoldStore("folds lock poisoned".into()))?
            .insert((fold_id, role), table.clone());
        Ok(())
    }

    fn load_fold(&self, fold_id: FoldId, role: FoldRole) -> Result<MetadataTable, FoldError> {
        self.folds
            .read()
            .map_err(|_| FoldError::FoldStore("folds lock poisoned".into()))?
            .get(&(fold_id, role))
            .cloned()
            .ok_or(FoldError::MissingFold { fold_id, role })
    }

    fn fold_ids(&self) -> Result<Vec<FoldId>, FoldError> {
        if !self.exists()? {
            return Err(FoldError::FoldStore("fold store is not initialized".into()));
        }
        let guard = self
            .folds
            .read()
            .map_err(|_| FoldError::FoldStore("folds lock poisoned".into()))?;
        let ids: BTreeSet<FoldId> = guard.keys().map(|(fold_id, _)| *fold_id).collect();
        Ok(ids.into_iter().collect())
    }

    fn clear(&self) -> Result<(), FoldError> {
        self.folds
            .write()
            .map_err(|_| FoldError::FoldStore("folds lock poisoned".into()))?
            .clear();
        *self
            .initialized
            .write()
            .map_err(|_| FoldError::FoldStore("initialized flag lock poisoned".into()))? = false;
        Ok(())
    }
}
