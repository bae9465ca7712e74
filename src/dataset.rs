use std::sync::Arc;

use crate::metadata::MetadataTable;

/// Dataset that fold partitioning can project into train/test views.
pub trait FoldDataset: Sized {
    /// Sample metadata, one row per sample.
    fn metadata(&self) -> &MetadataTable;
    /// A copy of this dataset exposing `metadata` instead.
    ///
    /// Implementations must share sample storage with `self`, never copy it.
    fn with_metadata(&self, metadata: MetadataTable) -> Self;
}

/// Read-only view over shared sample storage plus its own metadata rows.
#[derive(Debug)]
pub struct TrialDataset<S> {
    storage: Arc<S>,
    metadata: MetadataTable,
}

impl<S> TrialDataset<S> {
    /// Dataset over `storage` described by `metadata`.
    pub fn new(storage: Arc<S>, metadata: MetadataTable) -> Self {
        Self { storage, metadata }
    }

    /// Shared sample storage.
    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    /// Number of samples visible through this view.
    pub fn len(&self) -> usize {
        self.metadata.len()
    }

    /// Whether the view exposes no samples.
    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty()
    }

    /// Whether both views read from the same storage allocation.
    pub fn shares_storage_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.storage, &other.storage)
    }
}

impl<S> Clone for TrialDataset<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            metadata: self.metadata.clone(),
        }
    }
}

impl<S> FoldDataset for TrialDataset<S> {
    fn metadata(&self) -> &MetadataTable {
        &self.metadata
    }

    fn with_metadata(&self, metadata: MetadataTable) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            metadata,
        }
    }
}
