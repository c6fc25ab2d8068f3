//! Collaborator contracts for persisting exported content.
//!
//! The hosting application implements these traits; the exporter itself
//! performs no I/O.

use pagedock_model::MediaDownload;

use crate::destination::DestinationPage;

/// Reference to a stored page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRef {
    /// Store-assigned page identifier.
    pub id: String,
}

/// Reference to a stored asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRef {
    /// Store-assigned asset identifier.
    pub id: String,
    /// Filename the asset was stored under.
    pub filename: String,
}

/// Error from a store collaborator.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store rejected the value (conflict, validation, quota).
    #[error("store rejected {subject}: {reason}")]
    Rejected {
        /// Slug or filename that was rejected.
        subject: String,
        /// Store-provided reason.
        reason: String,
    },

    /// Backend failure.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Persists converted pages.
pub trait PageStore {
    /// Store one destination page.
    ///
    /// Resolving `parent_unique_id` into storage-level parent references is
    /// the store's responsibility.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the page cannot be persisted.
    fn store(&mut self, page: &DestinationPage) -> Result<PageRef, StoreError>;
}

/// Persists downloaded media bytes.
pub trait AssetStore {
    /// Store the bytes fetched for a media download work item.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the asset cannot be persisted.
    fn store(&mut self, media: &MediaDownload, bytes: &[u8]) -> Result<AssetRef, StoreError>;
}
