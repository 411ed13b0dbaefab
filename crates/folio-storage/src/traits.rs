//! Remote media store abstraction
//!
//! This module defines the trait every remote store backend must implement.
//! The store is content-addressed: `upload` returns an opaque external
//! identifier which is the only handle needed for later deletion.

use async_trait::async_trait;
use thiserror::Error;

/// Remote store operation errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid store response: {0}")]
    InvalidResponse(String),

    #[error("Store configuration error: {0}")]
    ConfigError(String),
}

/// Result type for remote store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// An object as reported by the remote store after a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteObject {
    /// The store's identifier for the binary; opaque, used for deletion.
    pub external_id: String,
    pub url: String,
    pub secure_url: String,
    pub format: Option<String>,
    pub byte_size: u64,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Outcome of a delete call. `Skipped` means the caller passed an empty
/// external id, which is a no-op rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
    Skipped,
}

/// Remote media store abstraction
///
/// Deletion is best-effort by contract: callers running it as cleanup or
/// compensation must log a failure and move on, never roll back an
/// already-committed local change because of it.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Upload a binary under the given folder path and return the stored
    /// object's identifiers. A timeout counts as a hard failure; nothing may
    /// be persisted locally when this errors.
    async fn upload(
        &self,
        data: Vec<u8>,
        content_type: &str,
        folder: &str,
    ) -> StoreResult<RemoteObject>;

    /// Delete a binary by its external id. An empty id returns
    /// `DeleteOutcome::Skipped`.
    async fn delete(&self, external_id: &str) -> StoreResult<DeleteOutcome>;
}
