//! Storage abstraction trait
//!
//! All object-store backends (S3, local filesystem) implement `ObjectStorage`
//! so the lifecycle services never couple to a specific provider.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use docflow_core::AppError;
use std::time::Duration;
use thiserror::Error;

/// Cause tag for backend failures, used by the retry policy and surfaced in
/// the final error after the attempt budget is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Network,
    Timeout,
    Auth,
    Unknown,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FailureKind::Network => "network",
            FailureKind::Timeout => "timeout",
            FailureKind::Auth => "auth",
            FailureKind::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid upload payload: {0}")]
    InvalidPayload(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Storage backend failure ({kind}): {message}")]
    Backend { kind: FailureKind, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    pub fn backend(kind: FailureKind, message: impl Into<String>) -> Self {
        StorageError::Backend {
            kind,
            message: message.into(),
        }
    }

    /// Whether a retry can plausibly succeed. Not-found is definitive (a
    /// malformed request, not a transient fault) and must never be retried;
    /// neither are config or validation failures.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StorageError::Backend { .. } | StorageError::Io(_))
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Config(msg) => AppError::Config(msg),
            StorageError::InvalidPayload(msg) | StorageError::InvalidKey(msg) => {
                AppError::Validation(msg)
            }
            StorageError::NotFound(key) => AppError::NotFound(format!("object '{}'", key)),
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Result of a successful upload.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub key: String,
    pub url: String,
    pub bucket: String,
}

/// Object metadata from a HEAD-style lookup.
#[derive(Debug, Clone)]
pub struct ObjectMetadata {
    pub size: u64,
    pub content_type: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Object-store gateway.
///
/// Uploads and buffer reads are wrapped in retry-with-backoff by the
/// implementations; `delete` is best-effort and `get_metadata` is a single
/// attempt (orphan scanning re-checks on the next run anyway).
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Upload bytes to `key`, overwriting any existing object. Fails with
    /// `InvalidPayload` on an empty payload.
    async fn upload(
        &self,
        key: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<StoredObject>;

    /// Download the full object.
    async fn get_buffer(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// HEAD lookup; `NotFound` when the key is absent.
    async fn get_metadata(&self, key: &str) -> StorageResult<ObjectMetadata>;

    /// Delete all versions and delete markers for `key`. Returns `false`
    /// (never an error) when the object is already absent.
    async fn delete(&self, key: &str) -> StorageResult<bool>;

    /// Presigned PUT URL for direct client uploads.
    async fn signed_upload_url(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Presigned GET URL. When `filename` is given, the URL forces a
    /// "save as" disposition with that name.
    async fn signed_download_url(
        &self,
        key: &str,
        expires_in: Duration,
        filename: Option<&str>,
    ) -> StorageResult<String>;

    /// Public URL an object will have once uploaded under `key`.
    fn public_url(&self, key: &str) -> String;
}
