//! Docflow Storage Library
//!
//! Object-store gateway for user documents. Defines the `ObjectStorage`
//! trait and backends for S3-compatible stores and the local filesystem,
//! with a shared retry-with-backoff policy for transient failures.
//!
//! # Storage key format
//!
//! Keys are `documents/{uuid}{ext}`; generation is centralized in the
//! `keys` module so every backend and caller agrees on the layout. Keys
//! must not contain `..` or a leading `/`.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod retry;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::generate_storage_key;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use retry::RetryPolicy;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{
    FailureKind, ObjectMetadata, ObjectStorage, StorageError, StorageResult, StoredObject,
};
