//! Docflow Core Library
//!
//! This crate provides the domain models, error types, configuration, and
//! validation shared across all docflow components.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;
pub mod validation;

// Re-export commonly used types
pub use config::{validate_env, AppConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::StorageBackend;
