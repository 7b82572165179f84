//! Configuration module
//!
//! Environment-driven configuration for the lifecycle engine: database,
//! storage backend, payment gateway secret, and signed-URL expiries.

use std::env;

use crate::constants::{DEFAULT_DOWNLOAD_URL_EXPIRY_SECS, DEFAULT_UPLOAD_URL_EXPIRY_SECS};
use crate::error::AppError;
use crate::storage_types::StorageBackend;

/// Application configuration, read once at startup.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub environment: String,
    pub database_url: String,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    /// Custom endpoint for S3-compatible providers (MinIO, Spaces, ...)
    pub s3_endpoint: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    // Payment gateway
    pub payment_gateway_secret: String,
    // Signed URL expiries
    pub upload_url_expiry_secs: u64,
    pub download_url_expiry_secs: u64,
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    /// Load configuration from the environment (reads `.env` if present).
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let database_url = env_opt("DATABASE_URL")
            .ok_or_else(|| AppError::Config("DATABASE_URL is not set".to_string()))?;

        let payment_gateway_secret = env_opt("PAYMENT_GATEWAY_SECRET")
            .ok_or_else(|| AppError::Config("PAYMENT_GATEWAY_SECRET is not set".to_string()))?;

        let storage_backend = match env_opt("STORAGE_BACKEND") {
            Some(raw) => StorageBackend::parse(&raw).ok_or_else(|| {
                AppError::Config(format!("Unknown STORAGE_BACKEND '{}'", raw))
            })?,
            None => StorageBackend::S3,
        };

        Ok(AppConfig {
            environment: env_opt("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            database_url,
            storage_backend,
            s3_bucket: env_opt("S3_BUCKET"),
            s3_region: env_opt("S3_REGION").or_else(|| env_opt("AWS_REGION")),
            s3_endpoint: env_opt("S3_ENDPOINT"),
            local_storage_path: env_opt("LOCAL_STORAGE_PATH"),
            local_storage_base_url: env_opt("LOCAL_STORAGE_BASE_URL"),
            payment_gateway_secret,
            upload_url_expiry_secs: env_u64(
                "UPLOAD_URL_EXPIRY_SECS",
                DEFAULT_UPLOAD_URL_EXPIRY_SECS,
            ),
            download_url_expiry_secs: env_u64(
                "DOWNLOAD_URL_EXPIRY_SECS",
                DEFAULT_DOWNLOAD_URL_EXPIRY_SECS,
            ),
        })
    }

    /// Check backend-specific settings that `from_env` cannot know are
    /// required until the backend is chosen.
    pub fn validate(&self) -> Result<(), AppError> {
        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(AppError::Config("S3_BUCKET is not set".to_string()));
                }
                if self.s3_region.is_none() {
                    return Err(AppError::Config(
                        "S3_REGION or AWS_REGION is not set".to_string(),
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(AppError::Config("LOCAL_STORAGE_PATH is not set".to_string()));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(AppError::Config(
                        "LOCAL_STORAGE_BASE_URL is not set".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Fail-fast startup check: load and validate the full configuration,
/// surfacing every missing required variable as a `Config` error.
pub fn validate_env() -> Result<AppConfig, AppError> {
    let config = AppConfig::from_env()?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AppConfig {
        AppConfig {
            environment: "test".to_string(),
            database_url: "postgres://localhost/docflow_test".to_string(),
            storage_backend: StorageBackend::Local,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            local_storage_path: Some("/tmp/docflow".to_string()),
            local_storage_base_url: Some("http://localhost:3000/files".to_string()),
            payment_gateway_secret: "secret".to_string(),
            upload_url_expiry_secs: DEFAULT_UPLOAD_URL_EXPIRY_SECS,
            download_url_expiry_secs: DEFAULT_DOWNLOAD_URL_EXPIRY_SECS,
        }
    }

    #[test]
    fn test_local_backend_requires_path() {
        let mut config = base_config();
        assert!(config.validate().is_ok());

        config.local_storage_path = None;
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_s3_backend_requires_bucket_and_region() {
        let mut config = base_config();
        config.storage_backend = StorageBackend::S3;
        assert!(matches!(config.validate(), Err(AppError::Config(_))));

        config.s3_bucket = Some("docs".to_string());
        assert!(matches!(config.validate(), Err(AppError::Config(_))));

        config.s3_region = Some("ap-south-1".to_string());
        assert!(config.validate().is_ok());
    }
}
