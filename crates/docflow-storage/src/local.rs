use crate::traits::{ObjectMetadata, ObjectStorage, StorageError, StorageResult, StoredObject};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage implementation for development and tests.
///
/// The filesystem has no object versioning, so `delete` removes the single
/// stored file. "Signed" URLs carry the expiry as a plain query parameter;
/// nothing enforces them (there is no credentialed store to enforce against).
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for document storage
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:3000/files")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::Config(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    /// Convert storage key to filesystem path, rejecting traversal attempts.
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.contains("..") || key.starts_with('/') || key.is_empty() {
            return Err(StorageError::InvalidKey(format!(
                "storage key '{}' contains invalid characters",
                key
            )));
        }
        Ok(self.base_path.join(key))
    }

    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    async fn upload(
        &self,
        key: &str,
        _content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<StoredObject> {
        if data.is_empty() {
            return Err(StorageError::InvalidPayload(
                "refusing to upload an empty object".to_string(),
            ));
        }

        let path = self.key_to_path(key)?;
        let size = data.len();

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await?;
        file.write_all(&data).await?;
        file.sync_all().await?;

        let url = self.generate_url(key);

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(StoredObject {
            key: key.to_string(),
            url,
            bucket: self.base_path.display().to_string(),
        })
    }

    async fn get_buffer(&self, key: &str) -> StorageResult<Vec<u8>> {
        let path = self.key_to_path(key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(key.to_string()));
        }

        let data = fs::read(&path).await?;
        Ok(data)
    }

    async fn get_metadata(&self, key: &str) -> StorageResult<ObjectMetadata> {
        let path = self.key_to_path(key)?;

        let meta = match fs::metadata(&path).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(key.to_string()));
            }
            Err(e) => return Err(StorageError::Io(e)),
        };

        let last_modified: Option<DateTime<Utc>> =
            meta.modified().ok().map(DateTime::<Utc>::from);

        Ok(ObjectMetadata {
            size: meta.len(),
            content_type: None,
            last_modified,
        })
    }

    async fn delete(&self, key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(key)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(key = %key, "Local storage delete successful");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn signed_upload_url(
        &self,
        key: &str,
        _content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        self.key_to_path(key)?;
        Ok(format!(
            "{}?expires={}",
            self.generate_url(key),
            expires_in.as_secs()
        ))
    }

    async fn signed_download_url(
        &self,
        key: &str,
        expires_in: Duration,
        filename: Option<&str>,
    ) -> StorageResult<String> {
        self.key_to_path(key)?;
        let mut url = format!("{}?expires={}", self.generate_url(key), expires_in.as_secs());
        if let Some(name) = filename {
            url.push_str("&filename=");
            url.push_str(&urlencoding::encode(name));
        }
        Ok(url)
    }

    fn public_url(&self, key: &str) -> String {
        self.generate_url(key)
    }
}
