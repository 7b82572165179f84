use chrono::Utc;
use docflow_core::constants::{
    DEFAULT_DOWNLOAD_URL_EXPIRY_SECS, DEFAULT_UPLOAD_URL_EXPIRY_SECS, ORPHAN_SCAN_BATCH_PAUSE_MS,
    ORPHAN_SCAN_BATCH_SIZE,
};
use docflow_core::models::{
    File, FileContentUpdate, FileStatus, FileSummary, RegisterUploadRequest,
};
use docflow_core::validation::{
    infer_content_type, validate_comment, validate_upload, UploadPath,
};
use docflow_core::AppError;
use docflow_db::traits::FileRepository;
use docflow_storage::{generate_storage_key, ObjectStorage, StorageError};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::cache::{file_key, user_files_key, Cache};

/// How long a cached user file listing stays fresh.
const USER_FILES_CACHE_TTL: Duration = Duration::from_secs(30);

/// A freshly registered file plus the presigned URL the client uploads to.
#[derive(Debug, Clone)]
pub struct RegisteredUpload {
    pub file: File,
    pub upload_url: String,
}

/// Outcome of one orphan reconciliation run.
#[derive(Debug, Default)]
pub struct OrphanReport {
    pub checked: u64,
    pub valid: u64,
    pub orphaned: u64,
    pub deleted: u64,
    pub errors: Vec<String>,
}

/// Owns the File state machine and its byte content in the object store.
///
/// Concurrent `replace_content` calls on the same file are not serialized;
/// the last document-store write wins. A conditional update keyed on a
/// version column would close that gap if it ever matters in practice.
pub struct FileLifecycleService {
    files: Arc<dyn FileRepository>,
    storage: Arc<dyn ObjectStorage>,
    cache: Arc<Cache>,
    upload_url_expiry: Duration,
    download_url_expiry: Duration,
}

impl FileLifecycleService {
    pub fn new(
        files: Arc<dyn FileRepository>,
        storage: Arc<dyn ObjectStorage>,
        cache: Arc<Cache>,
    ) -> Self {
        Self {
            files,
            storage,
            cache,
            upload_url_expiry: Duration::from_secs(DEFAULT_UPLOAD_URL_EXPIRY_SECS),
            download_url_expiry: Duration::from_secs(DEFAULT_DOWNLOAD_URL_EXPIRY_SECS),
        }
    }

    pub fn with_url_expiry(mut self, upload: Duration, download: Duration) -> Self {
        self.upload_url_expiry = upload;
        self.download_url_expiry = download;
        self
    }

    /// Register a direct-to-storage upload: validate, allocate a storage
    /// key, create the record in `pending_upload`, and return a presigned
    /// PUT URL. The direct path gets the larger size ceiling since it
    /// bypasses the request-body limit of the boundary layer.
    #[tracing::instrument(skip(self, req), fields(user_id = %req.user_id))]
    pub async fn register_pending_upload(
        &self,
        req: RegisterUploadRequest,
    ) -> Result<RegisteredUpload, AppError> {
        validate_upload(
            &req.original_filename,
            &req.content_type,
            req.file_size,
            UploadPath::Direct,
        )?;

        let storage_key = generate_storage_key(&req.original_filename);
        let storage_url = self.storage.public_url(&storage_key);
        let file = File::new_pending_upload(
            req.user_id,
            req.original_filename,
            req.file_size,
            req.content_type,
            storage_key.clone(),
            storage_url,
            req.metadata,
        );
        self.files.insert(&file).await?;

        let upload_url = self
            .storage
            .signed_upload_url(&storage_key, &file.content_type, self.upload_url_expiry)
            .await?;

        self.cache.invalidate(&user_files_key(file.user_id));
        tracing::info!(file_id = %file.id, key = %storage_key, "registered pending upload");

        Ok(RegisteredUpload { file, upload_url })
    }

    /// Replace a file's content with new bytes.
    ///
    /// Ordering: the new object is uploaded before the record is updated,
    /// and the old object is deleted last, so the old and new content are
    /// never both gone. If the record update fails after the upload, the
    /// new object is deleted as compensation (best-effort, logged only). A
    /// completed file moves to `replacement`; any other status is
    /// preserved. Payment linkage always carries over; a replacement never
    /// requires re-payment.
    #[tracing::instrument(skip(self, data, comment))]
    pub async fn replace_content(
        &self,
        file_id: Uuid,
        user_id: Uuid,
        data: Vec<u8>,
        original_filename: &str,
        content_type: Option<&str>,
        comment: Option<String>,
    ) -> Result<FileSummary, AppError> {
        let file = self.get_owned(file_id, user_id).await?;

        let content_type = match content_type {
            Some(ct) => ct.to_string(),
            None => infer_content_type(original_filename)
                .ok_or_else(|| {
                    AppError::Validation(format!(
                        "could not determine content type for '{}'",
                        original_filename
                    ))
                })?
                .to_string(),
        };
        validate_upload(
            original_filename,
            &content_type,
            data.len() as i64,
            UploadPath::Proxied,
        )?;
        if let Some(ref comment) = comment {
            validate_comment(comment)?;
        }

        let file_size = data.len() as i64;
        let new_key = generate_storage_key(original_filename);
        let stored = self.storage.upload(&new_key, &content_type, data).await?;

        let now = Utc::now();
        let update = FileContentUpdate {
            filename: new_key
                .rsplit('/')
                .next()
                .unwrap_or(new_key.as_str())
                .to_string(),
            original_filename: original_filename.to_string(),
            file_size,
            content_type,
            storage_key: new_key.clone(),
            storage_url: stored.url,
            status: file.status.after_replacement(),
            comment,
            replaced_at: now,
            updated_at: now,
        };

        if let Err(err) = self.files.apply_content_update(file_id, &update).await {
            // compensate: drop the object we just wrote, keep the original error
            if let Err(cleanup_err) = self.storage.delete(&new_key).await {
                tracing::warn!(
                    key = %new_key,
                    error = %cleanup_err,
                    "failed to clean up new object after record update failure"
                );
            }
            return Err(err);
        }

        match self.storage.delete(&file.storage_key).await {
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(
                    key = %file.storage_key,
                    error = %err,
                    "failed to delete replaced object, leaving for orphan reconciliation"
                );
            }
        }

        self.cache.invalidate(&user_files_key(user_id));
        self.cache.invalidate(&file_key(file_id));
        tracing::info!(file_id = %file_id, key = %new_key, "content replaced");

        let refreshed = self
            .files
            .get(file_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("file {}", file_id)))?;
        Ok(refreshed.summary())
    }

    /// Update the user comment on a file. Locked once processing has
    /// completed; every other status allows edits.
    #[tracing::instrument(skip(self, comment))]
    pub async fn update_comment(
        &self,
        file_id: Uuid,
        user_id: Uuid,
        comment: &str,
    ) -> Result<(), AppError> {
        let file = self.get_owned(file_id, user_id).await?;
        validate_comment(comment)?;
        if !file.status.allows_comment_edit() {
            return Err(AppError::InvalidState(
                "comments cannot be edited once processing is completed".to_string(),
            ));
        }

        self.files.set_comment(file_id, comment, Utc::now()).await?;
        self.cache.invalidate(&file_key(file_id));
        self.cache.invalidate(&user_files_key(user_id));
        Ok(())
    }

    /// List a user's files, serving from the cache when fresh.
    pub async fn list_files(&self, user_id: Uuid) -> Result<Vec<FileSummary>, AppError> {
        let key = user_files_key(user_id);
        if let Some(cached) = self.cache.get(&key) {
            if let Ok(summaries) = serde_json::from_value::<Vec<FileSummary>>(cached) {
                return Ok(summaries);
            }
        }

        let summaries: Vec<FileSummary> = self
            .files
            .list_for_user(user_id)
            .await?
            .iter()
            .map(File::summary)
            .collect();
        self.cache.set(
            &key,
            Some(serde_json::to_value(&summaries)?),
            USER_FILES_CACHE_TTL,
        );
        Ok(summaries)
    }

    /// Presigned GET URL forcing a "save as" disposition with the file's
    /// original name.
    pub async fn get_download_url(&self, file_id: Uuid, user_id: Uuid) -> Result<String, AppError> {
        let file = self.get_owned(file_id, user_id).await?;
        let url = self
            .storage
            .signed_download_url(
                &file.storage_key,
                self.download_url_expiry,
                Some(&file.original_filename),
            )
            .await?;
        Ok(url)
    }

    /// Walk file records in bounded batches and delete rows whose storage
    /// key no longer resolves to an object. Rows still in `pending_upload`
    /// are never treated as orphaned, since the direct upload may not have
    /// happened yet. Advisory housekeeping: safe to
    /// run concurrently with user traffic and safe to re-run (already
    /// deleted rows are simply absent from later runs). A short pause
    /// between batches bounds the request rate against the object store.
    #[tracing::instrument(skip(self))]
    pub async fn reconcile_orphans(
        &self,
        user_filter: Option<Uuid>,
    ) -> Result<OrphanReport, AppError> {
        let mut report = OrphanReport::default();
        let mut after: Option<Uuid> = None;

        loop {
            let batch = self
                .files
                .list_batch(user_filter, after, ORPHAN_SCAN_BATCH_SIZE)
                .await?;
            if batch.is_empty() {
                break;
            }
            let full_batch = batch.len() as i64 == ORPHAN_SCAN_BATCH_SIZE;
            after = batch.last().map(|f| f.id);

            for file in batch {
                report.checked += 1;
                // A pending_upload row legitimately has no object yet: the
                // client may still be mid-upload against its presigned URL.
                if file.status == FileStatus::PendingUpload {
                    report.valid += 1;
                    continue;
                }
                match self.storage.get_metadata(&file.storage_key).await {
                    Ok(_) => report.valid += 1,
                    Err(StorageError::NotFound(_)) => {
                        report.orphaned += 1;
                        match self.files.delete(file.id).await {
                            Ok(_) => {
                                report.deleted += 1;
                                self.cache.invalidate(&file_key(file.id));
                                self.cache.invalidate(&user_files_key(file.user_id));
                                tracing::info!(
                                    file_id = %file.id,
                                    key = %file.storage_key,
                                    "deleted orphaned file record"
                                );
                            }
                            Err(err) => {
                                report
                                    .errors
                                    .push(format!("delete {}: {}", file.id, err));
                            }
                        }
                    }
                    Err(err) => {
                        report
                            .errors
                            .push(format!("head {}: {}", file.storage_key, err));
                    }
                }
            }

            if !full_batch {
                break;
            }
            tokio::time::sleep(Duration::from_millis(ORPHAN_SCAN_BATCH_PAUSE_MS)).await;
        }

        tracing::info!(
            checked = report.checked,
            orphaned = report.orphaned,
            deleted = report.deleted,
            errors = report.errors.len(),
            "orphan reconciliation finished"
        );
        Ok(report)
    }

    async fn get_owned(&self, file_id: Uuid, user_id: Uuid) -> Result<File, AppError> {
        let file = self
            .files
            .get(file_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("file {}", file_id)))?;
        if file.user_id != user_id {
            return Err(AppError::Forbidden(
                "file belongs to a different user".to_string(),
            ));
        }
        Ok(file)
    }
}
