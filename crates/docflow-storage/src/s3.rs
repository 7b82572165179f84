use crate::retry::RetryPolicy;
use crate::traits::{
    FailureKind, ObjectMetadata, ObjectStorage, StorageError, StorageResult, StoredObject,
};
use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{Delete, ObjectIdentifier, ServerSideEncryption};
use aws_sdk_s3::Client;
use std::env;
use std::time::Duration;

/// S3 storage implementation
///
/// Uploads and buffer reads run under the shared retry policy; deletes are
/// version-aware (all versions and delete markers removed in one batch) to
/// support versioned buckets.
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
    retry: RetryPolicy,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    ///
    /// Credentials come from `AWS_ACCESS_KEY_ID`/`AWS_SECRET_ACCESS_KEY`;
    /// missing credentials fail here with a `Config` error rather than on
    /// the first request.
    pub fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        let key_id = env::var("AWS_ACCESS_KEY_ID")
            .map_err(|_| StorageError::Config("AWS_ACCESS_KEY_ID is not set".to_string()))?;
        let key_secret = env::var("AWS_SECRET_ACCESS_KEY")
            .map_err(|_| StorageError::Config("AWS_SECRET_ACCESS_KEY is not set".to_string()))?;

        let credentials = Credentials::new(key_id, key_secret, None, None, "docflow-env");
        let mut config_builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(Region::new(region.clone()));

        if let Some(ref endpoint) = endpoint_url {
            // Path-style addressing for S3-compatible providers (MinIO, Spaces)
            config_builder = config_builder
                .endpoint_url(endpoint.clone())
                .force_path_style(true);
        }

        let client = Client::from_conf(config_builder.build());

        Ok(S3Storage {
            client,
            bucket,
            region,
            endpoint_url,
            retry: RetryPolicy::default(),
        })
    }

    #[cfg(test)]
    fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Generate the public URL for an object key.
    ///
    /// For AWS S3 this is the virtual-hosted style URL; for S3-compatible
    /// providers the configured endpoint with path-style addressing.
    fn generate_url(&self, key: &str) -> String {
        if let Some(ref endpoint) = self.endpoint_url {
            let base_url = endpoint.trim_end_matches('/');
            format!("{}/{}/{}", base_url, self.bucket, key)
        } else {
            format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            )
        }
    }

    /// Delete a single (unversioned) object. S3 reports success for absent
    /// keys, so an explicit not-found maps to `Ok(false)`.
    async fn delete_unversioned(&self, key: &str) -> StorageResult<bool> {
        let result = self
            .client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(e) => match classify(key, e) {
                StorageError::NotFound(_) => Ok(false),
                other => Err(other),
            },
        }
    }
}

/// Map an SDK error to the storage taxonomy: definitive not-found is kept
/// apart from the retryable backend failures, which carry a cause tag.
fn classify<E>(key: &str, err: SdkError<E>) -> StorageError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    match &err {
        SdkError::TimeoutError(_) => StorageError::backend(
            FailureKind::Timeout,
            format!("request for '{}' timed out", key),
        ),
        SdkError::DispatchFailure(_) => StorageError::backend(
            FailureKind::Network,
            format!("could not reach object store for '{}': {}", key, err),
        ),
        SdkError::ServiceError(ctx) => {
            let status = ctx.raw().status().as_u16();
            let code = err.code().unwrap_or("");
            let message = err.message().unwrap_or("service error").to_string();

            if status == 404 || code == "NoSuchKey" || code == "NotFound" {
                StorageError::NotFound(key.to_string())
            } else if status == 401
                || status == 403
                || matches!(
                    code,
                    "AccessDenied" | "InvalidAccessKeyId" | "SignatureDoesNotMatch" | "ExpiredToken"
                )
            {
                StorageError::backend(FailureKind::Auth, format!("{}: {}", code, message))
            } else {
                StorageError::backend(
                    FailureKind::Unknown,
                    format!("status {} {}: {}", status, code, message),
                )
            }
        }
        other => StorageError::backend(FailureKind::Unknown, other.to_string()),
    }
}

/// Escape quote/backslash characters for a `filename="..."` disposition.
fn escape_disposition_filename(filename: &str) -> String {
    filename.replace('\\', "\\\\").replace('"', "\\\"")
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn upload(
        &self,
        key: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<StoredObject> {
        if data.is_empty() {
            return Err(StorageError::InvalidPayload(
                "refusing to upload an empty object".to_string(),
            ));
        }

        let size = data.len() as u64;
        let start = std::time::Instant::now();

        self.retry
            .run("s3.put_object", || {
                let client = self.client.clone();
                let bucket = self.bucket.clone();
                let key = key.to_string();
                let content_type = content_type.to_string();
                let body = data.clone();
                async move {
                    client
                        .put_object()
                        .bucket(bucket)
                        .key(&key)
                        .content_type(content_type)
                        .server_side_encryption(ServerSideEncryption::Aes256)
                        .body(ByteStream::from(body))
                        .send()
                        .await
                        .map_err(|e| classify(&key, e))?;
                    Ok(())
                }
            })
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 upload failed"
                );
                e
            })?;

        let url = self.generate_url(key);

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(StoredObject {
            key: key.to_string(),
            url,
            bucket: self.bucket.clone(),
        })
    }

    async fn get_buffer(&self, key: &str) -> StorageResult<Vec<u8>> {
        let start = std::time::Instant::now();

        let bytes = self
            .retry
            .run("s3.get_object", || {
                let client = self.client.clone();
                let bucket = self.bucket.clone();
                let key = key.to_string();
                async move {
                    let resp = client
                        .get_object()
                        .bucket(bucket)
                        .key(&key)
                        .send()
                        .await
                        .map_err(|e| classify(&key, e))?;
                    let data = resp.body.collect().await.map_err(|e| {
                        StorageError::backend(
                            FailureKind::Network,
                            format!("failed to read body for '{}': {}", key, e),
                        )
                    })?;
                    Ok(data.into_bytes().to_vec())
                }
            })
            .await?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = bytes.len() as u64,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 download successful"
        );

        Ok(bytes)
    }

    async fn get_metadata(&self, key: &str) -> StorageResult<ObjectMetadata> {
        // Single attempt: orphan scanning re-checks cheap false positives
        // on its next run, so a retry here only slows the batch down.
        let resp = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| classify(key, e))?;

        let last_modified = resp
            .last_modified()
            .and_then(|dt| chrono::DateTime::from_timestamp(dt.secs(), dt.subsec_nanos()));

        Ok(ObjectMetadata {
            size: resp.content_length().unwrap_or(0).max(0) as u64,
            content_type: resp.content_type().map(String::from),
            last_modified,
        })
    }

    async fn delete(&self, key: &str) -> StorageResult<bool> {
        let start = std::time::Instant::now();

        // Versioned buckets keep deleted objects as versions plus a delete
        // marker; enumerate both and remove them in one batch.
        let listing = self
            .client
            .list_object_versions()
            .bucket(&self.bucket)
            .prefix(key)
            .send()
            .await;

        let identifiers: Vec<ObjectIdentifier> = match listing {
            Ok(out) => {
                let mut ids = Vec::new();
                for version in out.versions() {
                    if version.key() == Some(key) {
                        if let Some(vid) = version.version_id() {
                            ids.push((key.to_string(), vid.to_string()));
                        }
                    }
                }
                for marker in out.delete_markers() {
                    if marker.key() == Some(key) {
                        if let Some(vid) = marker.version_id() {
                            ids.push((key.to_string(), vid.to_string()));
                        }
                    }
                }
                ids.into_iter()
                    .map(|(k, vid)| {
                        ObjectIdentifier::builder()
                            .key(k)
                            .version_id(vid)
                            .build()
                            .map_err(|e| {
                                StorageError::backend(FailureKind::Unknown, e.to_string())
                            })
                    })
                    .collect::<StorageResult<Vec<_>>>()?
            }
            Err(e) => {
                // Bucket may not support versioning or the caller may lack
                // the listing permission; fall back to a plain delete.
                tracing::warn!(
                    error = %classify(key, e),
                    bucket = %self.bucket,
                    key = %key,
                    "Listing object versions failed, falling back to simple delete"
                );
                return self.delete_unversioned(key).await;
            }
        };

        if identifiers.is_empty() {
            // Non-versioned bucket, or the object is already gone.
            return self.delete_unversioned(key).await;
        }

        let version_count = identifiers.len();
        let delete_spec = Delete::builder()
            .set_objects(Some(identifiers))
            .quiet(true)
            .build()
            .map_err(|e| StorageError::backend(FailureKind::Unknown, e.to_string()))?;

        self.client
            .delete_objects()
            .bucket(&self.bucket)
            .delete(delete_spec)
            .send()
            .await
            .map_err(|e| classify(key, e))?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            version_count,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 versioned delete successful"
        );

        Ok(true)
    }

    async fn signed_upload_url(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let config = PresigningConfig::expires_in(expires_in)
            .map_err(|e| StorageError::Config(format!("invalid presign expiry: {}", e)))?;

        let presigned = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .presigned(config)
            .await
            .map_err(|e| classify(key, e))?;

        Ok(presigned.uri().to_string())
    }

    async fn signed_download_url(
        &self,
        key: &str,
        expires_in: Duration,
        filename: Option<&str>,
    ) -> StorageResult<String> {
        let config = PresigningConfig::expires_in(expires_in)
            .map_err(|e| StorageError::Config(format!("invalid presign expiry: {}", e)))?;

        let mut request = self.client.get_object().bucket(&self.bucket).key(key);

        if let Some(name) = filename {
            let disposition =
                format!("attachment; filename=\"{}\"", escape_disposition_filename(name));
            request = request.response_content_disposition(disposition);
        }

        let presigned = request
            .presigned(config)
            .await
            .map_err(|e| classify(key, e))?;

        Ok(presigned.uri().to_string())
    }

    fn public_url(&self, key: &str) -> String {
        self.generate_url(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_disposition_filename() {
        assert_eq!(escape_disposition_filename("report.pdf"), "report.pdf");
        assert_eq!(
            escape_disposition_filename("my \"final\" report.pdf"),
            "my \\\"final\\\" report.pdf"
        );
        assert_eq!(
            escape_disposition_filename("back\\slash.pdf"),
            "back\\\\slash.pdf"
        );
    }

    #[test]
    fn test_generate_url_virtual_hosted_and_path_style() {
        std::env::set_var("AWS_ACCESS_KEY_ID", "test");
        std::env::set_var("AWS_SECRET_ACCESS_KEY", "test");

        let aws = S3Storage::new("docs".to_string(), "ap-south-1".to_string(), None)
            .unwrap()
            .with_retry(RetryPolicy::new(1, Duration::from_millis(1)));
        assert_eq!(
            aws.public_url("documents/a.pdf"),
            "https://docs.s3.ap-south-1.amazonaws.com/documents/a.pdf"
        );

        let minio = S3Storage::new(
            "docs".to_string(),
            "us-east-1".to_string(),
            Some("http://localhost:9000/".to_string()),
        )
        .unwrap();
        assert_eq!(
            minio.public_url("documents/a.pdf"),
            "http://localhost:9000/docs/documents/a.pdf"
        );
    }
}
