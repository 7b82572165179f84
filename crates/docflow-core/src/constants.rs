//! Shared constants for upload limits, content types, and housekeeping.

/// Maximum upload size for server-proxied uploads (bytes). Bounded by the
/// request-body limit of the boundary layer.
pub const MAX_UPLOAD_SIZE_BYTES: i64 = 20 * 1024 * 1024;

/// Maximum upload size for direct-to-storage uploads via presigned URL
/// (bytes). Larger than the proxied ceiling because these bypass the
/// boundary layer entirely.
pub const MAX_DIRECT_UPLOAD_SIZE_BYTES: i64 = 100 * 1024 * 1024;

/// Content types accepted for user document uploads.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "image/jpeg",
    "image/png",
    "image/tiff",
    "text/plain",
];

/// Maximum length of a user comment on a file.
pub const MAX_COMMENT_LENGTH: usize = 2000;

/// Number of file records checked per batch during orphan reconciliation.
pub const ORPHAN_SCAN_BATCH_SIZE: i64 = 25;

/// Pause between orphan-reconciliation batches (milliseconds), to bound the
/// request rate against the object store.
pub const ORPHAN_SCAN_BATCH_PAUSE_MS: u64 = 500;

/// Default expiry for presigned upload URLs (seconds).
pub const DEFAULT_UPLOAD_URL_EXPIRY_SECS: u64 = 900;

/// Default expiry for presigned download URLs (seconds).
pub const DEFAULT_DOWNLOAD_URL_EXPIRY_SECS: u64 = 300;
