//! Upload input validation: content-type allow-list and size ceilings.
//!
//! Two ceilings exist because direct-to-storage uploads bypass the request
//! body limit of the boundary layer, while server-proxied uploads do not.

use crate::constants::{
    ALLOWED_CONTENT_TYPES, MAX_COMMENT_LENGTH, MAX_DIRECT_UPLOAD_SIZE_BYTES,
    MAX_UPLOAD_SIZE_BYTES,
};
use crate::error::AppError;

/// Which path the bytes take into the object store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPath {
    /// Through the boundary layer's request body (smaller ceiling).
    Proxied,
    /// Straight to the object store via presigned URL (larger ceiling).
    Direct,
}

impl UploadPath {
    pub fn max_size_bytes(&self) -> i64 {
        match self {
            UploadPath::Proxied => MAX_UPLOAD_SIZE_BYTES,
            UploadPath::Direct => MAX_DIRECT_UPLOAD_SIZE_BYTES,
        }
    }
}

/// Validate filename, content type, and declared size for an upload.
pub fn validate_upload(
    original_filename: &str,
    content_type: &str,
    file_size: i64,
    path: UploadPath,
) -> Result<(), AppError> {
    if original_filename.trim().is_empty() {
        return Err(AppError::Validation("filename is required".to_string()));
    }
    if content_type.trim().is_empty() {
        return Err(AppError::Validation("content type is required".to_string()));
    }
    if !ALLOWED_CONTENT_TYPES.contains(&content_type) {
        return Err(AppError::Validation(format!(
            "unsupported content type '{}'",
            content_type
        )));
    }
    if file_size <= 0 {
        return Err(AppError::Validation(
            "file size must be positive".to_string(),
        ));
    }
    let max = path.max_size_bytes();
    if file_size > max {
        return Err(AppError::Validation(format!(
            "file size {} exceeds the {} byte limit",
            file_size, max
        )));
    }
    Ok(())
}

/// Infer a content type from the filename extension. Returns `None` for
/// unrecognized extensions; callers decide whether that is an error.
pub fn infer_content_type(filename: &str) -> Option<&'static str> {
    let ext = filename.rsplit('.').next()?.to_lowercase();
    match ext.as_str() {
        "pdf" => Some("application/pdf"),
        "doc" => Some("application/msword"),
        "docx" => {
            Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
        }
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "tif" | "tiff" => Some("image/tiff"),
        "txt" => Some("text/plain"),
        _ => None,
    }
}

/// Validate a user comment: non-empty after trimming, bounded length.
pub fn validate_comment(comment: &str) -> Result<(), AppError> {
    if comment.trim().is_empty() {
        return Err(AppError::Validation("comment must not be empty".to_string()));
    }
    if comment.len() > MAX_COMMENT_LENGTH {
        return Err(AppError::Validation(format!(
            "comment exceeds {} characters",
            MAX_COMMENT_LENGTH
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_unsupported_content_type() {
        let err = validate_upload("a.exe", "application/x-msdownload", 10, UploadPath::Proxied);
        assert!(matches!(err, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_rejects_zero_and_negative_size() {
        assert!(validate_upload("a.pdf", "application/pdf", 0, UploadPath::Proxied).is_err());
        assert!(validate_upload("a.pdf", "application/pdf", -1, UploadPath::Direct).is_err());
    }

    #[test]
    fn test_size_ceilings_differ_per_path() {
        let twenty_five_mb = 25 * 1024 * 1024;
        // 25MB is over the proxied ceiling but under the direct one
        assert!(validate_upload(
            "a.pdf",
            "application/pdf",
            twenty_five_mb,
            UploadPath::Proxied
        )
        .is_err());
        assert!(validate_upload(
            "a.pdf",
            "application/pdf",
            twenty_five_mb,
            UploadPath::Direct
        )
        .is_ok());
    }

    #[test]
    fn test_direct_ceiling_enforced() {
        let over_direct = MAX_DIRECT_UPLOAD_SIZE_BYTES + 1;
        assert!(
            validate_upload("a.pdf", "application/pdf", over_direct, UploadPath::Direct).is_err()
        );
    }

    #[test]
    fn test_infer_content_type() {
        assert_eq!(infer_content_type("scan.PDF"), Some("application/pdf"));
        assert_eq!(infer_content_type("photo.jpeg"), Some("image/jpeg"));
        assert_eq!(infer_content_type("archive.zip"), None);
        assert_eq!(infer_content_type("noextension"), None);
    }

    #[test]
    fn test_comment_validation() {
        assert!(validate_comment("   ").is_err());
        assert!(validate_comment("please fix page 2").is_ok());
        assert!(validate_comment(&"x".repeat(MAX_COMMENT_LENGTH + 1)).is_err());
    }
}
