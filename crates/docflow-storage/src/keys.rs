//! Shared storage-key generation.
//!
//! Key format: `documents/{uuid}{ext}`. A replacement always allocates a
//! fresh key, so no two byte-objects ever share one.

use uuid::Uuid;

/// Generate a collision-resistant storage key, preserving a sanitized
/// lowercase extension from the original filename.
pub fn generate_storage_key(original_filename: &str) -> String {
    let ext = original_filename
        .rsplit_once('.')
        .map(|(_, e)| e)
        .filter(|e| !e.is_empty() && e.len() <= 8 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default();

    format!("documents/{}{}", Uuid::new_v4(), ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preserves_sanitized_extension() {
        let key = generate_storage_key("Bank Statement.PDF");
        assert!(key.starts_with("documents/"));
        assert!(key.ends_with(".pdf"));
    }

    #[test]
    fn test_drops_suspicious_extension() {
        let key = generate_storage_key("weird.name.tar.gz/../../etc");
        assert!(!key.contains(".."));
        assert!(!key.contains('/') || key.matches('/').count() == 1);
    }

    #[test]
    fn test_no_extension() {
        let key = generate_storage_key("README");
        assert_eq!(key.matches('.').count(), 0);
    }

    #[test]
    fn test_unique_per_call() {
        assert_ne!(generate_storage_key("a.pdf"), generate_storage_key("a.pdf"));
    }
}
