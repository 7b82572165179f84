use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

/// Lifecycle status of a user-submitted file.
///
/// The happy path is `pending_upload → pending_payment → paid → assigned →
/// processing → completed`. A completed file that the user resubmits moves to
/// `replacement`; a failed payment drops the file back to `pending` (retry
/// eligible, distinct from `pending_payment` which means "never attempted").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "file_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    PendingUpload,
    Pending,
    PendingPayment,
    Paid,
    Assigned,
    Processing,
    Completed,
    Replacement,
}

impl FileStatus {
    /// Only `completed` locks the user comment; `replacement` and
    /// `processing` behave like the pre-payment states here.
    pub fn allows_comment_edit(&self) -> bool {
        !matches!(self, FileStatus::Completed)
    }

    /// Status after a content replacement: a completed file is forced to
    /// `replacement`; any other status (including a pre-existing
    /// `replacement`) is preserved.
    pub fn after_replacement(&self) -> FileStatus {
        match self {
            FileStatus::Completed => FileStatus::Replacement,
            other => *other,
        }
    }
}

/// How an agent was assigned to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "assignment_type", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentType {
    Automatic,
    Manual,
}

/// A user-submitted document and its processing/payment lifecycle record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct File {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Storage-unique filename (derived from the storage key).
    pub filename: String,
    pub original_filename: String,
    pub file_size: i64,
    pub content_type: String,
    pub storage_key: String,
    pub storage_url: String,
    pub status: FileStatus,
    pub uploaded_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub replaced_at: Option<DateTime<Utc>>,
    pub payment_id: Option<Uuid>,
    pub assigned_agent_id: Option<Uuid>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub assignment_type: Option<AssignmentType>,
    pub comment: Option<String>,
    pub comment_updated_at: Option<DateTime<Utc>>,
    pub metadata: Option<JsonValue>,
}

impl File {
    /// Build a new record in `pending_upload`, awaiting the direct upload.
    pub fn new_pending_upload(
        user_id: Uuid,
        original_filename: String,
        file_size: i64,
        content_type: String,
        storage_key: String,
        storage_url: String,
        metadata: Option<JsonValue>,
    ) -> Self {
        let now = Utc::now();
        let filename = storage_key
            .rsplit('/')
            .next()
            .unwrap_or(storage_key.as_str())
            .to_string();
        File {
            id: Uuid::new_v4(),
            user_id,
            filename,
            original_filename,
            file_size,
            content_type,
            storage_key,
            storage_url,
            status: FileStatus::PendingUpload,
            uploaded_at: now,
            created_at: now,
            updated_at: now,
            paid_at: None,
            replaced_at: None,
            payment_id: None,
            assigned_agent_id: None,
            assigned_at: None,
            assignment_type: None,
            comment: None,
            comment_updated_at: None,
            metadata,
        }
    }

    pub fn summary(&self) -> FileSummary {
        FileSummary {
            id: self.id,
            filename: self.filename.clone(),
            original_filename: self.original_filename.clone(),
            file_size: self.file_size,
            content_type: self.content_type.clone(),
            storage_url: self.storage_url.clone(),
            status: self.status,
            updated_at: self.updated_at,
        }
    }
}

/// Request to register a direct upload.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterUploadRequest {
    pub user_id: Uuid,
    pub original_filename: String,
    pub file_size: i64,
    pub content_type: String,
    #[serde(default)]
    pub metadata: Option<JsonValue>,
}

/// Compact response shape for lifecycle operations. Deserialize is needed
/// to read listings back out of the cache layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSummary {
    pub id: Uuid,
    pub filename: String,
    pub original_filename: String,
    pub file_size: i64,
    pub content_type: String,
    pub storage_url: String,
    pub status: FileStatus,
    pub updated_at: DateTime<Utc>,
}

/// Field set written when a file's content is replaced. Payment linkage is
/// deliberately absent: a replacement never requires re-payment, so
/// `payment_id`/`paid_at` are carried over untouched.
#[derive(Debug, Clone)]
pub struct FileContentUpdate {
    pub filename: String,
    pub original_filename: String,
    pub file_size: i64,
    pub content_type: String,
    pub storage_key: String,
    pub storage_url: String,
    pub status: FileStatus,
    pub comment: Option<String>,
    pub replaced_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_edit_locked_only_when_completed() {
        assert!(!FileStatus::Completed.allows_comment_edit());
        for status in [
            FileStatus::PendingUpload,
            FileStatus::Pending,
            FileStatus::PendingPayment,
            FileStatus::Paid,
            FileStatus::Assigned,
            FileStatus::Processing,
            FileStatus::Replacement,
        ] {
            assert!(status.allows_comment_edit(), "{:?}", status);
        }
    }

    #[test]
    fn test_replacement_status_transition() {
        assert_eq!(
            FileStatus::Completed.after_replacement(),
            FileStatus::Replacement
        );
        assert_eq!(
            FileStatus::Replacement.after_replacement(),
            FileStatus::Replacement
        );
        assert_eq!(FileStatus::Paid.after_replacement(), FileStatus::Paid);
        assert_eq!(
            FileStatus::PendingPayment.after_replacement(),
            FileStatus::PendingPayment
        );
    }

    #[test]
    fn test_new_pending_upload_derives_filename_from_key() {
        let file = File::new_pending_upload(
            Uuid::new_v4(),
            "statement.pdf".to_string(),
            1024,
            "application/pdf".to_string(),
            "documents/ab12cd.pdf".to_string(),
            "http://localhost/documents/ab12cd.pdf".to_string(),
            None,
        );
        assert_eq!(file.filename, "ab12cd.pdf");
        assert_eq!(file.status, FileStatus::PendingUpload);
        assert!(file.payment_id.is_none());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&FileStatus::PendingPayment).unwrap();
        assert_eq!(json, "\"pending_payment\"");
    }
}
