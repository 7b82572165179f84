mod helpers;

use docflow_core::models::{FileStatus, RegisterUploadRequest};
use docflow_core::AppError;
use docflow_db::traits::FileRepository;
use docflow_storage::ObjectStorage;
use helpers::TestEnv;
use uuid::Uuid;

fn register_request(user_id: Uuid) -> RegisterUploadRequest {
    RegisterUploadRequest {
        user_id,
        original_filename: "statement.pdf".to_string(),
        file_size: 1024,
        content_type: "application/pdf".to_string(),
        metadata: None,
    }
}

#[tokio::test]
async fn test_register_pending_upload_creates_record_and_url() {
    let env = TestEnv::new().await;
    let user_id = Uuid::new_v4();

    let registered = env
        .lifecycle
        .register_pending_upload(register_request(user_id))
        .await
        .unwrap();

    assert_eq!(registered.file.status, FileStatus::PendingUpload);
    assert_eq!(registered.file.user_id, user_id);
    assert!(registered.file.storage_key.starts_with("documents/"));
    assert!(registered.upload_url.contains(&registered.file.filename));

    let stored = env.files.get(registered.file.id).await.unwrap().unwrap();
    assert_eq!(stored.status, FileStatus::PendingUpload);
}

#[tokio::test]
async fn test_register_rejects_bad_input() {
    let env = TestEnv::new().await;
    let user_id = Uuid::new_v4();

    let mut req = register_request(user_id);
    req.content_type = "application/x-msdownload".to_string();
    assert!(matches!(
        env.lifecycle.register_pending_upload(req).await,
        Err(AppError::Validation(_))
    ));

    let mut req = register_request(user_id);
    req.file_size = 0;
    assert!(matches!(
        env.lifecycle.register_pending_upload(req).await,
        Err(AppError::Validation(_))
    ));

    // over even the direct-upload ceiling
    let mut req = register_request(user_id);
    req.file_size = 101 * 1024 * 1024;
    assert!(matches!(
        env.lifecycle.register_pending_upload(req).await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn test_replace_forces_completed_to_replacement() {
    let env = TestEnv::new().await;
    let user_id = Uuid::new_v4();
    let mut file = env.seed_file(user_id, FileStatus::Completed).await;
    file.payment_id = Some(Uuid::new_v4());
    file.paid_at = Some(chrono::Utc::now());
    env.files.insert(&file).await.unwrap();

    let summary = env
        .lifecycle
        .replace_content(
            file.id,
            user_id,
            b"corrected content".to_vec(),
            "corrected.pdf",
            Some("application/pdf"),
            None,
        )
        .await
        .unwrap();

    assert_eq!(summary.status, FileStatus::Replacement);

    let updated = env.files.get(file.id).await.unwrap().unwrap();
    assert_eq!(updated.status, FileStatus::Replacement);
    assert_ne!(updated.storage_key, file.storage_key);
    // payment linkage carries over, a replacement never requires re-payment
    assert_eq!(updated.payment_id, file.payment_id);
    assert_eq!(updated.paid_at, file.paid_at);

    // new bytes live under the new key, the old object is gone
    let bytes = env.storage.get_buffer(&updated.storage_key).await.unwrap();
    assert_eq!(bytes, b"corrected content");
    assert!(env.storage.get_metadata(&file.storage_key).await.is_err());
}

#[tokio::test]
async fn test_replace_preserves_non_completed_status() {
    let env = TestEnv::new().await;
    let user_id = Uuid::new_v4();

    for status in [
        FileStatus::PendingPayment,
        FileStatus::Paid,
        FileStatus::Processing,
        FileStatus::Replacement,
    ] {
        let file = env.seed_file(user_id, status).await;
        let summary = env
            .lifecycle
            .replace_content(
                file.id,
                user_id,
                b"new bytes".to_vec(),
                "new.pdf",
                Some("application/pdf"),
                None,
            )
            .await
            .unwrap();
        assert_eq!(summary.status, status, "{:?}", status);
    }
}

#[tokio::test]
async fn test_replace_requires_ownership() {
    let env = TestEnv::new().await;
    let file = env.seed_file(Uuid::new_v4(), FileStatus::Paid).await;

    let err = env
        .lifecycle
        .replace_content(
            file.id,
            Uuid::new_v4(),
            b"intruder".to_vec(),
            "x.pdf",
            Some("application/pdf"),
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    // nothing changed
    let unchanged = env.files.get(file.id).await.unwrap().unwrap();
    assert_eq!(unchanged.storage_key, file.storage_key);
}

#[tokio::test]
async fn test_replace_infers_content_type_from_filename() {
    let env = TestEnv::new().await;
    let user_id = Uuid::new_v4();
    let file = env.seed_file(user_id, FileStatus::Paid).await;

    let summary = env
        .lifecycle
        .replace_content(file.id, user_id, b"plain".to_vec(), "notes.txt", None, None)
        .await
        .unwrap();
    assert_eq!(summary.content_type, "text/plain");

    let err = env
        .lifecycle
        .replace_content(file.id, user_id, b"x".to_vec(), "blob.zip", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_replace_rejects_empty_payload() {
    let env = TestEnv::new().await;
    let user_id = Uuid::new_v4();
    let file = env.seed_file(user_id, FileStatus::Paid).await;

    let err = env
        .lifecycle
        .replace_content(file.id, user_id, Vec::new(), "x.pdf", Some("application/pdf"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_replace_stores_optional_comment() {
    let env = TestEnv::new().await;
    let user_id = Uuid::new_v4();
    let file = env.seed_file(user_id, FileStatus::Completed).await;

    env.lifecycle
        .replace_content(
            file.id,
            user_id,
            b"v2".to_vec(),
            "v2.pdf",
            Some("application/pdf"),
            Some("please re-check page 3".to_string()),
        )
        .await
        .unwrap();

    let updated = env.files.get(file.id).await.unwrap().unwrap();
    assert_eq!(updated.comment.as_deref(), Some("please re-check page 3"));
}

#[tokio::test]
async fn test_update_comment_locked_when_completed() {
    let env = TestEnv::new().await;
    let user_id = Uuid::new_v4();
    let file = env.seed_file(user_id, FileStatus::Completed).await;

    let err = env
        .lifecycle
        .update_comment(file.id, user_id, "too late")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));

    let unchanged = env.files.get(file.id).await.unwrap().unwrap();
    assert!(unchanged.comment.is_none());
}

#[tokio::test]
async fn test_update_comment_allowed_before_completion() {
    let env = TestEnv::new().await;
    let user_id = Uuid::new_v4();

    for status in [
        FileStatus::PendingPayment,
        FileStatus::Paid,
        FileStatus::Processing,
        FileStatus::Replacement,
    ] {
        let file = env.seed_file(user_id, status).await;
        env.lifecycle
            .update_comment(file.id, user_id, "looks wrong")
            .await
            .unwrap();
        let updated = env.files.get(file.id).await.unwrap().unwrap();
        assert_eq!(updated.comment.as_deref(), Some("looks wrong"));
        assert!(updated.comment_updated_at.is_some());
    }
}

#[tokio::test]
async fn test_update_comment_rejects_empty() {
    let env = TestEnv::new().await;
    let user_id = Uuid::new_v4();
    let file = env.seed_file(user_id, FileStatus::Paid).await;

    let err = env
        .lifecycle
        .update_comment(file.id, user_id, "   ")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_download_url_carries_original_filename() {
    let env = TestEnv::new().await;
    let user_id = Uuid::new_v4();
    let file = env.seed_file(user_id, FileStatus::Completed).await;

    let url = env
        .lifecycle
        .get_download_url(file.id, user_id)
        .await
        .unwrap();
    assert!(url.contains("sample.pdf"));

    let err = env
        .lifecycle
        .get_download_url(file.id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn test_list_files_serves_cached_listing() {
    let env = TestEnv::new().await;
    let user_id = Uuid::new_v4();
    env.seed_file(user_id, FileStatus::Paid).await;

    let first = env.lifecycle.list_files(user_id).await.unwrap();
    assert_eq!(first.len(), 1);

    // a direct repo write does not invalidate the cache, so the listing
    // stays stale until TTL or an invalidating operation
    env.seed_file(user_id, FileStatus::Paid).await;
    let second = env.lifecycle.list_files(user_id).await.unwrap();
    assert_eq!(second.len(), 1);

    env.cache
        .invalidate(&docflow_services::cache::user_files_key(user_id));
    let third = env.lifecycle.list_files(user_id).await.unwrap();
    assert_eq!(third.len(), 2);
}

#[tokio::test]
async fn test_reconcile_orphans_deletes_only_missing_objects() {
    let env = TestEnv::new().await;
    let user_id = Uuid::new_v4();
    let kept_a = env.seed_file(user_id, FileStatus::Paid).await;
    let orphan = env.seed_file(user_id, FileStatus::Paid).await;
    let kept_b = env.seed_file(user_id, FileStatus::Completed).await;

    // drop the object behind one record
    assert!(env.storage.delete(&orphan.storage_key).await.unwrap());

    let report = env.lifecycle.reconcile_orphans(None).await.unwrap();
    assert_eq!(report.checked, 3);
    assert_eq!(report.valid, 2);
    assert_eq!(report.orphaned, 1);
    assert_eq!(report.deleted, 1);
    assert!(report.errors.is_empty());

    assert!(env.files.get(orphan.id).await.unwrap().is_none());
    assert!(env.files.get(kept_a.id).await.unwrap().is_some());
    assert!(env.files.get(kept_b.id).await.unwrap().is_some());

    // second run converges: nothing newly orphaned
    let report = env.lifecycle.reconcile_orphans(None).await.unwrap();
    assert_eq!(report.checked, 2);
    assert_eq!(report.orphaned, 0);
    assert_eq!(report.deleted, 0);
}

#[tokio::test]
async fn test_reconcile_orphans_spares_pending_uploads() {
    let env = TestEnv::new().await;
    let user_id = Uuid::new_v4();

    // registered but the client has not uploaded yet, so no object exists
    let registered = env
        .lifecycle
        .register_pending_upload(register_request(user_id))
        .await
        .unwrap();

    let report = env.lifecycle.reconcile_orphans(None).await.unwrap();
    assert_eq!(report.checked, 1);
    assert_eq!(report.valid, 1);
    assert_eq!(report.orphaned, 0);
    assert_eq!(report.deleted, 0);

    let kept = env.files.get(registered.file.id).await.unwrap().unwrap();
    assert_eq!(kept.status, FileStatus::PendingUpload);
}

#[tokio::test]
async fn test_reconcile_orphans_honors_user_filter() {
    let env = TestEnv::new().await;
    let user_a = Uuid::new_v4();
    let user_b = Uuid::new_v4();
    let orphan_a = env.seed_file(user_a, FileStatus::Paid).await;
    let orphan_b = env.seed_file(user_b, FileStatus::Paid).await;
    env.storage.delete(&orphan_a.storage_key).await.unwrap();
    env.storage.delete(&orphan_b.storage_key).await.unwrap();

    let report = env.lifecycle.reconcile_orphans(Some(user_a)).await.unwrap();
    assert_eq!(report.checked, 1);
    assert_eq!(report.deleted, 1);

    // the other user's orphan is untouched
    assert!(env.files.get(orphan_b.id).await.unwrap().is_some());
}
