use async_trait::async_trait;
use chrono::{DateTime, Utc};
use docflow_core::models::{AssignmentType, File, FileContentUpdate, FileStatus};
use docflow_core::AppError;
use sqlx::PgPool;
use uuid::Uuid;

use crate::traits::FileRepository;

const FILE_COLUMNS: &str = r#"
    id, user_id, filename, original_filename, file_size, content_type,
    storage_key, storage_url, status, uploaded_at, created_at, updated_at,
    paid_at, replaced_at, payment_id, assigned_agent_id, assigned_at,
    assignment_type, comment, comment_updated_at, metadata
"#;

/// Repository for file lifecycle records
#[derive(Clone)]
pub struct PgFileRepository {
    pool: PgPool,
}

impl PgFileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileRepository for PgFileRepository {
    async fn insert(&self, file: &File) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO files (
                id, user_id, filename, original_filename, file_size, content_type,
                storage_key, storage_url, status, uploaded_at, created_at, updated_at,
                paid_at, replaced_at, payment_id, assigned_agent_id, assigned_at,
                assignment_type, comment, comment_updated_at, metadata
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                    $13, $14, $15, $16, $17, $18, $19, $20, $21)
            "#,
        )
        .bind(file.id)
        .bind(file.user_id)
        .bind(&file.filename)
        .bind(&file.original_filename)
        .bind(file.file_size)
        .bind(&file.content_type)
        .bind(&file.storage_key)
        .bind(&file.storage_url)
        .bind(file.status)
        .bind(file.uploaded_at)
        .bind(file.created_at)
        .bind(file.updated_at)
        .bind(file.paid_at)
        .bind(file.replaced_at)
        .bind(file.payment_id)
        .bind(file.assigned_agent_id)
        .bind(file.assigned_at)
        .bind(file.assignment_type)
        .bind(&file.comment)
        .bind(file.comment_updated_at)
        .bind(&file.metadata)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, file_id: Uuid) -> Result<Option<File>, AppError> {
        let row = sqlx::query_as::<_, File>(&format!(
            "SELECT {} FROM files WHERE id = $1",
            FILE_COLUMNS
        ))
        .bind(file_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn delete(&self, file_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(file_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<File>, AppError> {
        let rows = sqlx::query_as::<_, File>(&format!(
            "SELECT {} FROM files WHERE user_id = $1 ORDER BY created_at DESC",
            FILE_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn list_batch(
        &self,
        user_id: Option<Uuid>,
        after: Option<Uuid>,
        limit: i64,
    ) -> Result<Vec<File>, AppError> {
        let rows = sqlx::query_as::<_, File>(&format!(
            r#"
            SELECT {}
            FROM files
            WHERE ($1::uuid IS NULL OR user_id = $1)
              AND ($2::uuid IS NULL OR id > $2)
            ORDER BY id
            LIMIT $3
            "#,
            FILE_COLUMNS
        ))
        .bind(user_id)
        .bind(after)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn set_status(&self, file_id: Uuid, status: FileStatus) -> Result<(), AppError> {
        sqlx::query("UPDATE files SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(file_id)
            .bind(status)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn set_paid(
        &self,
        file_id: Uuid,
        payment_id: Uuid,
        paid_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE files
            SET status = $2, payment_id = $3, paid_at = $4, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(file_id)
        .bind(FileStatus::Paid)
        .bind(payment_id)
        .bind(paid_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn set_comment(
        &self,
        file_id: Uuid,
        comment: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE files
            SET comment = $2, comment_updated_at = $3, updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(file_id)
        .bind(comment)
        .bind(updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn set_assignment(
        &self,
        file_id: Uuid,
        agent_id: Uuid,
        assigned_at: DateTime<Utc>,
        assignment_type: AssignmentType,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE files
            SET status = $2, assigned_agent_id = $3, assigned_at = $4,
                assignment_type = $5, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(file_id)
        .bind(FileStatus::Assigned)
        .bind(agent_id)
        .bind(assigned_at)
        .bind(assignment_type)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn apply_content_update(
        &self,
        file_id: Uuid,
        update: &FileContentUpdate,
    ) -> Result<(), AppError> {
        // Payment linkage columns stay out of the update set: a replacement
        // never requires re-payment.
        sqlx::query(
            r#"
            UPDATE files
            SET filename = $2, original_filename = $3, file_size = $4,
                content_type = $5, storage_key = $6, storage_url = $7,
                status = $8, comment = COALESCE($9, comment),
                comment_updated_at = CASE WHEN $9 IS NULL THEN comment_updated_at ELSE $10 END,
                replaced_at = $10, updated_at = $11
            WHERE id = $1
            "#,
        )
        .bind(file_id)
        .bind(&update.filename)
        .bind(&update.original_filename)
        .bind(update.file_size)
        .bind(&update.content_type)
        .bind(&update.storage_key)
        .bind(&update.storage_url)
        .bind(update.status)
        .bind(&update.comment)
        .bind(update.replaced_at)
        .bind(update.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
