use async_trait::async_trait;
use docflow_core::models::AssignmentLogEntry;
use docflow_core::AppError;
use sqlx::PgPool;
use uuid::Uuid;

use crate::traits::AssignmentLogRepository;

/// Append-only audit log of agent assignments
#[derive(Clone)]
pub struct PgAssignmentLogRepository {
    pool: PgPool,
}

impl PgAssignmentLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssignmentLogRepository for PgAssignmentLogRepository {
    async fn append(&self, entry: &AssignmentLogEntry) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO assignment_log (id, file_id, agent_id, action, reason, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(entry.id)
        .bind(entry.file_id)
        .bind(entry.agent_id)
        .bind(entry.action)
        .bind(&entry.reason)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_for_file(&self, file_id: Uuid) -> Result<Vec<AssignmentLogEntry>, AppError> {
        let rows = sqlx::query_as::<_, AssignmentLogEntry>(
            r#"
            SELECT id, file_id, agent_id, action, reason, created_at
            FROM assignment_log
            WHERE file_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(file_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
