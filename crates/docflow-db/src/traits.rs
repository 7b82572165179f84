//! Repository trait seams.
//!
//! Services depend on these traits rather than concrete stores, so the same
//! lifecycle code runs against Postgres in production and the in-memory
//! store in tests. Every mutation here is a single-statement write: the
//! engine takes no cross-request locks, so atomicity per statement is the
//! consistency unit (concurrent writers are last-write-wins).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use docflow_core::models::{
    Agent, AssignmentLogEntry, AssignmentType, File, FileContentUpdate, FileStatus, Payment,
    PaymentStatus,
};
use docflow_core::AppError;
use uuid::Uuid;

#[async_trait]
pub trait FileRepository: Send + Sync {
    async fn insert(&self, file: &File) -> Result<(), AppError>;

    async fn get(&self, file_id: Uuid) -> Result<Option<File>, AppError>;

    /// Delete a file record. Returns `false` when it was already absent.
    async fn delete(&self, file_id: Uuid) -> Result<bool, AppError>;

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<File>, AppError>;

    /// Keyset-paginated scan ordered by id, optionally scoped to one user.
    /// Used by orphan reconciliation to walk the collection in bounded
    /// batches.
    async fn list_batch(
        &self,
        user_id: Option<Uuid>,
        after: Option<Uuid>,
        limit: i64,
    ) -> Result<Vec<File>, AppError>;

    async fn set_status(&self, file_id: Uuid, status: FileStatus) -> Result<(), AppError>;

    /// Mark the file paid: status, payment linkage, and paid timestamp in
    /// one statement.
    async fn set_paid(
        &self,
        file_id: Uuid,
        payment_id: Uuid,
        paid_at: DateTime<Utc>,
    ) -> Result<(), AppError>;

    /// Update comment and its timestamp only.
    async fn set_comment(
        &self,
        file_id: Uuid,
        comment: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), AppError>;

    async fn set_assignment(
        &self,
        file_id: Uuid,
        agent_id: Uuid,
        assigned_at: DateTime<Utc>,
        assignment_type: AssignmentType,
    ) -> Result<(), AppError>;

    /// Apply a content replacement. Payment linkage columns are not in the
    /// update set, so `payment_id`/`paid_at` carry over unchanged.
    async fn apply_content_update(
        &self,
        file_id: Uuid,
        update: &FileContentUpdate,
    ) -> Result<(), AppError>;
}

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn insert(&self, payment: &Payment) -> Result<(), AppError>;

    async fn get(&self, payment_id: Uuid) -> Result<Option<Payment>, AppError>;

    /// Look up the payment for gateway verification by the
    /// (gateway order id, file id, user id) triple.
    async fn find_for_verification(
        &self,
        gateway_order_id: &str,
        file_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Payment>, AppError>;

    async fn set_status(
        &self,
        payment_id: Uuid,
        status: PaymentStatus,
        failure_reason: Option<&str>,
    ) -> Result<(), AppError>;
}

#[async_trait]
pub trait AgentRepository: Send + Sync {
    async fn insert(&self, agent: &Agent) -> Result<(), AppError>;

    /// Accounts with the agent role flag set and currently active.
    async fn list_active(&self) -> Result<Vec<Agent>, AppError>;
}

#[async_trait]
pub trait AssignmentLogRepository: Send + Sync {
    async fn append(&self, entry: &AssignmentLogEntry) -> Result<(), AppError>;

    async fn list_for_file(&self, file_id: Uuid) -> Result<Vec<AssignmentLogEntry>, AppError>;
}
