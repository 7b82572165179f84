//! In-memory repository implementations.
//!
//! Used by the service test suites and local development; behavior mirrors
//! the Postgres implementations (single-write atomicity, keyset ordering by
//! id) without needing a database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use docflow_core::models::{
    Agent, AssignmentLogEntry, AssignmentType, File, FileContentUpdate, FileStatus, Payment,
    PaymentStatus,
};
use docflow_core::AppError;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::traits::{
    AgentRepository, AssignmentLogRepository, FileRepository, PaymentRepository,
};

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

#[derive(Default)]
pub struct InMemoryFileRepository {
    files: RwLock<HashMap<Uuid, File>>,
}

impl InMemoryFileRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FileRepository for InMemoryFileRepository {
    async fn insert(&self, file: &File) -> Result<(), AppError> {
        write(&self.files).insert(file.id, file.clone());
        Ok(())
    }

    async fn get(&self, file_id: Uuid) -> Result<Option<File>, AppError> {
        Ok(read(&self.files).get(&file_id).cloned())
    }

    async fn delete(&self, file_id: Uuid) -> Result<bool, AppError> {
        Ok(write(&self.files).remove(&file_id).is_some())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<File>, AppError> {
        let mut files: Vec<File> = read(&self.files)
            .values()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect();
        files.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(files)
    }

    async fn list_batch(
        &self,
        user_id: Option<Uuid>,
        after: Option<Uuid>,
        limit: i64,
    ) -> Result<Vec<File>, AppError> {
        let mut files: Vec<File> = read(&self.files)
            .values()
            .filter(|f| user_id.map(|u| f.user_id == u).unwrap_or(true))
            .filter(|f| after.map(|a| f.id > a).unwrap_or(true))
            .cloned()
            .collect();
        files.sort_by_key(|f| f.id);
        files.truncate(limit.max(0) as usize);
        Ok(files)
    }

    async fn set_status(&self, file_id: Uuid, status: FileStatus) -> Result<(), AppError> {
        if let Some(file) = write(&self.files).get_mut(&file_id) {
            file.status = status;
            file.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn set_paid(
        &self,
        file_id: Uuid,
        payment_id: Uuid,
        paid_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        if let Some(file) = write(&self.files).get_mut(&file_id) {
            file.status = FileStatus::Paid;
            file.payment_id = Some(payment_id);
            file.paid_at = Some(paid_at);
            file.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn set_comment(
        &self,
        file_id: Uuid,
        comment: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        if let Some(file) = write(&self.files).get_mut(&file_id) {
            file.comment = Some(comment.to_string());
            file.comment_updated_at = Some(updated_at);
            file.updated_at = updated_at;
        }
        Ok(())
    }

    async fn set_assignment(
        &self,
        file_id: Uuid,
        agent_id: Uuid,
        assigned_at: DateTime<Utc>,
        assignment_type: AssignmentType,
    ) -> Result<(), AppError> {
        if let Some(file) = write(&self.files).get_mut(&file_id) {
            file.status = FileStatus::Assigned;
            file.assigned_agent_id = Some(agent_id);
            file.assigned_at = Some(assigned_at);
            file.assignment_type = Some(assignment_type);
            file.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn apply_content_update(
        &self,
        file_id: Uuid,
        update: &FileContentUpdate,
    ) -> Result<(), AppError> {
        if let Some(file) = write(&self.files).get_mut(&file_id) {
            file.filename = update.filename.clone();
            file.original_filename = update.original_filename.clone();
            file.file_size = update.file_size;
            file.content_type = update.content_type.clone();
            file.storage_key = update.storage_key.clone();
            file.storage_url = update.storage_url.clone();
            file.status = update.status;
            if let Some(ref comment) = update.comment {
                file.comment = Some(comment.clone());
                file.comment_updated_at = Some(update.replaced_at);
            }
            file.replaced_at = Some(update.replaced_at);
            file.updated_at = update.updated_at;
            // payment_id / paid_at deliberately untouched
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryPaymentRepository {
    payments: RwLock<HashMap<Uuid, Payment>>,
}

impl InMemoryPaymentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    async fn insert(&self, payment: &Payment) -> Result<(), AppError> {
        write(&self.payments).insert(payment.id, payment.clone());
        Ok(())
    }

    async fn get(&self, payment_id: Uuid) -> Result<Option<Payment>, AppError> {
        Ok(read(&self.payments).get(&payment_id).cloned())
    }

    async fn find_for_verification(
        &self,
        gateway_order_id: &str,
        file_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Payment>, AppError> {
        let payments = read(&self.payments);
        let mut matches: Vec<&Payment> = payments
            .values()
            .filter(|p| {
                p.gateway_order_id.as_deref() == Some(gateway_order_id)
                    && p.file_id == file_id
                    && p.user_id == user_id
            })
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matches.first().map(|p| (*p).clone()))
    }

    async fn set_status(
        &self,
        payment_id: Uuid,
        status: PaymentStatus,
        failure_reason: Option<&str>,
    ) -> Result<(), AppError> {
        if let Some(payment) = write(&self.payments).get_mut(&payment_id) {
            payment.status = status;
            payment.failure_reason = failure_reason.map(String::from);
            payment.updated_at = Utc::now();
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryAgentRepository {
    agents: RwLock<Vec<Agent>>,
}

impl InMemoryAgentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AgentRepository for InMemoryAgentRepository {
    async fn insert(&self, agent: &Agent) -> Result<(), AppError> {
        write(&self.agents).push(agent.clone());
        Ok(())
    }

    async fn list_active(&self) -> Result<Vec<Agent>, AppError> {
        Ok(read(&self.agents)
            .iter()
            .filter(|a| a.is_agent && a.active)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryAssignmentLogRepository {
    entries: RwLock<Vec<AssignmentLogEntry>>,
}

impl InMemoryAssignmentLogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AssignmentLogRepository for InMemoryAssignmentLogRepository {
    async fn append(&self, entry: &AssignmentLogEntry) -> Result<(), AppError> {
        write(&self.entries).push(entry.clone());
        Ok(())
    }

    async fn list_for_file(&self, file_id: Uuid) -> Result<Vec<AssignmentLogEntry>, AppError> {
        Ok(read(&self.entries)
            .iter()
            .filter(|e| e.file_id == file_id)
            .cloned()
            .collect())
    }
}
