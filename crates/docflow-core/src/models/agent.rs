use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

use super::file::AssignmentType;

/// An agent account from the directory: eligible for assignment when the
/// role flag says agent and the account is active.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct Agent {
    pub id: Uuid,
    pub display_name: String,
    pub is_agent: bool,
    pub active: bool,
}

/// Append-only audit record of an agent assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct AssignmentLogEntry {
    pub id: Uuid,
    pub file_id: Uuid,
    pub agent_id: Uuid,
    pub action: AssignmentType,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

impl AssignmentLogEntry {
    pub fn new(file_id: Uuid, agent_id: Uuid, action: AssignmentType, reason: &str) -> Self {
        AssignmentLogEntry {
            id: Uuid::new_v4(),
            file_id,
            agent_id,
            action,
            reason: reason.to_string(),
            created_at: Utc::now(),
        }
    }
}
