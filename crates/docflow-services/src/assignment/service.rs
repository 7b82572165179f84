use chrono::Utc;
use docflow_core::models::{Agent, AssignmentLogEntry, AssignmentType};
use docflow_core::AppError;
use docflow_db::traits::{AgentRepository, AssignmentLogRepository, FileRepository};
use rand::seq::SliceRandom;
use std::sync::Arc;
use uuid::Uuid;

/// Pluggable selection policy over the active agent pool.
pub trait AgentSelector: Send + Sync {
    fn pick<'a>(&self, agents: &'a [Agent]) -> Option<&'a Agent>;
}

/// Uniform random pick among active agents. No load awareness; a known
/// limitation of the current policy, not an oversight.
pub struct RandomSelector;

impl AgentSelector for RandomSelector {
    fn pick<'a>(&self, agents: &'a [Agent]) -> Option<&'a Agent> {
        agents.choose(&mut rand::thread_rng())
    }
}

/// Assigns an agent to a file after payment capture and records the
/// assignment in the append-only audit log.
pub struct AssignmentService {
    files: Arc<dyn FileRepository>,
    agents: Arc<dyn AgentRepository>,
    log: Arc<dyn AssignmentLogRepository>,
    selector: Box<dyn AgentSelector>,
}

impl AssignmentService {
    pub fn new(
        files: Arc<dyn FileRepository>,
        agents: Arc<dyn AgentRepository>,
        log: Arc<dyn AssignmentLogRepository>,
    ) -> Self {
        Self::with_selector(files, agents, log, Box::new(RandomSelector))
    }

    pub fn with_selector(
        files: Arc<dyn FileRepository>,
        agents: Arc<dyn AgentRepository>,
        log: Arc<dyn AssignmentLogRepository>,
        selector: Box<dyn AgentSelector>,
    ) -> Self {
        Self {
            files,
            agents,
            log,
            selector,
        }
    }

    /// Assign an active agent to `file_id`. Returns `None` when no active
    /// agents exist; the file stays unassigned and the caller proceeds.
    #[tracing::instrument(skip(self))]
    pub async fn assign(&self, file_id: Uuid) -> Result<Option<Uuid>, AppError> {
        let active = self.agents.list_active().await?;
        let Some(agent) = self.selector.pick(&active) else {
            tracing::info!(file_id = %file_id, "no active agents, file left unassigned");
            return Ok(None);
        };

        let now = Utc::now();
        self.files
            .set_assignment(file_id, agent.id, now, AssignmentType::Automatic)
            .await?;

        let entry = AssignmentLogEntry::new(
            file_id,
            agent.id,
            AssignmentType::Automatic,
            "payment captured",
        );
        self.log.append(&entry).await?;

        tracing::info!(file_id = %file_id, agent_id = %agent.id, "agent assigned");
        Ok(Some(agent.id))
    }
}
