use async_trait::async_trait;
use docflow_core::models::Agent;
use docflow_core::AppError;
use sqlx::PgPool;

use crate::traits::AgentRepository;

/// Repository for the agent directory
#[derive(Clone)]
pub struct PgAgentRepository {
    pool: PgPool,
}

impl PgAgentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AgentRepository for PgAgentRepository {
    async fn insert(&self, agent: &Agent) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO agents (id, display_name, is_agent, active)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(agent.id)
        .bind(&agent.display_name)
        .bind(agent.is_agent)
        .bind(agent.active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_active(&self) -> Result<Vec<Agent>, AppError> {
        let rows = sqlx::query_as::<_, Agent>(
            r#"
            SELECT id, display_name, is_agent, active
            FROM agents
            WHERE is_agent = TRUE AND active = TRUE
            ORDER BY display_name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
