use crate::candidate::ResumeCounter;
use async_trait::async_trait;
use hirecore::NodeError;
use sqlx::postgres::{PgPool, PgPoolOptions};

/// Resume counter stored in the `workflows` table
///
/// Relies on the database's atomic `x = x + 1` update; concurrent runs of the
/// same workflow never lose an increment.
pub struct PgResumeCounter {
    pool: PgPool,
}

impl PgResumeCounter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, NodeError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(|e| NodeError::Persistence(format!("Failed to connect to database: {}", e)))?;

        tracing::info!("Connected to resume count database");
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl ResumeCounter for PgResumeCounter {
    async fn increment(&self, workflow_id: &str) -> Result<u64, NodeError> {
        let count: Option<i64> = sqlx::query_scalar(
            "UPDATE workflows SET resume_count = resume_count + 1 WHERE id = $1 RETURNING resume_count::BIGINT",
        )
        .bind(workflow_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| NodeError::Persistence(e.to_string()))?;

        match count {
            Some(count) => Ok(count.max(0) as u64),
            None => Err(NodeError::Persistence(format!(
                "workflow {} not found",
                workflow_id
            ))),
        }
    }
}
