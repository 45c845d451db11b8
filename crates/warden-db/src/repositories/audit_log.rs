//! PostgreSQL implementation of AuditLogRepository
//!
//! Append-only: this repository issues INSERTs and SELECTs. There is no
//! update or delete path; reversals of earlier actions are recorded as new
//! rows through the same `append`.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use warden_core::entities::ActionRecord;
use warden_core::traits::{AuditLogRepository, AuditQuery, RepoResult};
use warden_core::value_objects::Snowflake;

use crate::models::ActionRecordModel;

use super::error::map_db_error;

/// PostgreSQL implementation of AuditLogRepository
#[derive(Clone)]
pub struct PgAuditLogRepository {
    pool: PgPool,
}

impl PgAuditLogRepository {
    /// Create a new PgAuditLogRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLogRepository for PgAuditLogRepository {
    #[instrument(skip(self, record), fields(id = %record.id, action_type = %record.action_type))]
    async fn append(&self, record: &ActionRecord) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO action_records (id, actor_id, action_type, target_table, target_id,
                                        metadata, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.id.into_inner())
        .bind(record.actor_id.into_inner())
        .bind(&record.action_type)
        .bind(record.target_table.as_deref())
        .bind(record.target_id.map(Snowflake::into_inner))
        .bind(&record.metadata)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<ActionRecord>> {
        let result = sqlx::query_as::<_, ActionRecordModel>(
            r#"
            SELECT id, actor_id, action_type, target_table, target_id, metadata, created_at
            FROM action_records
            WHERE id = $1
            "#,
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(ActionRecord::from))
    }

    #[instrument(skip(self))]
    async fn list(&self, query: AuditQuery) -> RepoResult<Vec<ActionRecord>> {
        let results = sqlx::query_as::<_, ActionRecordModel>(
            r#"
            SELECT id, actor_id, action_type, target_table, target_id, metadata, created_at
            FROM action_records
            WHERE ($1::BIGINT IS NULL OR actor_id = $1)
              AND ($2::TEXT IS NULL OR action_type = $2)
              AND ($3::BIGINT IS NULL OR id < $3)
            ORDER BY id DESC
            LIMIT $4
            "#,
        )
        .bind(query.actor_id.map(Snowflake::into_inner))
        .bind(query.action_type.as_deref())
        .bind(query.before.map(Snowflake::into_inner))
        .bind(query.limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(ActionRecord::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgAuditLogRepository>();
    }
}
