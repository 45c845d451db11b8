//! PostgreSQL implementation of PendingActionRepository
//!
//! Every transition out of the `pending` state is a single status-guarded
//! UPDATE. The guard is what closes the cancel/execute race: when a cancel
//! request and a sweep claim hit the same row, exactly one UPDATE matches
//! and the other sees zero rows affected.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use warden_core::entities::PendingAction;
use warden_core::traits::{PendingActionRepository, RepoResult};
use warden_core::value_objects::Snowflake;

use crate::mappers::pending_action_from_model;
use crate::models::PendingActionModel;

use super::error::map_db_error;

/// PostgreSQL implementation of PendingActionRepository
#[derive(Clone)]
pub struct PgPendingActionRepository {
    pool: PgPool,
}

impl PgPendingActionRepository {
    /// Create a new PgPendingActionRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PendingActionRepository for PgPendingActionRepository {
    #[instrument(skip(self, action), fields(id = %action.id))]
    async fn insert(&self, action: &PendingAction) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO pending_actions (id, actor_id, action_type, tier, payload, justification,
                                         target_table, target_id, affected_users_count, status,
                                         scheduled_for, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(action.id.into_inner())
        .bind(action.actor_id.into_inner())
        .bind(&action.action_type)
        .bind(action.tier.as_str())
        .bind(&action.payload)
        .bind(&action.justification)
        .bind(action.target_table.as_deref())
        .bind(action.target_id.map(Snowflake::into_inner))
        .bind(action.affected_users_count)
        .bind(action.status.as_str())
        .bind(action.scheduled_for)
        .bind(action.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<PendingAction>> {
        let result = sqlx::query_as::<_, PendingActionModel>(
            r#"
            SELECT id, actor_id, action_type, tier, payload, justification,
                   target_table, target_id, affected_users_count, status,
                   scheduled_for, created_at, executed_at, cancelled_at, cancelled_reason
            FROM pending_actions
            WHERE id = $1
            "#,
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(pending_action_from_model).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_actor(&self, actor_id: Snowflake, limit: i64) -> RepoResult<Vec<PendingAction>> {
        let results = sqlx::query_as::<_, PendingActionModel>(
            r#"
            SELECT id, actor_id, action_type, tier, payload, justification,
                   target_table, target_id, affected_users_count, status,
                   scheduled_for, created_at, executed_at, cancelled_at, cancelled_reason
            FROM pending_actions
            WHERE actor_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(actor_id.into_inner())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(pending_action_from_model).collect()
    }

    #[instrument(skip(self))]
    async fn list_pending(&self, limit: i64) -> RepoResult<Vec<PendingAction>> {
        let results = sqlx::query_as::<_, PendingActionModel>(
            r#"
            SELECT id, actor_id, action_type, tier, payload, justification,
                   target_table, target_id, affected_users_count, status,
                   scheduled_for, created_at, executed_at, cancelled_at, cancelled_reason
            FROM pending_actions
            WHERE status = 'pending'
            ORDER BY scheduled_for ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(pending_action_from_model).collect()
    }

    #[instrument(skip(self))]
    async fn find_due(&self, now: DateTime<Utc>, limit: i64) -> RepoResult<Vec<PendingAction>> {
        let results = sqlx::query_as::<_, PendingActionModel>(
            r#"
            SELECT id, actor_id, action_type, tier, payload, justification,
                   target_table, target_id, affected_users_count, status,
                   scheduled_for, created_at, executed_at, cancelled_at, cancelled_reason
            FROM pending_actions
            WHERE status = 'pending' AND scheduled_for <= $1
            ORDER BY scheduled_for ASC
            LIMIT $2
            "#,
        )
        .bind(now)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(pending_action_from_model).collect()
    }

    #[instrument(skip(self))]
    async fn claim_for_execution(&self, id: Snowflake, now: DateTime<Utc>) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE pending_actions
            SET status = 'executed', executed_at = $2
            WHERE id = $1 AND status = 'pending' AND scheduled_for <= $2
            "#,
        )
        .bind(id.into_inner())
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self, reason))]
    async fn cancel(&self, id: Snowflake, reason: &str, now: DateTime<Utc>) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE pending_actions
            SET status = 'cancelled', cancelled_at = $3, cancelled_reason = $2
            WHERE id = $1 AND status = 'pending' AND scheduled_for > $3
            "#,
        )
        .bind(id.into_inner())
        .bind(reason)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self))]
    async fn mark_expired(&self, id: Snowflake, _now: DateTime<Utc>) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE pending_actions
            SET status = 'expired'
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgPendingActionRepository>();
    }
}
