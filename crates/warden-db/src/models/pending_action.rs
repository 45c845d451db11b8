//! Pending action database model

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::FromRow;

/// Database model for the pending_actions table
#[derive(Debug, Clone, FromRow)]
pub struct PendingActionModel {
    pub id: i64,
    pub actor_id: i64,
    pub action_type: String,
    /// Risk tier stored as string, constrained by a CHECK
    pub tier: String,
    pub payload: JsonValue,
    pub justification: String,
    pub target_table: Option<String>,
    pub target_id: Option<i64>,
    pub affected_users_count: i32,
    /// Lifecycle state stored as string, constrained by a CHECK
    pub status: String,
    pub scheduled_for: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub executed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancelled_reason: Option<String>,
}
