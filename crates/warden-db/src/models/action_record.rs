//! Action record database model

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::FromRow;

/// Database model for the action_records table
///
/// Rows in this table are append-only: the engine issues INSERTs and
/// SELECTs against it, never UPDATEs or DELETEs.
#[derive(Debug, Clone, FromRow)]
pub struct ActionRecordModel {
    pub id: i64,
    pub actor_id: i64,
    pub action_type: String,
    pub target_table: Option<String>,
    pub target_id: Option<i64>,
    /// JSON object carrying tier, phase, and outcome context
    pub metadata: Option<JsonValue>,
    pub created_at: DateTime<Utc>,
}
