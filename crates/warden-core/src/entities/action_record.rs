//! Action record entity - one immutable audit log entry

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;

use crate::value_objects::Snowflake;

/// An append-only audit entry: who did what to what, when
///
/// Records are never updated or deleted through the governance path. A
/// reversal of an earlier action produces a new record, not an edit.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRecord {
    pub id: Snowflake,
    pub actor_id: Snowflake,
    pub action_type: String,
    pub target_table: Option<String>,
    pub target_id: Option<Snowflake>,
    /// Arbitrary structured context (tier, phase, outcome, reason text)
    pub metadata: JsonValue,
    pub created_at: DateTime<Utc>,
}

impl ActionRecord {
    /// Create a new record stamped with the current time
    pub fn new(id: Snowflake, actor_id: Snowflake, action_type: impl Into<String>) -> Self {
        Self {
            id,
            actor_id,
            action_type: action_type.into(),
            target_table: None,
            target_id: None,
            metadata: JsonValue::Null,
            created_at: Utc::now(),
        }
    }

    /// Point the record at the entity it concerns
    #[must_use]
    pub fn with_target(mut self, table: impl Into<String>, id: Snowflake) -> Self {
        self.target_table = Some(table.into());
        self.target_id = Some(id);
        self
    }

    /// Attach structured context
    #[must_use]
    pub fn with_metadata(mut self, metadata: JsonValue) -> Self {
        self.metadata = metadata;
        self
    }
}
