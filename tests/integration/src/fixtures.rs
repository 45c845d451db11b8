//! Test fixtures and data generators
//!
//! Provides reusable test data for integration tests.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};

use warden_core::Snowflake;

/// Counter for unique test data
static COUNTER: AtomicI64 = AtomicI64::new(1);

/// Generate a unique actor ID for a test
pub fn unique_actor() -> Snowflake {
    let base = chrono::Utc::now().timestamp_millis() << 16;
    Snowflake::new(base + COUNTER.fetch_add(1, Ordering::SeqCst))
}

/// Privileged action request body
#[derive(Debug, Clone, Serialize)]
pub struct ActionRequestBody {
    pub action_type: String,
    pub payload: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reauth_proof: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_table: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affected_users: Option<i32>,
}

impl ActionRequestBody {
    /// A safe-tier request (no justification needed)
    pub fn edit_announcement() -> Self {
        Self {
            action_type: "edit_announcement".to_string(),
            payload: serde_json::json!({"announcement_id": "1", "body": "updated"}),
            justification: None,
            reauth_proof: None,
            target_table: Some("announcements".to_string()),
            target_id: Some("1".to_string()),
            affected_users: None,
        }
    }

    /// A risky-tier request
    pub fn update_fee_schedule(justification: Option<&str>) -> Self {
        Self {
            action_type: "update_fee_schedule".to_string(),
            payload: serde_json::json!({"fee_id": "3", "amount_cents": 12500}),
            justification: justification.map(String::from),
            reauth_proof: None,
            target_table: Some("fee_schedules".to_string()),
            target_id: Some("3".to_string()),
            affected_users: None,
        }
    }

    /// A dangerous-tier request (10 minute hold)
    pub fn delete_user(target: Snowflake, justification: &str) -> Self {
        Self {
            action_type: "delete_user".to_string(),
            payload: serde_json::json!({"user_id": target.to_string()}),
            justification: Some(justification.to_string()),
            reauth_proof: None,
            target_table: Some("users".to_string()),
            target_id: Some(target.to_string()),
            affected_users: Some(1),
        }
    }

    /// A dangerous-tier request gated on reauthentication (5 minute hold)
    pub fn system_freeze(justification: &str, reauth_proof: Option<String>) -> Self {
        Self {
            action_type: "system_freeze".to_string(),
            payload: serde_json::json!({"scope": "all"}),
            justification: Some(justification.to_string()),
            reauth_proof,
            target_table: None,
            target_id: None,
            affected_users: None,
        }
    }
}

/// Cancel request body
#[derive(Debug, Serialize)]
pub struct CancelBody {
    pub reason: String,
}

impl CancelBody {
    pub fn new(reason: &str) -> Self {
        Self {
            reason: reason.to_string(),
        }
    }
}

/// Outcome response from POST /actions
#[derive(Debug, Deserialize)]
pub struct OutcomeBody {
    pub status: String,
    pub record_id: Option<String>,
    pub outcome: Option<EffectOutcomeBody>,
    pub pending: Option<PendingActionBody>,
    pub policy: Option<PolicyBody>,
}

/// Effect outcome in an executed response
#[derive(Debug, Deserialize)]
pub struct EffectOutcomeBody {
    pub affected_users: i64,
    pub detail: Option<serde_json::Value>,
}

/// Pending action body
#[derive(Debug, Deserialize)]
pub struct PendingActionBody {
    pub id: String,
    pub actor_id: String,
    pub action_type: String,
    pub tier: String,
    pub status: String,
    pub justification: String,
    pub scheduled_for: String,
    pub created_at: String,
    pub cancelled_at: Option<String>,
    pub cancelled_reason: Option<String>,
}

/// Policy metadata body
#[derive(Debug, Deserialize)]
pub struct PolicyBody {
    pub action_type: String,
    pub tier: String,
    pub requires_justification: bool,
    pub requires_reauthentication: bool,
    pub delay_seconds: i64,
    pub is_reversible: bool,
    pub warning: Option<String>,
}

/// Audit record body
#[derive(Debug, Deserialize)]
pub struct RecordBody {
    pub id: String,
    pub actor_id: String,
    pub action_type: String,
    pub metadata: serde_json::Value,
    pub created_at: String,
}

/// Error response
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}
