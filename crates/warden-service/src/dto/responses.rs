//! Response DTOs for API endpoints

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;

use warden_core::entities::{ActionRecord, PendingAction, PendingStatus, RiskTier, TierPolicy};
use warden_core::traits::EffectOutcome;
use warden_core::value_objects::Snowflake;

/// Policy metadata surfaced alongside outcomes so the UI can render
/// warnings and the cancel affordance
#[derive(Debug, Clone, Serialize)]
pub struct PolicyInfo {
    pub action_type: String,
    pub tier: RiskTier,
    pub requires_justification: bool,
    pub requires_reauthentication: bool,
    pub delay_seconds: i64,
    pub affects_other_users: bool,
    pub is_reversible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl From<&TierPolicy> for PolicyInfo {
    fn from(policy: &TierPolicy) -> Self {
        Self {
            action_type: policy.action_type.clone(),
            tier: policy.tier,
            requires_justification: policy.requires_justification,
            requires_reauthentication: policy.requires_reauthentication,
            delay_seconds: policy.delay_seconds(),
            affects_other_users: policy.affects_other_users,
            is_reversible: policy.is_reversible,
            warning: policy.warning.clone(),
        }
    }
}

/// A pending action as returned to callers
#[derive(Debug, Clone, Serialize)]
pub struct PendingActionResponse {
    pub id: Snowflake,
    pub actor_id: Snowflake,
    pub action_type: String,
    pub tier: RiskTier,
    pub status: PendingStatus,
    pub justification: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_table: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<Snowflake>,
    pub affected_users_count: i32,
    pub scheduled_for: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_reason: Option<String>,
}

impl From<PendingAction> for PendingActionResponse {
    fn from(action: PendingAction) -> Self {
        Self {
            id: action.id,
            actor_id: action.actor_id,
            action_type: action.action_type,
            tier: action.tier,
            status: action.status,
            justification: action.justification,
            target_table: action.target_table,
            target_id: action.target_id,
            affected_users_count: action.affected_users_count,
            scheduled_for: action.scheduled_for,
            created_at: action.created_at,
            executed_at: action.executed_at,
            cancelled_at: action.cancelled_at,
            cancelled_reason: action.cancelled_reason,
        }
    }
}

/// Outcome of a governance request
///
/// Safe/risky actions come back `executed` with the effect outcome; a
/// dangerous action comes back `scheduled` with the pending handle the
/// caller needs to render a cancel affordance.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ActionOutcomeResponse {
    Executed {
        record_id: Snowflake,
        action_type: String,
        outcome: EffectOutcome,
        policy: PolicyInfo,
    },
    Scheduled {
        pending: PendingActionResponse,
        policy: PolicyInfo,
    },
}

/// An audit record as returned to callers
#[derive(Debug, Clone, Serialize)]
pub struct ActionRecordResponse {
    pub id: Snowflake,
    pub actor_id: Snowflake,
    pub action_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_table: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<Snowflake>,
    pub metadata: JsonValue,
    pub created_at: DateTime<Utc>,
}

impl From<ActionRecord> for ActionRecordResponse {
    fn from(record: ActionRecord) -> Self {
        Self {
            id: record.id,
            actor_id: record.actor_id,
            action_type: record.action_type,
            target_table: record.target_table,
            target_id: record.target_id,
            metadata: record.metadata,
            created_at: record.created_at,
        }
    }
}

/// Liveness probe response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

impl HealthResponse {
    #[must_use]
    pub fn healthy() -> Self {
        Self {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// Readiness probe response with dependency health
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub database: bool,
    pub cache: bool,
}

impl ReadinessResponse {
    #[must_use]
    pub fn ready(database: bool, cache: bool) -> Self {
        Self {
            ready: database && cache,
            database,
            cache,
        }
    }
}
