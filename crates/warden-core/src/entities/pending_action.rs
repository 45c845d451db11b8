//! Pending action entity - a dangerous action held before execution

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

use crate::entities::RiskTier;
use crate::value_objects::Snowflake;

/// Lifecycle state of a pending action
///
/// Transitions are one-way: `Pending` is the only non-terminal state, and a
/// row that reaches `Executed`, `Cancelled`, or `Expired` never changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PendingStatus {
    Pending,
    Executed,
    Cancelled,
    Expired,
}

impl PendingStatus {
    /// String form as stored in the database
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Executed => "executed",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
        }
    }

    /// Parse from the stored string form
    pub fn parse(s: &str) -> Result<Self, PendingStatusParseError> {
        match s {
            "pending" => Ok(Self::Pending),
            "executed" => Ok(Self::Executed),
            "cancelled" => Ok(Self::Cancelled),
            "expired" => Ok(Self::Expired),
            _ => Err(PendingStatusParseError::Unknown),
        }
    }

    /// Whether this state admits no further transitions
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for PendingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PendingStatus {
    type Err = PendingStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PendingStatus::parse(s)
    }
}

/// Error when parsing a PendingStatus from string
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PendingStatusParseError {
    #[error("unknown pending status")]
    Unknown,
}

/// A dangerous-tier action admitted into the cancelable hold window
#[derive(Debug, Clone, PartialEq)]
pub struct PendingAction {
    pub id: Snowflake,
    pub actor_id: Snowflake,
    pub action_type: String,
    pub tier: RiskTier,
    /// Opaque data the effect handler needs when the action finally runs
    pub payload: JsonValue,
    pub justification: String,
    pub target_table: Option<String>,
    pub target_id: Option<Snowflake>,
    /// Caller-supplied estimate, fixed at admission
    pub affected_users_count: i32,
    pub status: PendingStatus,
    /// Immutable after admission: `created_at + policy.delay`
    pub scheduled_for: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub executed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancelled_reason: Option<String>,
}

impl PendingAction {
    /// Admit a new pending action, scheduling it `delay` from now
    pub fn new(
        id: Snowflake,
        actor_id: Snowflake,
        action_type: impl Into<String>,
        tier: RiskTier,
        payload: JsonValue,
        justification: impl Into<String>,
        delay: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            actor_id,
            action_type: action_type.into(),
            tier,
            payload,
            justification: justification.into(),
            target_table: None,
            target_id: None,
            affected_users_count: 0,
            status: PendingStatus::Pending,
            scheduled_for: now + delay,
            created_at: now,
            executed_at: None,
            cancelled_at: None,
            cancelled_reason: None,
        }
    }

    /// Point the action at the entity it affects
    #[must_use]
    pub fn with_target(mut self, table: impl Into<String>, id: Snowflake) -> Self {
        self.target_table = Some(table.into());
        self.target_id = Some(id);
        self
    }

    /// Record the caller's estimate of affected user accounts
    #[must_use]
    pub fn with_affected_users(mut self, count: i32) -> Self {
        self.affected_users_count = count;
        self
    }

    /// Whether the cancellation window is still open at `now`
    #[must_use]
    pub fn is_cancelable(&self, now: DateTime<Utc>) -> bool {
        self.status == PendingStatus::Pending && now < self.scheduled_for
    }

    /// Whether the action is eligible for a sweep claim at `now`
    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == PendingStatus::Pending && now >= self.scheduled_for
    }

    /// Whether the action outlived the expiry grace period without a claim
    #[must_use]
    pub fn is_past_grace(&self, now: DateTime<Utc>, grace: Duration) -> bool {
        self.status == PendingStatus::Pending && now >= self.scheduled_for + grace
    }

    /// Seconds until the hold window closes (zero once due)
    #[must_use]
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        (self.scheduled_for - now).num_seconds().max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_action(delay_minutes: i64) -> PendingAction {
        PendingAction::new(
            Snowflake::new(1),
            Snowflake::new(100),
            "delete_user",
            RiskTier::Dangerous,
            json!({"user_id": "200"}),
            "duplicate account",
            Duration::minutes(delay_minutes),
        )
    }

    #[test]
    fn test_status_parse_roundtrip() {
        for status in [
            PendingStatus::Pending,
            PendingStatus::Executed,
            PendingStatus::Cancelled,
            PendingStatus::Expired,
        ] {
            assert_eq!(PendingStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(PendingStatus::parse("held").is_err());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!PendingStatus::Pending.is_terminal());
        assert!(PendingStatus::Executed.is_terminal());
        assert!(PendingStatus::Cancelled.is_terminal());
        assert!(PendingStatus::Expired.is_terminal());
    }

    #[test]
    fn test_admission_schedules_after_delay() {
        let action = sample_action(10);
        assert_eq!(action.status, PendingStatus::Pending);
        assert_eq!(action.scheduled_for, action.created_at + Duration::minutes(10));
    }

    #[test]
    fn test_cancelable_only_before_scheduled_for() {
        let action = sample_action(10);
        let inside = action.created_at + Duration::minutes(2);
        let outside = action.created_at + Duration::minutes(11);

        assert!(action.is_cancelable(inside));
        assert!(!action.is_cancelable(outside));
        assert!(!action.is_due(inside));
        assert!(action.is_due(outside));
    }

    #[test]
    fn test_terminal_action_is_not_cancelable_or_due() {
        let mut action = sample_action(10);
        action.status = PendingStatus::Cancelled;
        let any_time = action.created_at + Duration::minutes(2);
        assert!(!action.is_cancelable(any_time));
        assert!(!action.is_due(action.scheduled_for));
    }

    #[test]
    fn test_grace_period() {
        let action = sample_action(5);
        let grace = Duration::minutes(30);
        assert!(!action.is_past_grace(action.scheduled_for + Duration::minutes(29), grace));
        assert!(action.is_past_grace(action.scheduled_for + Duration::minutes(30), grace));
    }

    #[test]
    fn test_remaining_seconds_never_negative() {
        let action = sample_action(1);
        assert_eq!(action.remaining_seconds(action.created_at), 60);
        assert_eq!(
            action.remaining_seconds(action.scheduled_for + Duration::minutes(1)),
            0
        );
    }

    #[test]
    fn test_builders() {
        let action = sample_action(10)
            .with_target("users", Snowflake::new(200))
            .with_affected_users(1);
        assert_eq!(action.target_table.as_deref(), Some("users"));
        assert_eq!(action.target_id, Some(Snowflake::new(200)));
        assert_eq!(action.affected_users_count, 1);
    }
}
