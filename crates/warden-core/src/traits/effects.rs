//! Effect handler trait - the real-world mutation behind an action type
//!
//! The engine treats handlers as black boxes with a narrow contract:
//! synchronous-and-fast for safe/risky tiers, idempotent-or-safe-when-
//! unattended for the dangerous tier (the effect runs with no operator
//! present once the hold window elapses).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

/// What an effect handler reports back after running
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectOutcome {
    /// Number of user accounts the mutation actually touched
    pub affected_users: i64,
    /// Optional handler-specific detail, recorded in the audit metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<JsonValue>,
}

impl EffectOutcome {
    /// Outcome touching the given number of users
    #[must_use]
    pub fn affecting(affected_users: i64) -> Self {
        Self {
            affected_users,
            detail: None,
        }
    }

    /// Outcome touching no other users
    #[must_use]
    pub fn none() -> Self {
        Self::affecting(0)
    }

    /// Attach handler-specific detail
    #[must_use]
    pub fn with_detail(mut self, detail: JsonValue) -> Self {
        self.detail = Some(detail);
        self
    }
}

/// Failure reported by an effect handler
#[derive(Debug, Error)]
pub enum EffectError {
    /// The payload did not contain what the handler needs
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// The mutation itself failed
    #[error("{0}")]
    Failed(String),
}

/// A registered, statically-typed effect for one action type
///
/// Handlers are resolved from a registry validated at startup, never
/// dispatched dynamically at call time.
#[async_trait]
pub trait EffectHandler: Send + Sync {
    /// The action type this handler implements
    fn action_type(&self) -> &str;

    /// Perform the mutation described by `payload`
    async fn execute(&self, payload: &JsonValue) -> Result<EffectOutcome, EffectError>;
}
