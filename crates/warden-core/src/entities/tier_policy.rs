//! Tier policy - the risk classification attached to an action type

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Risk tier of an administrative action
///
/// Determines how much friction the engine applies before the action
/// takes effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    /// Executes immediately, no extra requirements
    Safe,
    /// Executes immediately but requires a justification
    Risky,
    /// Held in a cancelable pending state before execution
    Dangerous,
}

impl RiskTier {
    /// String form as stored in the database
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Risky => "risky",
            Self::Dangerous => "dangerous",
        }
    }

    /// Parse from the stored string form
    pub fn parse(s: &str) -> Result<Self, RiskTierParseError> {
        match s {
            "safe" => Ok(Self::Safe),
            "risky" => Ok(Self::Risky),
            "dangerous" => Ok(Self::Dangerous),
            _ => Err(RiskTierParseError::Unknown),
        }
    }

    /// Whether actions of this tier go through the deferred scheduler
    #[must_use]
    pub const fn is_deferred(self) -> bool {
        matches!(self, Self::Dangerous)
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RiskTier {
    type Err = RiskTierParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RiskTier::parse(s)
    }
}

/// Error when parsing a RiskTier from string
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RiskTierParseError {
    #[error("unknown risk tier")]
    Unknown,
}

/// Policy entry for one action type
///
/// Immutable configuration: instances are built once at startup inside the
/// [`crate::policy::PolicyRegistry`] and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierPolicy {
    pub action_type: String,
    pub tier: RiskTier,
    /// Caller must supply a non-empty free-text reason
    pub requires_justification: bool,
    /// Caller must present a fresh reauthentication proof at admission
    pub requires_reauthentication: bool,
    /// Hold time before a dangerous action executes (zero for safe/risky)
    pub delay: Duration,
    /// Informational: the action touches accounts other than the actor's
    pub affects_other_users: bool,
    /// Informational: surfaced to the caller, does not change engine behavior
    pub is_reversible: bool,
    /// Warning copy shown before the caller confirms
    pub warning: Option<String>,
}

impl TierPolicy {
    /// Create a safe-tier policy (immediate, no requirements)
    pub fn safe(action_type: impl Into<String>) -> Self {
        Self {
            action_type: action_type.into(),
            tier: RiskTier::Safe,
            requires_justification: false,
            requires_reauthentication: false,
            delay: Duration::zero(),
            affects_other_users: false,
            is_reversible: true,
            warning: None,
        }
    }

    /// Create a risky-tier policy (immediate, justification required)
    pub fn risky(action_type: impl Into<String>) -> Self {
        Self {
            action_type: action_type.into(),
            tier: RiskTier::Risky,
            requires_justification: true,
            requires_reauthentication: false,
            delay: Duration::zero(),
            affects_other_users: false,
            is_reversible: true,
            warning: None,
        }
    }

    /// Create a dangerous-tier policy with the given hold delay
    pub fn dangerous(action_type: impl Into<String>, delay: Duration) -> Self {
        Self {
            action_type: action_type.into(),
            tier: RiskTier::Dangerous,
            requires_justification: true,
            requires_reauthentication: false,
            delay,
            affects_other_users: false,
            is_reversible: false,
            warning: None,
        }
    }

    /// Require a fresh reauthentication proof at admission
    #[must_use]
    pub fn with_reauthentication(mut self) -> Self {
        self.requires_reauthentication = true;
        self
    }

    /// Mark the action as affecting users other than the actor
    #[must_use]
    pub fn affecting_other_users(mut self) -> Self {
        self.affects_other_users = true;
        self
    }

    /// Override the reversibility flag
    #[must_use]
    pub fn with_reversible(mut self, reversible: bool) -> Self {
        self.is_reversible = reversible;
        self
    }

    /// Attach warning copy for the confirmation UI
    #[must_use]
    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warning = Some(warning.into());
        self
    }

    /// Hold delay in whole seconds
    #[must_use]
    pub fn delay_seconds(&self) -> i64 {
        self.delay.num_seconds()
    }

    /// Whether admissions under this policy go through the deferred scheduler
    #[must_use]
    pub fn is_deferred(&self) -> bool {
        self.tier.is_deferred()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_parse_roundtrip() {
        for tier in [RiskTier::Safe, RiskTier::Risky, RiskTier::Dangerous] {
            assert_eq!(RiskTier::parse(tier.as_str()).unwrap(), tier);
        }
        assert!(RiskTier::parse("catastrophic").is_err());
    }

    #[test]
    fn test_safe_policy_defaults() {
        let policy = TierPolicy::safe("edit_announcement");
        assert_eq!(policy.tier, RiskTier::Safe);
        assert!(!policy.requires_justification);
        assert!(!policy.requires_reauthentication);
        assert_eq!(policy.delay_seconds(), 0);
        assert!(!policy.is_deferred());
    }

    #[test]
    fn test_risky_policy_requires_justification() {
        let policy = TierPolicy::risky("update_fee_schedule");
        assert!(policy.requires_justification);
        assert!(!policy.is_deferred());
    }

    #[test]
    fn test_dangerous_policy_builders() {
        let policy = TierPolicy::dangerous("delete_user", Duration::minutes(10))
            .with_reauthentication()
            .affecting_other_users()
            .with_warning("This permanently removes the account.");

        assert_eq!(policy.tier, RiskTier::Dangerous);
        assert!(policy.is_deferred());
        assert!(policy.requires_justification);
        assert!(policy.requires_reauthentication);
        assert!(policy.affects_other_users);
        assert!(!policy.is_reversible);
        assert_eq!(policy.delay_seconds(), 600);
        assert!(policy.warning.is_some());
    }
}
