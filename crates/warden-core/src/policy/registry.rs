//! Policy registry implementation
//!
//! Maps action-type identifiers to tier policies. Loaded once at process
//! start and immutable afterwards; changing a tier means deploying a new
//! registry version, not mutating a running one.

use chrono::Duration;
use std::collections::HashMap;

use crate::entities::TierPolicy;

/// Fallback applied to action types the registry does not know:
/// risky, justification required, no reauthentication, no delay.
fn default_policy() -> TierPolicy {
    TierPolicy::risky("*").with_reversible(false)
}

/// Process-wide immutable policy table
///
/// `classify` is total: every action type resolves to a policy, with unknown
/// types falling back to the conservative default.
#[derive(Debug, Clone)]
pub struct PolicyRegistry {
    version: String,
    policies: HashMap<String, TierPolicy>,
    fallback: TierPolicy,
}

impl PolicyRegistry {
    /// Create an empty registry with the given version label
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            policies: HashMap::new(),
            fallback: default_policy(),
        }
    }

    /// The built-in policy table shipped with this release
    #[must_use]
    pub fn builtin() -> Self {
        Self::new("2025.3")
            .with_policy(TierPolicy::safe("edit_announcement"))
            .with_policy(TierPolicy::safe("update_skills_catalog"))
            .with_policy(
                TierPolicy::risky("update_fee_schedule")
                    .affecting_other_users()
                    .with_warning("Fee changes apply to all enrolled tenants."),
            )
            .with_policy(
                TierPolicy::risky("regenerate_credential")
                    .with_reauthentication()
                    .affecting_other_users()
                    .with_reversible(false)
                    .with_warning("Existing credential links stop working immediately."),
            )
            .with_policy(
                TierPolicy::dangerous("delete_user", Duration::minutes(10))
                    .affecting_other_users()
                    .with_warning("The account and its data are removed permanently."),
            )
            .with_policy(
                TierPolicy::dangerous("purge_tenant_data", Duration::minutes(10))
                    .with_reauthentication()
                    .affecting_other_users()
                    .with_warning("All records belonging to the tenant are destroyed."),
            )
            .with_policy(
                TierPolicy::dangerous("system_freeze", Duration::minutes(5))
                    .with_reauthentication()
                    .affecting_other_users()
                    .with_reversible(true)
                    .with_warning("Every user is locked out until the freeze is lifted."),
            )
    }

    /// Add or replace a policy entry
    #[must_use]
    pub fn with_policy(mut self, policy: TierPolicy) -> Self {
        self.policies.insert(policy.action_type.clone(), policy);
        self
    }

    /// Resolve the policy for an action type
    ///
    /// Total function: unknown action types get the conservative default,
    /// this never fails.
    #[must_use]
    pub fn classify(&self, action_type: &str) -> &TierPolicy {
        self.policies.get(action_type).unwrap_or(&self.fallback)
    }

    /// Whether the registry has an explicit entry for this action type
    #[must_use]
    pub fn contains(&self, action_type: &str) -> bool {
        self.policies.contains_key(action_type)
    }

    /// All explicitly registered action types
    pub fn action_types(&self) -> impl Iterator<Item = &str> {
        self.policies.keys().map(String::as_str)
    }

    /// Number of explicit entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// Whether the registry has no explicit entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Registry version label, logged at startup
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }
}

impl Default for PolicyRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
