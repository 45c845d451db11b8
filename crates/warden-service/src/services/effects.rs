//! Effect handler registry
//!
//! Maps action types to the registered effect handlers that perform the
//! real-world mutation. The registry is built once at startup and validated
//! against the policy registry: a policy entry without a handler refuses to
//! boot rather than failing at dispatch time.

use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;

use warden_core::error::DomainError;
use warden_core::policy::PolicyRegistry;
use warden_core::traits::{EffectError, EffectHandler, EffectOutcome};

/// Registry of effect handlers keyed by action type
#[derive(Clone, Default)]
pub struct EffectRegistry {
    handlers: HashMap<String, Arc<dyn EffectHandler>>,
}

impl EffectRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under its own action type
    #[must_use]
    pub fn with_handler(mut self, handler: Arc<dyn EffectHandler>) -> Self {
        self.handlers.insert(handler.action_type().to_string(), handler);
        self
    }

    /// Look up the handler for an action type
    #[must_use]
    pub fn get(&self, action_type: &str) -> Option<&Arc<dyn EffectHandler>> {
        self.handlers.get(action_type)
    }

    /// Resolve the handler for an action type or fail
    pub fn resolve(&self, action_type: &str) -> Result<&Arc<dyn EffectHandler>, DomainError> {
        self.get(action_type)
            .ok_or_else(|| DomainError::HandlerMissing(action_type.to_string()))
    }

    /// Verify every policy entry has a registered handler
    ///
    /// Called once at startup so a misconfigured deployment fails fast
    /// instead of at the first dispatch.
    pub fn validate_against(&self, policies: &PolicyRegistry) -> Result<(), DomainError> {
        for action_type in policies.action_types() {
            if !self.handlers.contains_key(action_type) {
                return Err(DomainError::HandlerMissing(action_type.to_string()));
            }
        }
        Ok(())
    }

    /// Number of registered handlers
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether the registry has no handlers
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for EffectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectRegistry")
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Effect handler dispatching mutations over Postgres NOTIFY
///
/// The host application owns the tables an action ultimately mutates and
/// listens on a channel per action type (`warden_effect_<action_type>`).
/// Publishing through the shared database keeps the engine decoupled from
/// host schema while the claim and the dispatch ride the same connection
/// pool.
pub struct PgNotifyEffect {
    pool: PgPool,
    action_type: String,
    channel: String,
}

impl PgNotifyEffect {
    /// Create a handler publishing on the conventional channel for the type
    pub fn new(pool: PgPool, action_type: impl Into<String>) -> Self {
        let action_type = action_type.into();
        let channel = format!("warden_effect_{action_type}");
        Self {
            pool,
            action_type,
            channel,
        }
    }

    /// Build one handler per registered policy entry
    #[must_use]
    pub fn for_registry(pool: &PgPool, policies: &PolicyRegistry) -> Vec<Arc<dyn EffectHandler>> {
        policies
            .action_types()
            .map(|action_type| {
                Arc::new(Self::new(pool.clone(), action_type)) as Arc<dyn EffectHandler>
            })
            .collect()
    }
}

#[async_trait]
impl EffectHandler for PgNotifyEffect {
    fn action_type(&self) -> &str {
        &self.action_type
    }

    #[instrument(skip(self, payload), fields(action_type = %self.action_type))]
    async fn execute(&self, payload: &JsonValue) -> Result<EffectOutcome, EffectError> {
        let message = json!({
            "action_type": self.action_type,
            "payload": payload,
        });

        sqlx::query("SELECT pg_notify($1, $2)")
            .bind(&self.channel)
            .bind(message.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| EffectError::Failed(format!("notify dispatch failed: {e}")))?;

        tracing::info!(channel = %self.channel, "Dispatched effect to host application");

        Ok(EffectOutcome::none().with_detail(json!({"dispatched": self.channel})))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingEffect {
        action_type: String,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl EffectHandler for CountingEffect {
        fn action_type(&self) -> &str {
            &self.action_type
        }

        async fn execute(&self, _payload: &JsonValue) -> Result<EffectOutcome, EffectError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(EffectOutcome::none())
        }
    }

    fn counting(action_type: &str) -> (Arc<dyn EffectHandler>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let handler = Arc::new(CountingEffect {
            action_type: action_type.to_string(),
            calls: Arc::clone(&calls),
        });
        (handler, calls)
    }

    #[test]
    fn test_registry_lookup() {
        let (handler, _) = counting("delete_user");
        let registry = EffectRegistry::new().with_handler(handler);

        assert!(registry.get("delete_user").is_some());
        assert!(registry.get("system_freeze").is_none());
        assert!(matches!(
            registry.resolve("system_freeze"),
            Err(DomainError::HandlerMissing(_))
        ));
    }

    #[test]
    fn test_validate_against_policies() {
        let policies = PolicyRegistry::builtin();

        let incomplete = EffectRegistry::new().with_handler(counting("delete_user").0);
        assert!(incomplete.validate_against(&policies).is_err());

        let mut complete = EffectRegistry::new();
        for action_type in policies.action_types() {
            complete = complete.with_handler(counting(action_type).0);
        }
        assert!(complete.validate_against(&policies).is_ok());
        assert_eq!(complete.len(), policies.len());
    }

    #[tokio::test]
    async fn test_handler_dispatch() {
        let (handler, calls) = counting("edit_announcement");
        let registry = EffectRegistry::new().with_handler(handler);

        let handler = registry.resolve("edit_announcement").unwrap();
        handler.execute(&JsonValue::Null).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
