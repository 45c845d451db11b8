//! Service context - dependency container for services
//!
//! Holds the repositories, cache stores, policy and effect registries, and
//! engine configuration shared by all services.

use std::sync::Arc;

use warden_cache::{ReauthProofStore, SharedRedisPool};
use warden_common::auth::IdentityVerifier;
use warden_common::GovernanceConfig;
use warden_core::policy::PolicyRegistry;
use warden_core::traits::{AuditLogRepository, PendingActionRepository};
use warden_core::{Snowflake, SnowflakeGenerator};
use warden_db::PgPool;

use super::effects::EffectRegistry;

/// Service context containing all dependencies
///
/// This is the main dependency container that gets passed to all services.
/// It provides access to:
/// - Database repositories
/// - The Redis-backed reauth proof store
/// - The identity verifier
/// - The policy and effect registries
/// - The Snowflake generator for ID generation
#[derive(Clone)]
pub struct ServiceContext {
    // Database pool
    pool: PgPool,

    // Redis pool
    redis_pool: SharedRedisPool,

    // Repositories
    pending_repo: Arc<dyn PendingActionRepository>,
    audit_repo: Arc<dyn AuditLogRepository>,

    // Cache stores
    reauth_store: ReauthProofStore,

    // Registries
    policies: Arc<PolicyRegistry>,
    effects: Arc<EffectRegistry>,

    // Services
    verifier: Arc<IdentityVerifier>,
    snowflake_generator: Arc<SnowflakeGenerator>,

    // Engine configuration
    governance: GovernanceConfig,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pool: PgPool,
        redis_pool: SharedRedisPool,
        pending_repo: Arc<dyn PendingActionRepository>,
        audit_repo: Arc<dyn AuditLogRepository>,
        policies: Arc<PolicyRegistry>,
        effects: Arc<EffectRegistry>,
        verifier: Arc<IdentityVerifier>,
        snowflake_generator: Arc<SnowflakeGenerator>,
        governance: GovernanceConfig,
    ) -> Self {
        let inner_pool = (*redis_pool).clone();
        let reauth_ttl = u64::try_from(verifier.reauth_window_secs()).unwrap_or(300);
        let reauth_store = ReauthProofStore::with_ttl(inner_pool, reauth_ttl);

        Self {
            pool,
            redis_pool,
            pending_repo,
            audit_repo,
            reauth_store,
            policies,
            effects,
            verifier,
            snowflake_generator,
            governance,
        }
    }

    // === Pools ===

    /// Get the PostgreSQL connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Get the Redis connection pool
    pub fn redis_pool(&self) -> &SharedRedisPool {
        &self.redis_pool
    }

    // === Repositories ===

    /// Get the pending action repository
    pub fn pending_repo(&self) -> &dyn PendingActionRepository {
        self.pending_repo.as_ref()
    }

    /// Get the audit log repository
    pub fn audit_repo(&self) -> &dyn AuditLogRepository {
        self.audit_repo.as_ref()
    }

    // === Cache Stores ===

    /// Get the reauth proof store
    pub fn reauth_store(&self) -> &ReauthProofStore {
        &self.reauth_store
    }

    // === Registries ===

    /// Get the policy registry
    pub fn policies(&self) -> &PolicyRegistry {
        self.policies.as_ref()
    }

    /// Get the effect registry
    pub fn effects(&self) -> &EffectRegistry {
        self.effects.as_ref()
    }

    // === Services ===

    /// Get the identity verifier
    pub fn verifier(&self) -> &IdentityVerifier {
        self.verifier.as_ref()
    }

    /// Get the snowflake ID generator
    pub fn snowflake_generator(&self) -> &SnowflakeGenerator {
        self.snowflake_generator.as_ref()
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }

    // === Configuration ===

    /// Get the governance engine configuration
    pub fn governance(&self) -> &GovernanceConfig {
        &self.governance
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("pool", &"PgPool")
            .field("redis_pool", &"SharedRedisPool")
            .field("policies", &self.policies.version())
            .field("effects", &self.effects.len())
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    pool: Option<PgPool>,
    redis_pool: Option<SharedRedisPool>,
    pending_repo: Option<Arc<dyn PendingActionRepository>>,
    audit_repo: Option<Arc<dyn AuditLogRepository>>,
    policies: Option<Arc<PolicyRegistry>>,
    effects: Option<Arc<EffectRegistry>>,
    verifier: Option<Arc<IdentityVerifier>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
    governance: Option<GovernanceConfig>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pool(mut self, pool: PgPool) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn redis_pool(mut self, redis_pool: SharedRedisPool) -> Self {
        self.redis_pool = Some(redis_pool);
        self
    }

    pub fn pending_repo(mut self, repo: Arc<dyn PendingActionRepository>) -> Self {
        self.pending_repo = Some(repo);
        self
    }

    pub fn audit_repo(mut self, repo: Arc<dyn AuditLogRepository>) -> Self {
        self.audit_repo = Some(repo);
        self
    }

    pub fn policies(mut self, policies: Arc<PolicyRegistry>) -> Self {
        self.policies = Some(policies);
        self
    }

    pub fn effects(mut self, effects: Arc<EffectRegistry>) -> Self {
        self.effects = Some(effects);
        self
    }

    pub fn verifier(mut self, verifier: Arc<IdentityVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    pub fn governance(mut self, governance: GovernanceConfig) -> Self {
        self.governance = Some(governance);
        self
    }

    /// Build the ServiceContext
    ///
    /// Validates that every policy entry has a registered effect handler
    /// before handing the context out.
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is
    /// missing or the effect registry does not cover the policy table
    pub fn build(self) -> super::error::ServiceResult<ServiceContext> {
        use super::error::ServiceError;

        let policies = self
            .policies
            .ok_or_else(|| ServiceError::validation("policies is required"))?;
        let effects = self
            .effects
            .ok_or_else(|| ServiceError::validation("effects is required"))?;

        effects
            .validate_against(&policies)
            .map_err(ServiceError::Domain)?;

        Ok(ServiceContext::new(
            self.pool.ok_or_else(|| ServiceError::validation("pool is required"))?,
            self.redis_pool.ok_or_else(|| ServiceError::validation("redis_pool is required"))?,
            self.pending_repo.ok_or_else(|| ServiceError::validation("pending_repo is required"))?,
            self.audit_repo.ok_or_else(|| ServiceError::validation("audit_repo is required"))?,
            policies,
            effects,
            self.verifier.ok_or_else(|| ServiceError::validation("verifier is required"))?,
            self.snowflake_generator
                .ok_or_else(|| ServiceError::validation("snowflake_generator is required"))?,
            self.governance.ok_or_else(|| ServiceError::validation("governance is required"))?,
        ))
    }
}
