//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation. The conditional transitions on
//! `PendingActionRepository` are the engine's only lock-equivalent: each one
//! must be a single status-guarded update at the storage layer, never a
//! read-then-write pair.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{ActionRecord, PendingAction};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Pending Action Repository
// ============================================================================

#[async_trait]
pub trait PendingActionRepository: Send + Sync {
    /// Persist a newly admitted action (status must be `pending`)
    async fn insert(&self, action: &PendingAction) -> RepoResult<()>;

    /// Find a pending action by ID, in any status
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<PendingAction>>;

    /// List actions requested by one actor, newest first
    async fn find_by_actor(&self, actor_id: Snowflake, limit: i64) -> RepoResult<Vec<PendingAction>>;

    /// List all actions still in the `pending` state, soonest first
    async fn list_pending(&self, limit: i64) -> RepoResult<Vec<PendingAction>>;

    /// List pending actions whose `scheduled_for` has passed at `now`
    async fn find_due(&self, now: DateTime<Utc>, limit: i64) -> RepoResult<Vec<PendingAction>>;

    /// Atomic claim: `pending` -> `executed`, guarded on the row still being
    /// pending and due. Returns `false` when the guard fails (the row was
    /// cancelled, already claimed, or is not yet due).
    async fn claim_for_execution(&self, id: Snowflake, now: DateTime<Utc>) -> RepoResult<bool>;

    /// Atomic cancel: `pending` -> `cancelled`, guarded on the row still
    /// being pending and the window (`now < scheduled_for`) still open.
    /// Returns `false` when the guard fails.
    async fn cancel(&self, id: Snowflake, reason: &str, now: DateTime<Utc>) -> RepoResult<bool>;

    /// Atomic expiry: `pending` -> `expired`, guarded on the row still being
    /// pending. Returns `false` when the guard fails.
    async fn mark_expired(&self, id: Snowflake, now: DateTime<Utc>) -> RepoResult<bool>;
}

// ============================================================================
// Audit Log Repository
// ============================================================================

/// Filter and cursor options for audit queries
#[derive(Debug, Clone, Default)]
pub struct AuditQuery {
    pub actor_id: Option<Snowflake>,
    pub action_type: Option<String>,
    /// Return records with IDs strictly before this cursor
    pub before: Option<Snowflake>,
    pub limit: i64,
}

/// Append-only store of action records
///
/// Deliberately has no update or delete operations.
#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    /// Append one record
    async fn append(&self, record: &ActionRecord) -> RepoResult<()>;

    /// Find a record by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<ActionRecord>>;

    /// List records matching the query, newest first
    async fn list(&self, query: AuditQuery) -> RepoResult<Vec<ActionRecord>>;
}
