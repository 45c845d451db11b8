//! Deferred action scheduler
//!
//! A recurring sweep selects pending actions whose hold window has elapsed
//! and settles each one: claim-and-execute, or expire when the row sat
//! unclaimed past the grace period (scheduler downtime must not release a
//! stale dangerous action).
//!
//! The claim is the conditional `pending -> executed` update in the
//! repository; losing it to a concurrent cancel is normal operation, not an
//! error. Claim writes are retried with backoff on transient storage
//! failures. Effects are never retried: once a claim lands, the effect runs
//! exactly once and its failure is recorded, not replayed.

use chrono::{Duration, Utc};
use serde_json::json;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

use warden_core::entities::{ActionRecord, PendingAction};
use warden_core::error::DomainError;
use warden_core::traits::RepoResult;

use super::context::ServiceContext;

/// Rows examined per sweep pass
const SWEEP_BATCH_SIZE: i64 = 200;

/// Counters for one sweep pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Due rows examined
    pub due: usize,
    /// Claimed and effect ran successfully
    pub executed: usize,
    /// Claimed but the effect reported a failure
    pub effect_failed: usize,
    /// Marked expired past the grace period
    pub expired: usize,
    /// Lost the claim to a concurrent transition
    pub contested: usize,
    /// Storage errors that exhausted the claim retries
    pub errored: usize,
}

impl SweepStats {
    fn is_empty(&self) -> bool {
        self.due == 0
    }
}

enum RowOutcome {
    Executed,
    EffectFailed,
    Expired,
    Contested,
    Errored,
}

/// Background scheduler owning the tier-3 lifecycle after admission
pub struct ActionScheduler {
    ctx: Arc<ServiceContext>,
}

impl ActionScheduler {
    /// Create a new scheduler over the shared service context
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Spawn the recurring sweep task
    ///
    /// Runs until the process exits. Scheduler state lives entirely in the
    /// database, so a restart resumes where the last process left off.
    pub fn spawn(self) -> JoinHandle<()> {
        let interval_secs = self.ctx.governance().sweep_interval_secs.max(1);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            info!(interval_secs, "Deferred action sweep started");
            loop {
                ticker.tick().await;
                let stats = self.sweep().await;
                if !stats.is_empty() {
                    info!(
                        due = stats.due,
                        executed = stats.executed,
                        effect_failed = stats.effect_failed,
                        expired = stats.expired,
                        contested = stats.contested,
                        errored = stats.errored,
                        "Sweep pass complete"
                    );
                }
            }
        })
    }

    /// Run one sweep pass over all due rows
    ///
    /// Rows are settled concurrently and independently: one row's effect
    /// failure never blocks or rolls back another row.
    #[instrument(skip(self))]
    pub async fn sweep(&self) -> SweepStats {
        let now = Utc::now();

        let due = match self.ctx.pending_repo().find_due(now, SWEEP_BATCH_SIZE).await {
            Ok(due) => due,
            Err(e) => {
                error!(error = %e, "Sweep query failed");
                return SweepStats::default();
            }
        };

        let mut stats = SweepStats {
            due: due.len(),
            ..SweepStats::default()
        };

        let outcomes =
            futures::future::join_all(due.into_iter().map(|action| self.settle(action))).await;

        for outcome in outcomes {
            match outcome {
                RowOutcome::Executed => stats.executed += 1,
                RowOutcome::EffectFailed => stats.effect_failed += 1,
                RowOutcome::Expired => stats.expired += 1,
                RowOutcome::Contested => stats.contested += 1,
                RowOutcome::Errored => stats.errored += 1,
            }
        }

        stats
    }

    /// Settle one due row: expire it or claim-and-execute it
    async fn settle(&self, action: PendingAction) -> RowOutcome {
        let now = Utc::now();
        let grace = Duration::seconds(self.ctx.governance().expiry_grace_secs);

        if action.is_past_grace(now, grace) {
            self.expire(action, now).await
        } else {
            self.claim_and_execute(action, now).await
        }
    }

    /// Expire a row that outlived the grace period without a claim
    async fn expire(&self, action: PendingAction, now: chrono::DateTime<Utc>) -> RowOutcome {
        let expired = match self
            .with_claim_retry(|| self.ctx.pending_repo().mark_expired(action.id, now))
            .await
        {
            Ok(expired) => expired,
            Err(e) => {
                error!(pending_action_id = %action.id, error = %e, "Expiry write failed");
                return RowOutcome::Errored;
            }
        };

        if !expired {
            return RowOutcome::Contested;
        }

        warn!(
            pending_action_id = %action.id,
            action_type = %action.action_type,
            scheduled_for = %action.scheduled_for,
            "Expired unclaimed dangerous action past grace period"
        );

        self.append_resolution(
            &action,
            json!({
                "phase": "resolution",
                "pending_action_id": action.id,
                "outcome": "expired",
                "scheduled_for": action.scheduled_for,
                "expired_at": now,
            }),
        )
        .await;

        RowOutcome::Expired
    }

    /// Claim a due row and run its effect
    async fn claim_and_execute(&self, action: PendingAction, now: chrono::DateTime<Utc>) -> RowOutcome {
        let claimed = match self
            .with_claim_retry(|| self.ctx.pending_repo().claim_for_execution(action.id, now))
            .await
        {
            Ok(claimed) => claimed,
            Err(e) => {
                error!(pending_action_id = %action.id, error = %e, "Claim write failed");
                return RowOutcome::Errored;
            }
        };

        if !claimed {
            // A cancel (or another sweep worker) got there first.
            return RowOutcome::Contested;
        }

        // The claim has landed: the action is released for execution. From
        // here the row stays `executed` whatever the effect reports, and
        // the effect itself is attempted exactly once.
        let result = match self.ctx.effects().get(&action.action_type) {
            Some(handler) => handler.execute(&action.payload).await,
            None => Err(warden_core::traits::EffectError::Failed(format!(
                "no effect handler registered for '{}'",
                action.action_type
            ))),
        };

        match result {
            Ok(outcome) => {
                info!(
                    pending_action_id = %action.id,
                    action_type = %action.action_type,
                    affected_users = outcome.affected_users,
                    "Executed deferred action"
                );
                self.append_resolution(
                    &action,
                    json!({
                        "phase": "resolution",
                        "pending_action_id": action.id,
                        "outcome": "executed",
                        "effect": outcome,
                    }),
                )
                .await;
                RowOutcome::Executed
            }
            Err(e) => {
                // Surfaced to monitoring via the audit trail and logs; a
                // dangerous action is never silently re-attempted.
                error!(
                    pending_action_id = %action.id,
                    action_type = %action.action_type,
                    error = %e,
                    "Deferred effect failed after claim"
                );
                self.append_resolution(
                    &action,
                    json!({
                        "phase": "resolution",
                        "pending_action_id": action.id,
                        "outcome": "executed",
                        "effect_failed": true,
                        "error": e.to_string(),
                    }),
                )
                .await;
                RowOutcome::EffectFailed
            }
        }
    }

    /// Append the resolution record for a settled action
    ///
    /// Attribution stays with the requesting actor; who or what resolved it
    /// is in the metadata.
    async fn append_resolution(&self, action: &PendingAction, metadata: serde_json::Value) {
        let mut record = ActionRecord::new(self.ctx.generate_id(), action.actor_id, &action.action_type)
            .with_metadata(metadata);
        if let (Some(table), Some(id)) = (action.target_table.as_deref(), action.target_id) {
            record = record.with_target(table, id);
        }

        if let Err(e) = self.ctx.audit_repo().append(&record).await {
            error!(
                pending_action_id = %action.id,
                error = %e,
                "Failed to append resolution record"
            );
        }
    }

    /// Retry a conditional transition on transient storage errors
    ///
    /// Only the status-guarded write is retried. `Ok(false)` (a lost race)
    /// passes through untouched: contention is an answer, not a failure.
    async fn with_claim_retry<F, Fut>(&self, op: F) -> RepoResult<bool>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = RepoResult<bool>>,
    {
        let attempts = self.ctx.governance().claim_attempts.max(1);
        let backoff = std::time::Duration::from_millis(self.ctx.governance().claim_backoff_ms);

        let mut last_err = None;
        for attempt in 1..=attempts {
            match op().await {
                Ok(result) => return Ok(result),
                Err(DomainError::DatabaseError(msg)) => {
                    warn!(attempt, error = %msg, "Transient claim failure, backing off");
                    last_err = Some(DomainError::DatabaseError(msg));
                    if attempt < attempts {
                        tokio::time::sleep(backoff * attempt).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_err.unwrap_or_else(|| DomainError::InternalError("claim retry underflow".to_string())))
    }
}

impl std::fmt::Debug for ActionScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionScheduler")
            .field("ctx", &self.ctx)
            .finish()
    }
}
