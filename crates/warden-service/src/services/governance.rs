//! Governance facade
//!
//! The single entry point for privileged action requests. Classifies the
//! action, enforces justification and reauthentication preconditions, then
//! either executes immediately (safe/risky) or admits the action into the
//! deferred scheduler (dangerous). Every path that takes effect writes to
//! the audit log.

use chrono::Utc;
use serde_json::json;
use tracing::{info, instrument, warn};

use warden_core::entities::{ActionRecord, PendingAction};
use warden_core::error::DomainError;
use warden_core::value_objects::{Permissions, Snowflake};

use crate::dto::{
    ActionOutcomeResponse, CancelActionRequest, PendingActionResponse, PolicyInfo,
    RequestActionRequest,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Default page size for pending action listings
const DEFAULT_LIST_LIMIT: i64 = 100;

/// Governance facade service
pub struct GovernanceService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> GovernanceService<'a> {
    /// Create a new GovernanceService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Request execution of a privileged action
    ///
    /// Safe/risky tiers execute synchronously and return `Executed`;
    /// dangerous tiers are admitted into the hold window and return
    /// `Scheduled` with the pending handle.
    #[instrument(skip(self, request), fields(action_type = %request.action_type))]
    pub async fn request(
        &self,
        actor_id: Snowflake,
        perms: Permissions,
        request: RequestActionRequest,
    ) -> ServiceResult<ActionOutcomeResponse> {
        if !perms.has(Permissions::REQUEST_ACTIONS) {
            return Err(ServiceError::permission_denied("REQUEST_ACTIONS"));
        }

        let policy = self.ctx.policies().classify(&request.action_type).clone();
        let justification = request
            .justification
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string();

        // Precondition checks come before any state is admitted: a failure
        // here leaves nothing behind, not even an audit record.
        if policy.requires_justification && justification.is_empty() {
            return Err(DomainError::JustificationRequired(request.action_type).into());
        }

        if policy.requires_reauthentication {
            self.consume_reauth_proof(actor_id, &request).await?;
        }

        let target_id = request
            .target_id
            .as_deref()
            .map(|s| {
                s.parse::<Snowflake>()
                    .map_err(|_| DomainError::ValidationError("Invalid target_id format".to_string()))
            })
            .transpose()?;

        if policy.is_deferred() {
            self.admit_deferred(actor_id, &request, justification, target_id, &policy)
                .await
        } else {
            self.execute_immediate(actor_id, &request, justification, target_id, &policy)
                .await
        }
    }

    /// Validate and consume the reauthentication proof for this admission
    async fn consume_reauth_proof(
        &self,
        actor_id: Snowflake,
        request: &RequestActionRequest,
    ) -> ServiceResult<()> {
        let proof = request
            .reauth_proof
            .as_deref()
            .ok_or_else(|| DomainError::ReauthenticationRequired(request.action_type.clone()))?;

        let claims = self
            .ctx
            .verifier()
            .validate_reauth_proof(proof, actor_id)
            .map_err(|e| {
                warn!(actor_id = %actor_id, error = %e, "Rejected reauth proof");
                DomainError::ReauthenticationRequired(request.action_type.clone())
            })?;

        // A proof admits exactly one action; replays lose here.
        let proof_id = claims
            .jti
            .ok_or_else(|| DomainError::ReauthenticationRequired(request.action_type.clone()))?;
        let first_use = self
            .ctx
            .reauth_store()
            .consume(&proof_id, actor_id)
            .await
            .map_err(|e| DomainError::CacheError(e.to_string()))?;

        if !first_use {
            return Err(DomainError::ReauthenticationRequired(request.action_type.clone()).into());
        }

        Ok(())
    }

    /// Execute a safe/risky action synchronously on the request path
    async fn execute_immediate(
        &self,
        actor_id: Snowflake,
        request: &RequestActionRequest,
        justification: String,
        target_id: Option<Snowflake>,
        policy: &warden_core::entities::TierPolicy,
    ) -> ServiceResult<ActionOutcomeResponse> {
        let handler = self.ctx.effects().resolve(&request.action_type)?;

        // A failed immediate attempt writes nothing: the audit log records
        // only actions that happened.
        let outcome = handler.execute(&request.payload).await.map_err(|e| {
            warn!(action_type = %request.action_type, error = %e, "Immediate effect failed");
            DomainError::EffectFailed {
                action_type: request.action_type.clone(),
                reason: e.to_string(),
            }
        })?;

        let mut metadata = json!({
            "tier": policy.tier,
            "outcome": &outcome,
        });
        if !justification.is_empty() {
            metadata["justification"] = json!(justification);
        }

        let mut record = ActionRecord::new(self.ctx.generate_id(), actor_id, &request.action_type)
            .with_metadata(metadata);
        if let (Some(table), Some(id)) = (request.target_table.as_deref(), target_id) {
            record = record.with_target(table, id);
        }
        self.ctx.audit_repo().append(&record).await?;

        info!(
            record_id = %record.id,
            actor_id = %actor_id,
            action_type = %request.action_type,
            tier = %policy.tier,
            "Executed privileged action"
        );

        Ok(ActionOutcomeResponse::Executed {
            record_id: record.id,
            action_type: request.action_type.clone(),
            outcome,
            policy: PolicyInfo::from(policy),
        })
    }

    /// Admit a dangerous action into the cancelable hold window
    async fn admit_deferred(
        &self,
        actor_id: Snowflake,
        request: &RequestActionRequest,
        justification: String,
        target_id: Option<Snowflake>,
        policy: &warden_core::entities::TierPolicy,
    ) -> ServiceResult<ActionOutcomeResponse> {
        // The facade already checked this; re-validate before a row exists
        if justification.is_empty() {
            return Err(DomainError::JustificationRequired(request.action_type.clone()).into());
        }

        let mut action = PendingAction::new(
            self.ctx.generate_id(),
            actor_id,
            &request.action_type,
            policy.tier,
            request.payload.clone(),
            justification.clone(),
            policy.delay,
        );
        if let (Some(table), Some(id)) = (request.target_table.as_deref(), target_id) {
            action = action.with_target(table, id);
        }
        if let Some(count) = request.affected_users {
            action = action.with_affected_users(count);
        }

        self.ctx.pending_repo().insert(&action).await?;

        // First of the two records a dangerous action produces: the intent.
        // The resolution record follows when the scheduler or a cancel
        // settles the outcome.
        let mut record = ActionRecord::new(self.ctx.generate_id(), actor_id, &request.action_type)
            .with_metadata(json!({
                "phase": "admission",
                "pending_action_id": action.id,
                "tier": policy.tier,
                "scheduled_for": action.scheduled_for,
                "delay_seconds": policy.delay_seconds(),
                "justification": justification,
            }));
        if let (Some(table), Some(id)) = (request.target_table.as_deref(), target_id) {
            record = record.with_target(table, id);
        }
        self.ctx.audit_repo().append(&record).await?;

        info!(
            pending_action_id = %action.id,
            actor_id = %actor_id,
            action_type = %request.action_type,
            scheduled_for = %action.scheduled_for,
            "Admitted dangerous action into hold window"
        );

        Ok(ActionOutcomeResponse::Scheduled {
            pending: action.into(),
            policy: PolicyInfo::from(policy),
        })
    }

    /// Cancel a pending action while its hold window is open
    ///
    /// Allowed for the requesting actor, or any principal holding
    /// `CANCEL_ANY`. Exactly one of a concurrent cancel/claim pair wins;
    /// the loser surfaces the conflict.
    #[instrument(skip(self, request))]
    pub async fn cancel(
        &self,
        actor_id: Snowflake,
        perms: Permissions,
        action_id: Snowflake,
        request: CancelActionRequest,
    ) -> ServiceResult<PendingActionResponse> {
        let action = self
            .ctx
            .pending_repo()
            .find_by_id(action_id)
            .await?
            .ok_or(DomainError::PendingActionNotFound(action_id))?;

        if action.actor_id != actor_id && !perms.has(Permissions::CANCEL_ANY) {
            return Err(DomainError::NotActionOwner.into());
        }

        let reason = request.reason.trim();
        if reason.is_empty() {
            return Err(DomainError::ValidationError("Cancellation reason is required".to_string()).into());
        }

        let now = Utc::now();
        let cancelled = self.ctx.pending_repo().cancel(action_id, reason, now).await?;
        if !cancelled {
            // Lost to the sweep, a concurrent cancel, or the window closed.
            let current = self
                .ctx
                .pending_repo()
                .find_by_id(action_id)
                .await?
                .ok_or(DomainError::PendingActionNotFound(action_id))?;
            return Err(DomainError::InvalidState {
                id: action_id,
                status: current.status,
            }
            .into());
        }

        let record = ActionRecord::new(self.ctx.generate_id(), actor_id, &action.action_type)
            .with_metadata(json!({
                "phase": "resolution",
                "pending_action_id": action_id,
                "outcome": "cancelled",
                "reason": reason,
                "requested_by": action.actor_id,
            }));
        self.ctx.audit_repo().append(&record).await?;

        info!(
            pending_action_id = %action_id,
            cancelled_by = %actor_id,
            reason = %reason,
            "Cancelled pending action"
        );

        let updated = self
            .ctx
            .pending_repo()
            .find_by_id(action_id)
            .await?
            .ok_or(DomainError::PendingActionNotFound(action_id))?;
        Ok(updated.into())
    }

    /// Fetch one pending action
    ///
    /// Visible to its requesting actor and to holders of `VIEW_AUDIT`.
    #[instrument(skip(self))]
    pub async fn get(
        &self,
        actor_id: Snowflake,
        perms: Permissions,
        action_id: Snowflake,
    ) -> ServiceResult<PendingActionResponse> {
        let action = self
            .ctx
            .pending_repo()
            .find_by_id(action_id)
            .await?
            .ok_or(DomainError::PendingActionNotFound(action_id))?;

        if action.actor_id != actor_id && !perms.has(Permissions::VIEW_AUDIT) {
            return Err(ServiceError::permission_denied("VIEW_AUDIT"));
        }

        Ok(action.into())
    }

    /// List pending actions
    ///
    /// Holders of `VIEW_AUDIT` see every open hold window; other actors see
    /// their own recent requests in any state.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        actor_id: Snowflake,
        perms: Permissions,
    ) -> ServiceResult<Vec<PendingActionResponse>> {
        let actions = if perms.has(Permissions::VIEW_AUDIT) {
            self.ctx.pending_repo().list_pending(DEFAULT_LIST_LIMIT).await?
        } else {
            self.ctx
                .pending_repo()
                .find_by_actor(actor_id, DEFAULT_LIST_LIMIT)
                .await?
        };

        Ok(actions.into_iter().map(Into::into).collect())
    }
}
