//! Pending action entity <-> model mapper

use warden_core::entities::{PendingAction, PendingStatus, RiskTier};
use warden_core::error::DomainError;
use warden_core::value_objects::Snowflake;

use crate::models::PendingActionModel;

/// Convert a database row into the domain entity
///
/// The tier/status columns carry CHECK constraints, so a parse failure here
/// means the row was written outside the engine; it is surfaced as an
/// internal error instead of being coerced into a default state.
pub fn pending_action_from_model(model: PendingActionModel) -> Result<PendingAction, DomainError> {
    let tier = RiskTier::parse(&model.tier).map_err(|_| {
        DomainError::InternalError(format!(
            "pending action {} has unrecognized tier '{}'",
            model.id, model.tier
        ))
    })?;
    let status = PendingStatus::parse(&model.status).map_err(|_| {
        DomainError::InternalError(format!(
            "pending action {} has unrecognized status '{}'",
            model.id, model.status
        ))
    })?;

    Ok(PendingAction {
        id: Snowflake::new(model.id),
        actor_id: Snowflake::new(model.actor_id),
        action_type: model.action_type,
        tier,
        payload: model.payload,
        justification: model.justification,
        target_table: model.target_table,
        target_id: model.target_id.map(Snowflake::new),
        affected_users_count: model.affected_users_count,
        status,
        scheduled_for: model.scheduled_for,
        created_at: model.created_at,
        executed_at: model.executed_at,
        cancelled_at: model.cancelled_at,
        cancelled_reason: model.cancelled_reason,
    })
}

impl TryFrom<PendingActionModel> for PendingAction {
    type Error = DomainError;

    fn try_from(model: PendingActionModel) -> Result<Self, Self::Error> {
        pending_action_from_model(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn sample_model() -> PendingActionModel {
        PendingActionModel {
            id: 1,
            actor_id: 100,
            action_type: "delete_user".to_string(),
            tier: "dangerous".to_string(),
            payload: json!({"user_id": "200"}),
            justification: "duplicate account".to_string(),
            target_table: Some("users".to_string()),
            target_id: Some(200),
            affected_users_count: 1,
            status: "pending".to_string(),
            scheduled_for: Utc::now(),
            created_at: Utc::now(),
            executed_at: None,
            cancelled_at: None,
            cancelled_reason: None,
        }
    }

    #[test]
    fn test_model_to_entity() {
        let action = pending_action_from_model(sample_model()).unwrap();
        assert_eq!(action.id, Snowflake::new(1));
        assert_eq!(action.tier, RiskTier::Dangerous);
        assert_eq!(action.status, PendingStatus::Pending);
        assert_eq!(action.target_id, Some(Snowflake::new(200)));
    }

    #[test]
    fn test_unrecognized_status_is_rejected() {
        let mut model = sample_model();
        model.status = "held".to_string();
        assert!(pending_action_from_model(model).is_err());
    }

    #[test]
    fn test_unrecognized_tier_is_rejected() {
        let mut model = sample_model();
        model.tier = "catastrophic".to_string();
        assert!(pending_action_from_model(model).is_err());
    }
}
