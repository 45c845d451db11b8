//! Domain errors - error types for the governance engine

use thiserror::Error;

use crate::entities::PendingStatus;
use crate::value_objects::Snowflake;

/// Domain layer errors
///
/// Every failure surfaces as a specific kind, never a bare boolean, so the
/// caller can distinguish "missing justification" from "someone else already
/// resolved this".
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Pending action not found: {0}")]
    PendingActionNotFound(Snowflake),

    #[error("Audit record not found: {0}")]
    ActionRecordNotFound(Snowflake),

    // =========================================================================
    // Validation / Precondition Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Action '{0}' requires a justification")]
    JustificationRequired(String),

    #[error("Action '{0}' requires fresh reauthentication")]
    ReauthenticationRequired(String),

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Missing permission: {0}")]
    MissingPermission(String),

    #[error("Only the requesting actor may cancel this action")]
    NotActionOwner,

    // =========================================================================
    // State Machine Conflicts
    // =========================================================================
    /// Attempted transition out of a state that does not allow it: the
    /// cancel/execute race loser, a double cancel, or a cancel after the
    /// window closed.
    #[error("Pending action {id} is not eligible for this transition (status: {status})")]
    InvalidState { id: Snowflake, status: PendingStatus },

    // =========================================================================
    // Effect Execution
    // =========================================================================
    #[error("Effect for '{action_type}' failed: {reason}")]
    EffectFailed { action_type: String, reason: String },

    #[error("No effect handler registered for action type '{0}'")]
    HandlerMissing(String),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::PendingActionNotFound(_) => "UNKNOWN_PENDING_ACTION",
            Self::ActionRecordNotFound(_) => "UNKNOWN_AUDIT_RECORD",

            // Validation / Preconditions
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::JustificationRequired(_) => "JUSTIFICATION_REQUIRED",
            Self::ReauthenticationRequired(_) => "REAUTHENTICATION_REQUIRED",

            // Authorization
            Self::MissingPermission(_) => "MISSING_PERMISSIONS",
            Self::NotActionOwner => "NOT_ACTION_OWNER",

            // Conflict
            Self::InvalidState { .. } => "INVALID_ACTION_STATE",

            // Effects
            Self::EffectFailed { .. } => "EFFECT_FAILED",
            Self::HandlerMissing(_) => "MISSING_EFFECT_HANDLER",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::PendingActionNotFound(_) | Self::ActionRecordNotFound(_)
        )
    }

    /// Check if this is a validation or precondition error
    ///
    /// A missing handler counts: the deployment does not support that
    /// action type, which is the caller's problem, not an engine fault.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_) | Self::JustificationRequired(_) | Self::HandlerMissing(_)
        )
    }

    /// Check if this is an authentication error (fresh proof missing)
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::ReauthenticationRequired(_))
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::MissingPermission(_) | Self::NotActionOwner)
    }

    /// Check if this is a state conflict (recoverable by re-fetching)
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::InvalidState { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = DomainError::PendingActionNotFound(Snowflake::new(1));
        assert_eq!(err.code(), "UNKNOWN_PENDING_ACTION");

        let err = DomainError::JustificationRequired("delete_user".to_string());
        assert_eq!(err.code(), "JUSTIFICATION_REQUIRED");

        let err = DomainError::InvalidState {
            id: Snowflake::new(1),
            status: PendingStatus::Executed,
        };
        assert_eq!(err.code(), "INVALID_ACTION_STATE");
    }

    #[test]
    fn test_classification_helpers() {
        assert!(DomainError::PendingActionNotFound(Snowflake::new(1)).is_not_found());
        assert!(DomainError::JustificationRequired("x".to_string()).is_validation());
        assert!(DomainError::ReauthenticationRequired("x".to_string()).is_authentication());
        assert!(DomainError::MissingPermission("VIEW_AUDIT".to_string()).is_authorization());
        assert!(DomainError::InvalidState {
            id: Snowflake::new(1),
            status: PendingStatus::Cancelled,
        }
        .is_conflict());
        assert!(!DomainError::DatabaseError("x".to_string()).is_conflict());
    }

    #[test]
    fn test_error_display() {
        let err = DomainError::InvalidState {
            id: Snowflake::new(42),
            status: PendingStatus::Executed,
        };
        assert_eq!(
            err.to_string(),
            "Pending action 42 is not eligible for this transition (status: executed)"
        );

        let err = DomainError::EffectFailed {
            action_type: "delete_user".to_string(),
            reason: "downstream timeout".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Effect for 'delete_user' failed: downstream timeout"
        );
    }
}
