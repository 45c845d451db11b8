//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.

use serde::Deserialize;
use serde_json::Value as JsonValue;
use validator::Validate;

/// Request execution of a privileged action
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RequestActionRequest {
    #[validate(length(min = 1, max = 64, message = "Action type must be 1-64 characters"))]
    pub action_type: String,

    /// Opaque data the effect handler needs
    #[serde(default)]
    pub payload: JsonValue,

    #[validate(length(max = 2000, message = "Justification must be at most 2000 characters"))]
    pub justification: Option<String>,

    /// Reauthentication proof token, when the policy demands one
    pub reauth_proof: Option<String>,

    /// Table of the affected entity
    #[validate(length(max = 64, message = "Target table must be at most 64 characters"))]
    pub target_table: Option<String>,

    /// ID of the affected entity (Snowflake as string)
    pub target_id: Option<String>,

    /// Estimated number of affected user accounts
    pub affected_users: Option<i32>,
}

/// Cancel a pending action
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CancelActionRequest {
    #[validate(length(min = 1, max = 500, message = "Reason must be 1-500 characters"))]
    pub reason: String,
}

/// Query parameters for audit listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditListParams {
    /// Filter by requesting actor (Snowflake as string)
    pub actor_id: Option<String>,
    /// Filter by action type
    pub action_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_action_validation() {
        let request = RequestActionRequest {
            action_type: "delete_user".to_string(),
            payload: serde_json::json!({}),
            justification: Some("duplicate account".to_string()),
            reauth_proof: None,
            target_table: None,
            target_id: None,
            affected_users: None,
        };
        assert!(request.validate().is_ok());

        let request = RequestActionRequest {
            action_type: String::new(),
            ..request
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_cancel_request_requires_reason() {
        let request = CancelActionRequest {
            reason: String::new(),
        };
        assert!(request.validate().is_err());

        let request = CancelActionRequest {
            reason: "mistaken request".to_string(),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_request_deserializes_without_optional_fields() {
        let request: RequestActionRequest =
            serde_json::from_str(r#"{"action_type": "edit_announcement"}"#).unwrap();
        assert_eq!(request.action_type, "edit_announcement");
        assert!(request.payload.is_null());
        assert!(request.justification.is_none());
    }
}
