//! Path parameter extractors
//!
//! Type-safe extraction of Snowflake IDs from path parameters.

use warden_core::Snowflake;

use crate::response::ApiError;

/// Path parameters with action_id
#[derive(Debug, serde::Deserialize)]
pub struct ActionIdPath {
    pub action_id: String,
}

impl ActionIdPath {
    /// Parse action_id as Snowflake
    pub fn action_id(&self) -> Result<Snowflake, ApiError> {
        self.action_id
            .parse()
            .map_err(|_| ApiError::invalid_path("Invalid action_id format"))
    }
}

/// Path parameters with record_id
#[derive(Debug, serde::Deserialize)]
pub struct RecordIdPath {
    pub record_id: String,
}

impl RecordIdPath {
    /// Parse record_id as Snowflake
    pub fn record_id(&self) -> Result<Snowflake, ApiError> {
        self.record_id
            .parse()
            .map_err(|_| ApiError::invalid_path("Invalid record_id format"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_id_parsing() {
        let path = ActionIdPath {
            action_id: "123456".to_string(),
        };
        assert_eq!(path.action_id().unwrap(), Snowflake::new(123456));

        let path = ActionIdPath {
            action_id: "abc".to_string(),
        };
        assert!(path.action_id().is_err());
    }
}
