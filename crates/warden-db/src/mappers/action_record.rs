//! Action record entity <-> model mapper

use serde_json::Value as JsonValue;
use warden_core::entities::ActionRecord;
use warden_core::value_objects::Snowflake;

use crate::models::ActionRecordModel;

/// Convert ActionRecordModel to ActionRecord entity
impl From<ActionRecordModel> for ActionRecord {
    fn from(model: ActionRecordModel) -> Self {
        ActionRecord {
            id: Snowflake::new(model.id),
            actor_id: Snowflake::new(model.actor_id),
            action_type: model.action_type,
            target_table: model.target_table,
            target_id: model.target_id.map(Snowflake::new),
            metadata: model.metadata.unwrap_or(JsonValue::Null),
            created_at: model.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn test_model_to_entity() {
        let model = ActionRecordModel {
            id: 1,
            actor_id: 100,
            action_type: "system_freeze".to_string(),
            target_table: None,
            target_id: None,
            metadata: Some(json!({"phase": "admission"})),
            created_at: Utc::now(),
        };

        let record = ActionRecord::from(model);
        assert_eq!(record.id, Snowflake::new(1));
        assert_eq!(record.metadata["phase"], "admission");
    }

    #[test]
    fn test_null_metadata_maps_to_json_null() {
        let model = ActionRecordModel {
            id: 2,
            actor_id: 100,
            action_type: "edit_announcement".to_string(),
            target_table: None,
            target_id: None,
            metadata: None,
            created_at: Utc::now(),
        };

        let record = ActionRecord::from(model);
        assert!(record.metadata.is_null());
    }
}
