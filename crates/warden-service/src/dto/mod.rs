//! Data transfer objects for the API surface

mod requests;
mod responses;

pub use requests::{AuditListParams, CancelActionRequest, RequestActionRequest};
pub use responses::{
    ActionOutcomeResponse, ActionRecordResponse, HealthResponse, PendingActionResponse,
    PolicyInfo, ReadinessResponse,
};
