//! Privileged action handlers
//!
//! Endpoints for requesting actions, inspecting the hold queue, and
//! cancelling pending actions.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use warden_service::{
    ActionOutcomeResponse, CancelActionRequest, GovernanceService, PendingActionResponse,
    RequestActionRequest,
};

use crate::extractors::{ActionIdPath, AuthActor, ValidatedJson};
use crate::response::{Accepted, ApiResult};
use crate::state::AppState;

/// Request execution of a privileged action
///
/// POST /actions
///
/// Safe/risky actions come back 200 with the execution result; dangerous
/// actions come back 202 with the pending handle.
pub async fn request_action(
    State(state): State<AppState>,
    auth: AuthActor,
    ValidatedJson(request): ValidatedJson<RequestActionRequest>,
) -> ApiResult<Response> {
    let service = GovernanceService::new(state.service_context());
    let outcome = service
        .request(auth.actor_id, auth.permissions, request)
        .await?;

    Ok(match outcome {
        executed @ ActionOutcomeResponse::Executed { .. } => Json(executed).into_response(),
        scheduled @ ActionOutcomeResponse::Scheduled { .. } => {
            Accepted(Json(scheduled)).into_response()
        }
    })
}

/// List pending actions
///
/// GET /actions/pending
pub async fn list_pending(
    State(state): State<AppState>,
    auth: AuthActor,
) -> ApiResult<Json<Vec<PendingActionResponse>>> {
    let service = GovernanceService::new(state.service_context());
    let actions = service.list(auth.actor_id, auth.permissions).await?;
    Ok(Json(actions))
}

/// Get one pending action
///
/// GET /actions/pending/{action_id}
pub async fn get_pending(
    State(state): State<AppState>,
    auth: AuthActor,
    Path(path): Path<ActionIdPath>,
) -> ApiResult<Json<PendingActionResponse>> {
    let action_id = path.action_id()?;

    let service = GovernanceService::new(state.service_context());
    let action = service.get(auth.actor_id, auth.permissions, action_id).await?;
    Ok(Json(action))
}

/// Cancel a pending action inside its hold window
///
/// POST /actions/pending/{action_id}/cancel
pub async fn cancel_action(
    State(state): State<AppState>,
    auth: AuthActor,
    Path(path): Path<ActionIdPath>,
    ValidatedJson(request): ValidatedJson<CancelActionRequest>,
) -> ApiResult<Json<PendingActionResponse>> {
    let action_id = path.action_id()?;

    let service = GovernanceService::new(state.service_context());
    let action = service
        .cancel(auth.actor_id, auth.permissions, action_id, request)
        .await?;
    Ok(Json(action))
}
