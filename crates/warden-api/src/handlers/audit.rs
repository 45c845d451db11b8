//! Audit log handlers
//!
//! Read-only endpoints over the append-only action record log.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use warden_service::dto::AuditListParams;
use warden_service::{ActionRecordResponse, AuditService};

use crate::extractors::{AuthActor, Pagination, RecordIdPath};
use crate::response::ApiResult;
use crate::state::AppState;

/// List audit records, newest first
///
/// GET /audit
pub async fn list_records(
    State(state): State<AppState>,
    auth: AuthActor,
    pagination: Pagination,
    Query(params): Query<AuditListParams>,
) -> ApiResult<Json<Vec<ActionRecordResponse>>> {
    let service = AuditService::new(state.service_context());
    let records = service
        .list(
            auth.permissions,
            params,
            pagination.before,
            Some(pagination.limit),
        )
        .await?;
    Ok(Json(records))
}

/// Get one audit record
///
/// GET /audit/{record_id}
pub async fn get_record(
    State(state): State<AppState>,
    auth: AuthActor,
    Path(path): Path<RecordIdPath>,
) -> ApiResult<Json<ActionRecordResponse>> {
    let record_id = path.record_id()?;

    let service = AuditService::new(state.service_context());
    let record = service.get(auth.permissions, record_id).await?;
    Ok(Json(record))
}
