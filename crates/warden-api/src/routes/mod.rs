//! Route definitions
//!
//! All API routes organized by domain and mounted under /api/v1.

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{actions, audit, health};
use crate::state::AppState;

/// Create the main API router with all routes (excluding health for separate middleware handling)
pub fn create_router() -> Router<AppState> {
    Router::new()
        // API v1 endpoints
        .nest("/api/v1", api_v1_routes())
}

/// Health check routes (exported separately to bypass rate limiting)
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

/// API v1 routes
fn api_v1_routes() -> Router<AppState> {
    Router::new().merge(action_routes()).merge(audit_routes())
}

/// Governance action routes
fn action_routes() -> Router<AppState> {
    Router::new()
        .route("/actions", post(actions::request_action))
        .route("/actions/pending", get(actions::list_pending))
        .route("/actions/pending/:action_id", get(actions::get_pending))
        .route("/actions/pending/:action_id/cancel", post(actions::cancel_action))
}

/// Audit log routes
fn audit_routes() -> Router<AppState> {
    Router::new()
        .route("/audit", get(audit::list_records))
        .route("/audit/:record_id", get(audit::get_record))
}
