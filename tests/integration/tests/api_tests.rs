//! API Integration Tests
//!
//! These tests require:
//! - Running PostgreSQL instance with migrations applied
//! - Running Redis instance
//! - Environment variables: DATABASE_URL, REDIS_URL
//!
//! Run with: cargo test -p integration-tests --test api_tests
//!
//! The test servers do not spawn the background sweep, so hold windows
//! stay open for the duration of each test.

use integration_tests::{
    assert_json, assert_status, check_test_env, unique_actor, ActionRequestBody, CancelBody,
    ErrorResponse, OutcomeBody, PendingActionBody, RecordBody, TestServer,
};
use reqwest::StatusCode;
use warden_core::Permissions;

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_health_ready() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health/ready").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

// ============================================================================
// Authentication Tests
// ============================================================================

#[tokio::test]
async fn test_request_without_token_rejected() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server
        .post("/api/v1/actions", &ActionRequestBody::edit_announcement())
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

// ============================================================================
// Immediate Execution (safe/risky tiers)
// ============================================================================

#[tokio::test]
async fn test_safe_action_executes_inline() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let actor = unique_actor();
    let token = server.access_token(actor, Permissions::DEFAULT);

    let response = server
        .post_auth("/api/v1/actions", &token, &ActionRequestBody::edit_announcement())
        .await
        .unwrap();
    let outcome: OutcomeBody = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(outcome.status, "executed");
    assert!(outcome.record_id.is_some());
    assert!(outcome.pending.is_none());
    assert_eq!(outcome.policy.unwrap().tier, "safe");
}

#[tokio::test]
async fn test_risky_action_without_justification_rejected() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let actor = unique_actor();
    let token = server.access_token(actor, Permissions::DEFAULT);

    let response = server
        .post_auth(
            "/api/v1/actions",
            &token,
            &ActionRequestBody::update_fee_schedule(None),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = response.json().await.unwrap();
    assert_eq!(body.error.code, "JUSTIFICATION_REQUIRED");
}

#[tokio::test]
async fn test_unknown_action_type_uses_default_policy() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let actor = unique_actor();
    let token = server.access_token(actor, Permissions::DEFAULT);

    let mut request = ActionRequestBody::edit_announcement();
    request.action_type = "recalibrate_flux".to_string();

    // Default policy is risky: justification required first
    let response = server.post_auth("/api/v1/actions", &token, &request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = response.json().await.unwrap();
    assert_eq!(body.error.code, "JUSTIFICATION_REQUIRED");

    // With one, the deployment still has no handler for the unknown type
    request.justification = Some("trying it".to_string());
    let response = server.post_auth("/api/v1/actions", &token, &request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = response.json().await.unwrap();
    assert_eq!(body.error.code, "MISSING_EFFECT_HANDLER");
}

// ============================================================================
// Deferred Execution (dangerous tier)
// ============================================================================

#[tokio::test]
async fn test_dangerous_action_scheduled_then_cancelled() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let actor = unique_actor();
    let token = server.access_token(actor, Permissions::DEFAULT);
    let target = unique_actor();

    // Admission: 202 with the pending handle
    let response = server
        .post_auth(
            "/api/v1/actions",
            &token,
            &ActionRequestBody::delete_user(target, "duplicate account"),
        )
        .await
        .unwrap();
    let outcome: OutcomeBody = assert_json(response, StatusCode::ACCEPTED).await.unwrap();

    assert_eq!(outcome.status, "scheduled");
    let pending = outcome.pending.expect("pending handle");
    let policy = outcome.policy.expect("policy metadata");
    assert_eq!(pending.status, "pending");
    assert_eq!(pending.tier, "dangerous");
    assert_eq!(policy.delay_seconds, 600);
    assert!(!policy.is_reversible);
    assert!(policy.warning.is_some());

    // The handle is visible to its owner
    let response = server
        .get_auth(&format!("/api/v1/actions/pending/{}", pending.id), &token)
        .await
        .unwrap();
    let fetched: PendingActionBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(fetched.id, pending.id);

    // Cancel inside the window
    let response = server
        .post_auth(
            &format!("/api/v1/actions/pending/{}/cancel", pending.id),
            &token,
            &CancelBody::new("mistaken request"),
        )
        .await
        .unwrap();
    let cancelled: PendingActionBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(cancelled.status, "cancelled");
    assert_eq!(cancelled.cancelled_reason.as_deref(), Some("mistaken request"));
    assert!(cancelled.cancelled_at.is_some());

    // A second cancel is a conflict, not a second resolution
    let response = server
        .post_auth(
            &format!("/api/v1/actions/pending/{}/cancel", pending.id),
            &token,
            &CancelBody::new("again"),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: ErrorResponse = response.json().await.unwrap();
    assert_eq!(body.error.code, "INVALID_ACTION_STATE");

    // Both lifecycle records are on the audit trail
    let auditor_token = server.access_token(unique_actor(), Permissions::ALL);
    let response = server
        .get_auth(&format!("/api/v1/audit?actor_id={}", actor), &auditor_token)
        .await
        .unwrap();
    let records: Vec<RecordBody> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].metadata["phase"], "resolution");
    assert_eq!(records[0].metadata["outcome"], "cancelled");
    assert_eq!(records[1].metadata["phase"], "admission");
}

#[tokio::test]
async fn test_cancel_by_stranger_forbidden() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let actor = unique_actor();
    let token = server.access_token(actor, Permissions::DEFAULT);

    let response = server
        .post_auth(
            "/api/v1/actions",
            &token,
            &ActionRequestBody::delete_user(unique_actor(), "cleanup"),
        )
        .await
        .unwrap();
    let outcome: OutcomeBody = assert_json(response, StatusCode::ACCEPTED).await.unwrap();
    let pending = outcome.pending.unwrap();

    // A different actor without CANCEL_ANY is refused
    let stranger_token = server.access_token(unique_actor(), Permissions::DEFAULT);
    let response = server
        .post_auth(
            &format!("/api/v1/actions/pending/{}/cancel", pending.id),
            &stranger_token,
            &CancelBody::new("not mine"),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();

    // A supervisor with CANCEL_ANY succeeds
    let supervisor_token =
        server.access_token(unique_actor(), Permissions::DEFAULT | Permissions::CANCEL_ANY);
    let response = server
        .post_auth(
            &format!("/api/v1/actions/pending/{}/cancel", pending.id),
            &supervisor_token,
            &CancelBody::new("supervisor override"),
        )
        .await
        .unwrap();
    let cancelled: PendingActionBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(cancelled.status, "cancelled");
}

// ============================================================================
// Reauthentication
// ============================================================================

#[tokio::test]
async fn test_reauth_gated_action_requires_proof() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let actor = unique_actor();
    let token = server.access_token(actor, Permissions::DEFAULT);

    // Without a proof: rejected before any state exists
    let response = server
        .post_auth(
            "/api/v1/actions",
            &token,
            &ActionRequestBody::system_freeze("incident response", None),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: ErrorResponse = response.json().await.unwrap();
    assert_eq!(body.error.code, "REAUTHENTICATION_REQUIRED");

    // No pending action was admitted
    let response = server.get_auth("/api/v1/actions/pending", &token).await.unwrap();
    let pending: Vec<PendingActionBody> = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(pending.is_empty());

    // With a fresh proof: admitted
    let proof = server.reauth_proof(actor);
    let response = server
        .post_auth(
            "/api/v1/actions",
            &token,
            &ActionRequestBody::system_freeze("incident response", Some(proof.clone())),
        )
        .await
        .unwrap();
    let outcome: OutcomeBody = assert_json(response, StatusCode::ACCEPTED).await.unwrap();
    assert_eq!(outcome.policy.unwrap().delay_seconds, 300);

    // The same proof cannot admit a second action
    let response = server
        .post_auth(
            "/api/v1/actions",
            &token,
            &ActionRequestBody::system_freeze("second attempt", Some(proof)),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: ErrorResponse = response.json().await.unwrap();
    assert_eq!(body.error.code, "REAUTHENTICATION_REQUIRED");
}

// ============================================================================
// Audit Access
// ============================================================================

#[tokio::test]
async fn test_audit_requires_view_permission() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let token = server.access_token(unique_actor(), Permissions::DEFAULT);

    let response = server.get_auth("/api/v1/audit", &token).await.unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();
}

#[tokio::test]
async fn test_audit_record_fetch() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let actor = unique_actor();
    let token = server.access_token(actor, Permissions::DEFAULT);

    let response = server
        .post_auth("/api/v1/actions", &token, &ActionRequestBody::edit_announcement())
        .await
        .unwrap();
    let outcome: OutcomeBody = assert_json(response, StatusCode::OK).await.unwrap();
    let record_id = outcome.record_id.unwrap();

    let auditor_token = server.access_token(unique_actor(), Permissions::DEFAULT | Permissions::VIEW_AUDIT);
    let response = server
        .get_auth(&format!("/api/v1/audit/{}", record_id), &auditor_token)
        .await
        .unwrap();
    let record: RecordBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(record.id, record_id);
    assert_eq!(record.action_type, "edit_announcement");
    assert_eq!(record.actor_id, actor.to_string());
}
