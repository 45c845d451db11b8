//! Server setup and initialization
//!
//! Provides the main application builder and server runner. The deferred
//! action scheduler runs inside the API process as a background task
//! started at bootstrap.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::info;
use warden_cache::{RedisPool, RedisPoolConfig};
use warden_common::{AppConfig, AppError, IdentityVerifier};
use warden_core::{PolicyRegistry, SnowflakeGenerator};
use warden_db::{create_pool, PgAuditLogRepository, PgPendingActionRepository};
use warden_service::{ActionScheduler, EffectRegistry, PgNotifyEffect, ServiceContextBuilder};

use crate::middleware::{apply_middleware, apply_middleware_with_config};
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

/// Build the Axum application with the base middleware stack
///
/// Used by tests and embedders; `run` applies the configured rate limiting
/// and CORS on top.
pub fn create_app(state: AppState) -> Router {
    let router = create_router().merge(health_routes());
    let router = apply_middleware(router);
    router.with_state(state)
}

/// Build the Axum application with rate limiting and CORS from config
pub fn create_app_with_config(state: AppState) -> Router {
    let config = state.config().clone();
    let router = apply_middleware_with_config(
        create_router(),
        &config.rate_limit,
        &config.cors,
        config.app.env.is_production(),
    );
    // Health endpoints bypass rate limiting
    let router = router.merge(apply_middleware(health_routes()));
    router.with_state(state)
}

/// Initialize all dependencies and create AppState
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    // Create database pool
    info!("Connecting to PostgreSQL...");
    let db_config = warden_db::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        min_connections: config.database.min_connections,
        ..Default::default()
    };
    let pool = create_pool(&db_config)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL connection established");

    // Create Redis pool
    info!("Connecting to Redis...");
    let redis_config = RedisPoolConfig::from(&config.redis);
    let redis_pool = RedisPool::new(redis_config).map_err(|e| AppError::Cache(e.to_string()))?;
    let shared_redis = Arc::new(redis_pool);
    info!("Redis connection established");

    // Create the identity verifier
    let verifier = Arc::new(IdentityVerifier::new(
        &config.auth.jwt_secret,
        config.auth.reauth_window_secs,
    ));

    // Create Snowflake generator
    let snowflake_generator = Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id));

    // Load the policy table and wire an effect handler per entry
    let policies = Arc::new(PolicyRegistry::builtin());
    info!(
        version = policies.version(),
        entries = policies.len(),
        "Policy registry loaded"
    );

    let mut effects = EffectRegistry::new();
    for handler in PgNotifyEffect::for_registry(&pool, &policies) {
        effects = effects.with_handler(handler);
    }

    // Create repositories
    let pending_repo = Arc::new(PgPendingActionRepository::new(pool.clone()));
    let audit_repo = Arc::new(PgAuditLogRepository::new(pool.clone()));

    // Build service context; this validates handler coverage of the policy
    // table and refuses to boot on a gap
    let service_context = ServiceContextBuilder::new()
        .pool(pool)
        .redis_pool(shared_redis)
        .pending_repo(pending_repo)
        .audit_repo(audit_repo)
        .policies(policies)
        .effects(Arc::new(effects))
        .verifier(verifier)
        .snowflake_generator(snowflake_generator)
        .governance(config.governance.clone())
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    Ok(AppState::new(service_context, config))
}

/// Start the deferred action sweep for this process
pub fn spawn_scheduler(state: &AppState) -> JoinHandle<()> {
    ActionScheduler::new(state.shared_service_context()).spawn()
}

/// Run the HTTP server
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {}: {}", addr, e)))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Config(format!("Server error: {}", e)))?;

    Ok(())
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.api.port));

    // Create app state
    let state = create_app_state(config).await?;

    // Start the sweep before accepting traffic
    let _scheduler = spawn_scheduler(&state);

    // Build application
    let app = create_app_with_config(state);

    // Run server
    run_server(app, addr).await
}
