//! # warden-api
//!
//! REST API server for the action governance engine, built with Axum.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

// Re-export the server entry points for embedding and tests
pub use server::{create_app, create_app_state, run, spawn_scheduler};
pub use state::AppState;
