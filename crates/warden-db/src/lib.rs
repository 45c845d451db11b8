//! # warden-db
//!
//! Database layer implementing the governance repository traits with
//! PostgreSQL via SQLx.
//!
//! ## Overview
//!
//! This crate provides PostgreSQL implementations for the repository traits
//! defined in `warden-core`. It handles:
//!
//! - Connection pool management
//! - Database models with SQLx `FromRow` derives
//! - Entity ↔ Model mappers
//! - Repository implementations, including the status-guarded conditional
//!   updates that resolve the cancel/execute race
//!
//! ## Usage
//!
//! ```rust,ignore
//! use warden_db::pool::{create_pool, DatabaseConfig};
//! use warden_db::PgPendingActionRepository;
//! use warden_core::traits::PendingActionRepository;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::from_env();
//!     let pool = create_pool(&config).await?;
//!     let repo = PgPendingActionRepository::new(pool);
//!
//!     // Use the repository...
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, create_pool_from_env, DatabaseConfig, PgPool};
pub use repositories::{PgAuditLogRepository, PgPendingActionRepository};
