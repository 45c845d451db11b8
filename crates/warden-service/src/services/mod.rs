//! Business logic services
//!
//! This module contains the service layer implementations: the governance
//! facade, the deferred action scheduler, the effect registry, and the
//! audit query service.

pub mod audit;
pub mod context;
pub mod effects;
pub mod error;
pub mod governance;
pub mod scheduler;

// Re-export all services for convenience
pub use audit::AuditService;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use effects::{EffectRegistry, PgNotifyEffect};
pub use error::{ServiceError, ServiceResult};
pub use governance::GovernanceService;
pub use scheduler::{ActionScheduler, SweepStats};
