//! # warden-service
//!
//! Application layer containing the governance facade, the deferred action
//! scheduler, the effect-handler registry, and DTOs.

pub mod dto;
pub mod services;

// Re-export commonly used types at crate root
pub use dto::{
    ActionOutcomeResponse, ActionRecordResponse, CancelActionRequest, HealthResponse,
    PendingActionResponse, PolicyInfo, ReadinessResponse, RequestActionRequest,
};
pub use services::{
    ActionScheduler, AuditService, EffectRegistry, GovernanceService, PgNotifyEffect,
    ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult, SweepStats,
};
