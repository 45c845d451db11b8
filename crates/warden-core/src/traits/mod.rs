//! Traits (ports) - interfaces the infrastructure layers implement

mod effects;
mod repositories;

pub use effects::{EffectError, EffectHandler, EffectOutcome};
pub use repositories::{AuditLogRepository, AuditQuery, PendingActionRepository, RepoResult};
