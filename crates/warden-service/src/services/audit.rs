//! Audit query service
//!
//! Read-only access to the append-only action record log. Writes happen in
//! the governance facade and the scheduler; this service only pages through
//! history for the UI and for reporting.

use tracing::instrument;

use warden_core::error::DomainError;
use warden_core::traits::AuditQuery;
use warden_core::value_objects::{Permissions, Snowflake};

use crate::dto::{ActionRecordResponse, AuditListParams};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Default page size for audit listings
const DEFAULT_AUDIT_LIMIT: i64 = 50;
/// Maximum page size for audit listings
const MAX_AUDIT_LIMIT: i64 = 100;

/// Audit log query service
pub struct AuditService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AuditService<'a> {
    /// Create a new AuditService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// List audit records, newest first, with cursor pagination
    ///
    /// Requires `VIEW_AUDIT`.
    #[instrument(skip(self, params))]
    pub async fn list(
        &self,
        perms: Permissions,
        params: AuditListParams,
        before: Option<Snowflake>,
        limit: Option<i64>,
    ) -> ServiceResult<Vec<ActionRecordResponse>> {
        if !perms.has(Permissions::VIEW_AUDIT) {
            return Err(ServiceError::permission_denied("VIEW_AUDIT"));
        }

        let actor_id = params
            .actor_id
            .as_deref()
            .map(|s| {
                s.parse::<Snowflake>()
                    .map_err(|_| DomainError::ValidationError("Invalid actor_id format".to_string()))
            })
            .transpose()?;

        let query = AuditQuery {
            actor_id,
            action_type: params.action_type,
            before,
            limit: limit.unwrap_or(DEFAULT_AUDIT_LIMIT).clamp(1, MAX_AUDIT_LIMIT),
        };

        let records = self.ctx.audit_repo().list(query).await?;
        Ok(records.into_iter().map(Into::into).collect())
    }

    /// Fetch one audit record
    ///
    /// Requires `VIEW_AUDIT`.
    #[instrument(skip(self))]
    pub async fn get(
        &self,
        perms: Permissions,
        record_id: Snowflake,
    ) -> ServiceResult<ActionRecordResponse> {
        if !perms.has(Permissions::VIEW_AUDIT) {
            return Err(ServiceError::permission_denied("VIEW_AUDIT"));
        }

        let record = self
            .ctx
            .audit_repo()
            .find_by_id(record_id)
            .await?
            .ok_or(DomainError::ActionRecordNotFound(record_id))?;

        Ok(record.into())
    }
}
