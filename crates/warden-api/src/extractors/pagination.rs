//! Pagination extractor
//!
//! Extracts cursor-based pagination parameters from query strings.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::Deserialize;
use warden_core::Snowflake;

use crate::response::ApiError;

/// Default page size
const DEFAULT_LIMIT: i64 = 50;
/// Maximum page size
const MAX_LIMIT: i64 = 100;

/// Raw pagination query parameters
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    /// Get items before this ID
    #[serde(default)]
    pub before: Option<String>,
    /// Maximum number of items to return
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Validated pagination parameters
#[derive(Debug, Clone)]
pub struct Pagination {
    /// Get items before this ID
    pub before: Option<Snowflake>,
    /// Maximum number of items to return (validated to 1-100)
    pub limit: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            before: None,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl TryFrom<PaginationParams> for Pagination {
    type Error = ApiError;

    fn try_from(params: PaginationParams) -> Result<Self, Self::Error> {
        let before = params
            .before
            .map(|s| {
                s.parse::<Snowflake>()
                    .map_err(|_| ApiError::invalid_query("Invalid 'before' cursor format"))
            })
            .transpose()?;

        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

        Ok(Pagination { before, limit })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<PaginationParams>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_query(e.to_string()))?;

        Pagination::try_from(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pagination() {
        let pagination = Pagination::default();
        assert_eq!(pagination.limit, DEFAULT_LIMIT);
        assert!(pagination.before.is_none());
    }

    #[test]
    fn test_limit_clamping() {
        let params = PaginationParams {
            before: None,
            limit: Some(500),
        };
        let pagination = Pagination::try_from(params).unwrap();
        assert_eq!(pagination.limit, MAX_LIMIT);

        let params = PaginationParams {
            before: None,
            limit: Some(0),
        };
        let pagination = Pagination::try_from(params).unwrap();
        assert_eq!(pagination.limit, 1);
    }

    #[test]
    fn test_pagination_from_params() {
        let params = PaginationParams {
            before: Some("123456789".to_string()),
            limit: Some(25),
        };

        let pagination = Pagination::try_from(params).unwrap();
        assert_eq!(pagination.before, Some(Snowflake::new(123456789)));
        assert_eq!(pagination.limit, 25);
    }

    #[test]
    fn test_invalid_cursor_rejected() {
        let params = PaginationParams {
            before: Some("not-a-number".to_string()),
            limit: None,
        };
        assert!(Pagination::try_from(params).is_err());
    }
}
