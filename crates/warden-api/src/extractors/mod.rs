//! Axum extractors for request handling
//!
//! Custom extractors for authentication, validation, and pagination.

mod auth;
mod pagination;
mod path;
mod validated;

pub use auth::AuthActor;
pub use pagination::{Pagination, PaginationParams};
pub use path::{ActionIdPath, RecordIdPath};
pub use validated::ValidatedJson;
