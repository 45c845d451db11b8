//! Entity to model mappers
//!
//! Conversions between domain entities (warden-core) and database models.
//! - `TryFrom<Model> for Entity`: convert database rows to domain objects,
//!   rejecting rows whose tier/status strings do not parse
//! - `From<Model> for Entity`: for tables without enum columns

mod action_record;
mod pending_action;

pub use pending_action::pending_action_from_model;
