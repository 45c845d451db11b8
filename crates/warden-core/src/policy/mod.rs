//! Policy registry - the data-driven action-type -> tier mapping

mod registry;

pub use registry::PolicyRegistry;
