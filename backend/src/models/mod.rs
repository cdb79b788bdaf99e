//! Domain models for the restaurant stock service
//!
//! Re-exports models from the shared crate

pub use shared::models::*;
pub use shared::types::{Actor, SortDirection};
