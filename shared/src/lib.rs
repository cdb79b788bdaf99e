//! Shared types and models for the restaurant stock ledger
//!
//! This crate contains the domain records and the pure derivations shared
//! between the backend service and the browser dashboard (via WASM).

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
