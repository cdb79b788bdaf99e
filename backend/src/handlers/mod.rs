//! HTTP handlers for the restaurant stock API

pub mod alert;
pub mod analytics;
pub mod health;
pub mod inventory;
pub mod location;
pub mod purchase_order;
pub mod reporting;
pub mod supplier;

pub use alert::*;
pub use analytics::*;
pub use health::*;
pub use inventory::*;
pub use location::*;
pub use purchase_order::*;
pub use reporting::*;
pub use supplier::*;
