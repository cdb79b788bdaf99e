//! Domain models for the restaurant stock ledger

mod alert;
mod analytics;
mod item;
mod location;
mod purchase_order;
mod supplier;
mod transaction;

pub use alert::*;
pub use analytics::*;
pub use item::*;
pub use location::*;
pub use purchase_order::*;
pub use supplier::*;
pub use transaction::*;
