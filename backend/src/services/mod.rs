//! Business logic services for the restaurant stock ledger

pub mod alert;
pub mod analytics;
pub mod inventory;
pub mod ledger;
pub mod location;
pub mod processor;
pub mod purchase_order;
pub mod query;
pub mod reporting;
pub mod store;
pub mod supplier;

pub use alert::AlertService;
pub use analytics::AnalyticsService;
pub use inventory::InventoryService;
pub use ledger::{Ledger, LedgerSnapshot};
pub use location::LocationService;
pub use purchase_order::PurchaseOrderService;
pub use reporting::ReportingService;
pub use store::LedgerStore;
pub use supplier::SupplierService;
