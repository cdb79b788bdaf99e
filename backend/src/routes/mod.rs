//! Route definitions for the restaurant stock API

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/items", item_routes())
        .route("/transactions", get(handlers::list_transactions))
        .nest("/suppliers", supplier_routes())
        .nest("/locations", location_routes())
        .nest("/purchase-orders", purchase_order_routes())
        .nest("/alerts", alert_routes())
        .route("/analytics", get(handlers::get_analytics))
        .route("/reconciliation", get(handlers::reconciliation))
        .nest("/reports", report_routes())
}

/// Stock item routes
fn item_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_items).post(handlers::create_item))
        .route(
            "/:id",
            get(handlers::get_item)
                .patch(handlers::update_item)
                .delete(handlers::delete_item),
        )
        .route(
            "/:id/transactions",
            get(handlers::get_item_transactions).post(handlers::record_transaction),
        )
        .route("/:id/move", post(handlers::move_item))
}

/// Supplier routes
fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_suppliers).post(handlers::create_supplier))
        .route(
            "/:id",
            get(handlers::get_supplier).patch(handlers::update_supplier),
        )
}

/// Storage location routes
fn location_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_locations).post(handlers::create_location))
        .route("/:id", get(handlers::get_location))
}

/// Purchase order routes
fn purchase_order_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_purchase_orders).post(handlers::create_purchase_order),
        )
        .route("/:id", get(handlers::get_purchase_order))
        .route("/:id/lines", put(handlers::replace_lines))
        .route("/:id/status", patch(handlers::update_status))
        .route("/:id/payment", post(handlers::update_payment))
}

/// Alert routes
fn alert_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_alerts))
        .route("/scan", post(handlers::scan_alerts))
        .route("/read-all", post(handlers::mark_all_alerts_read))
        .route("/:id", delete(handlers::delete_alert))
        .route("/:id/read", post(handlers::mark_alert_read))
}

/// Report export routes
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/stock", get(handlers::get_stock_report))
        .route("/transactions", get(handlers::get_transaction_report))
}
