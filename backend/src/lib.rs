//! Restaurant Stock Ledger - Backend Library
//!
//! In-memory stock ledger with typed transactions, derived item status,
//! alerts, purchase orders and analytics, served over a JSON HTTP API.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

pub use config::{Config, InventorySettings};
pub use error::{AppError, AppResult};
pub use services::{Ledger, LedgerStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: LedgerStore,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: LedgerStore, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    /// Stock rule tunables handed to each service
    pub fn settings(&self) -> InventorySettings {
        self.config.inventory.clone()
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Restaurant Stock Ledger API v1.0"
}
