//! Analytics handler

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::models::StockAnalytics;
use crate::services::AnalyticsService;
use crate::AppState;

/// Current analytics snapshot
pub async fn get_analytics(State(state): State<AppState>) -> AppResult<Json<StockAnalytics>> {
    let service = AnalyticsService::new(state.store.clone(), state.settings());
    let analytics = service.snapshot().await?;
    Ok(Json(analytics))
}
