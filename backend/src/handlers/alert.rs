//! Stock alert HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::StockAlert;
use crate::services::query::AlertQuery;
use crate::services::AlertService;
use crate::AppState;

#[derive(Serialize)]
pub struct MarkAllReadResponse {
    pub updated: usize,
}

fn service(state: &AppState) -> AlertService {
    AlertService::new(state.store.clone(), state.settings())
}

pub async fn list_alerts(
    State(state): State<AppState>,
    Query(query): Query<AlertQuery>,
) -> AppResult<Json<Vec<StockAlert>>> {
    let alerts = service(&state).list(&query).await?;
    Ok(Json(alerts))
}

/// Run the alert scan now and return only newly raised alerts
pub async fn scan_alerts(State(state): State<AppState>) -> AppResult<Json<Vec<StockAlert>>> {
    let alerts = service(&state).scan().await?;
    Ok(Json(alerts))
}

pub async fn mark_alert_read(
    State(state): State<AppState>,
    Path(alert_id): Path<Uuid>,
) -> AppResult<Json<StockAlert>> {
    let alert = service(&state).mark_read(alert_id).await?;
    Ok(Json(alert))
}

pub async fn mark_all_alerts_read(
    State(state): State<AppState>,
) -> AppResult<Json<MarkAllReadResponse>> {
    let updated = service(&state).mark_all_read().await?;
    Ok(Json(MarkAllReadResponse { updated }))
}

pub async fn delete_alert(
    State(state): State<AppState>,
    Path(alert_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    service(&state).remove(alert_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
