//! Storage location HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::StockLocation;
use crate::services::location::CreateLocationInput;
use crate::services::LocationService;
use crate::AppState;

pub async fn create_location(
    State(state): State<AppState>,
    Json(input): Json<CreateLocationInput>,
) -> AppResult<(StatusCode, Json<StockLocation>)> {
    let service = LocationService::new(state.store.clone());
    let location = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(location)))
}

pub async fn list_locations(State(state): State<AppState>) -> AppResult<Json<Vec<StockLocation>>> {
    let service = LocationService::new(state.store.clone());
    let locations = service.list().await?;
    Ok(Json(locations))
}

pub async fn get_location(
    State(state): State<AppState>,
    Path(location_id): Path<Uuid>,
) -> AppResult<Json<StockLocation>> {
    let service = LocationService::new(state.store.clone());
    let location = service.get(location_id).await?;
    Ok(Json(location))
}
