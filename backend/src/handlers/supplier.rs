//! Supplier HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::Supplier;
use crate::services::query::SupplierQuery;
use crate::services::supplier::{CreateSupplierInput, UpdateSupplierInput};
use crate::services::SupplierService;
use crate::AppState;

pub async fn create_supplier(
    State(state): State<AppState>,
    Json(input): Json<CreateSupplierInput>,
) -> AppResult<(StatusCode, Json<Supplier>)> {
    let service = SupplierService::new(state.store.clone());
    let supplier = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

pub async fn list_suppliers(
    State(state): State<AppState>,
    Query(query): Query<SupplierQuery>,
) -> AppResult<Json<Vec<Supplier>>> {
    let service = SupplierService::new(state.store.clone());
    let suppliers = service.list(&query).await?;
    Ok(Json(suppliers))
}

pub async fn get_supplier(
    State(state): State<AppState>,
    Path(supplier_id): Path<Uuid>,
) -> AppResult<Json<Supplier>> {
    let service = SupplierService::new(state.store.clone());
    let supplier = service.get(supplier_id).await?;
    Ok(Json(supplier))
}

pub async fn update_supplier(
    State(state): State<AppState>,
    Path(supplier_id): Path<Uuid>,
    Json(input): Json<UpdateSupplierInput>,
) -> AppResult<Json<Supplier>> {
    let service = SupplierService::new(state.store.clone());
    let supplier = service.update(supplier_id, input).await?;
    Ok(Json(supplier))
}
