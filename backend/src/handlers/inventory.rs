//! HTTP handlers for stock items and transactions

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::{StockItem, StockTransaction};
use crate::services::inventory::{CreateItemInput, MoveItemInput, UpdateItemInput};
use crate::services::processor::{AppliedTransaction, QuantityDrift, TransactionRequest};
use crate::services::query::{ItemQuery, TransactionQuery};
use crate::services::InventoryService;
use crate::AppState;

fn service(state: &AppState) -> InventoryService {
    InventoryService::new(state.store.clone(), state.settings())
}

/// Create a stock item
pub async fn create_item(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Json(input): Json<CreateItemInput>,
) -> AppResult<(StatusCode, Json<StockItem>)> {
    let item = service(&state).create_item(input, &actor).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// List items matching the query filters
pub async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<ItemQuery>,
) -> AppResult<Json<Vec<StockItem>>> {
    let items = service(&state).list_items(&query).await?;
    Ok(Json(items))
}

pub async fn get_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<StockItem>> {
    let item = service(&state).get_item(item_id).await?;
    Ok(Json(item))
}

/// Edit an item; pass `expected_version` for optimistic concurrency
pub async fn update_item(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(item_id): Path<Uuid>,
    Json(input): Json<UpdateItemInput>,
) -> AppResult<Json<StockItem>> {
    let item = service(&state).update_item(item_id, input, &actor).await?;
    Ok(Json(item))
}

/// Archive an item, writing off any remaining stock
pub async fn delete_item(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<StockItem>> {
    let item = service(&state).remove_item(item_id, &actor).await?;
    Ok(Json(item))
}

/// Apply a stock movement to an item
pub async fn record_transaction(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(item_id): Path<Uuid>,
    Json(request): Json<TransactionRequest>,
) -> AppResult<Json<AppliedTransaction>> {
    let applied = service(&state)
        .record_transaction(item_id, request, &actor)
        .await?;
    Ok(Json(applied))
}

pub async fn get_item_transactions(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<Vec<StockTransaction>>> {
    let transactions = service(&state).item_transactions(item_id).await?;
    Ok(Json(transactions))
}

/// Move an item to another location
pub async fn move_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
    Json(input): Json<MoveItemInput>,
) -> AppResult<Json<StockItem>> {
    let item = service(&state).move_item(item_id, input).await?;
    Ok(Json(item))
}

/// List transactions across all items
pub async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<TransactionQuery>,
) -> AppResult<Json<Vec<StockTransaction>>> {
    let transactions = service(&state).list_transactions(&query).await?;
    Ok(Json(transactions))
}

/// Report items whose cached quantity drifted from their log
pub async fn reconciliation(State(state): State<AppState>) -> AppResult<Json<Vec<QuantityDrift>>> {
    let drift = service(&state).reconcile().await?;
    Ok(Json(drift))
}
