//! Purchase order HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::PurchaseOrder;
use crate::services::purchase_order::{
    CreatePurchaseOrderInput, OrderTransition, PaymentInput, ReplaceLinesInput, TransitionInput,
};
use crate::services::query::PurchaseOrderQuery;
use crate::services::PurchaseOrderService;
use crate::AppState;

fn service(state: &AppState) -> PurchaseOrderService {
    PurchaseOrderService::new(state.store.clone(), state.settings())
}

/// Create a draft purchase order
pub async fn create_purchase_order(
    State(state): State<AppState>,
    Json(input): Json<CreatePurchaseOrderInput>,
) -> AppResult<(StatusCode, Json<PurchaseOrder>)> {
    let order = service(&state).create(input).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn list_purchase_orders(
    State(state): State<AppState>,
    Query(query): Query<PurchaseOrderQuery>,
) -> AppResult<Json<Vec<PurchaseOrder>>> {
    let orders = service(&state).list(&query).await?;
    Ok(Json(orders))
}

pub async fn get_purchase_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<PurchaseOrder>> {
    let order = service(&state).get(order_id).await?;
    Ok(Json(order))
}

/// Replace the lines of a draft order
pub async fn replace_lines(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(input): Json<ReplaceLinesInput>,
) -> AppResult<Json<PurchaseOrder>> {
    let order = service(&state).replace_lines(order_id, input).await?;
    Ok(Json(order))
}

/// Move an order through its lifecycle; receiving books the stock
pub async fn update_status(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(order_id): Path<Uuid>,
    Json(input): Json<TransitionInput>,
) -> AppResult<Json<OrderTransition>> {
    let result = service(&state)
        .transition(order_id, input.to, &actor)
        .await?;
    Ok(Json(result))
}

pub async fn update_payment(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(input): Json<PaymentInput>,
) -> AppResult<Json<PurchaseOrder>> {
    let order = service(&state)
        .update_payment(order_id, input.payment_status)
        .await?;
    Ok(Json(order))
}
