//! Purchase order workflow
//!
//! Orders move forward only: draft -> sent -> confirmed -> received, with
//! cancellation from any non-terminal state. Receiving feeds one `in`
//! transaction per line back through the transaction processor.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::config::InventorySettings;
use crate::error::{check, AppError, AppResult};
use crate::models::{
    generate_document_number, Actor, PaymentStatus, PurchaseOrder, PurchaseOrderLine,
    PurchaseOrderStatus, StockTransaction, TransactionType,
};
use crate::services::alert::refresh_and_scan;
use crate::services::ledger::Ledger;
use crate::services::processor::{apply_transaction, restocked_quantity, TransactionRequest};
use crate::services::query::{filter_purchase_orders, PurchaseOrderQuery};
use crate::services::store::LedgerStore;
use shared::validation::{validate_quantity, validate_unit_price};

/// Input for creating a purchase order
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePurchaseOrderInput {
    pub supplier_id: Uuid,
    pub expected_delivery: Option<DateTime<Utc>>,
    #[serde(default)]
    pub lines: Vec<OrderLineInput>,
    #[validate(length(max = 2000, message = "Notes must be at most 2000 characters"))]
    pub notes: Option<String>,
}

/// One requested line; the item's current unit price is used when omitted
#[derive(Debug, Clone, Deserialize)]
pub struct OrderLineInput {
    pub item_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplaceLinesInput {
    pub lines: Vec<OrderLineInput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransitionInput {
    pub to: PurchaseOrderStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentInput {
    #[serde(default = "default_payment_status")]
    pub payment_status: PaymentStatus,
}

fn default_payment_status() -> PaymentStatus {
    PaymentStatus::Paid
}

/// Order after a status change, plus the stock movements receiving caused
#[derive(Debug, Clone, Serialize)]
pub struct OrderTransition {
    pub order: PurchaseOrder,
    pub transactions: Vec<StockTransaction>,
}

// ============================================================================
// Workflow rules
// ============================================================================

/// Resolve and validate requested lines against the active items
pub fn build_lines(ledger: &Ledger, lines: &[OrderLineInput]) -> AppResult<Vec<PurchaseOrderLine>> {
    lines
        .iter()
        .map(|line| {
            let item = ledger.item(line.item_id).ok_or_else(|| {
                AppError::ReferentialIntegrity(format!(
                    "Purchase order line references unknown item {}",
                    line.item_id
                ))
            })?;
            check("quantity", validate_quantity(line.quantity))?;
            let unit_price = line.unit_price.unwrap_or(item.unit_price);
            check("unit_price", validate_unit_price(unit_price))?;
            Ok(PurchaseOrderLine::new(line.item_id, line.quantity, unit_price))
        })
        .collect()
}

pub fn create_purchase_order(
    ledger: &mut Ledger,
    input: &CreatePurchaseOrderInput,
    now: DateTime<Utc>,
) -> AppResult<PurchaseOrder> {
    let supplier = ledger.supplier(input.supplier_id).ok_or_else(|| {
        AppError::ReferentialIntegrity(format!("Unknown supplier {}", input.supplier_id))
    })?;
    if !supplier.is_active() {
        return Err(AppError::validation(
            "supplier_id",
            format!("Supplier {} is inactive", supplier.name),
        ));
    }
    let lines = build_lines(ledger, &input.lines)?;

    let sequence = ledger.next_document_sequence();
    let mut order = PurchaseOrder {
        id: Uuid::new_v4(),
        document_number: generate_document_number(now.year(), sequence),
        supplier_id: input.supplier_id,
        status: PurchaseOrderStatus::Draft,
        created_at: now,
        updated_at: now,
        expected_delivery: input.expected_delivery,
        actual_delivery: None,
        lines: Vec::new(),
        total_value: Decimal::ZERO,
        payment_status: PaymentStatus::Pending,
        notes: input.notes.clone(),
    };
    order.set_lines(lines);
    ledger.add_purchase_order(order.clone())?;

    tracing::info!(
        "Created purchase order {} for {} ({} lines, total {})",
        order.document_number,
        order.supplier_id,
        order.lines.len(),
        order.total_value
    );
    Ok(order)
}

/// Swap an order's lines; only drafts can be edited
pub fn replace_lines(
    ledger: &mut Ledger,
    order_id: Uuid,
    lines: &[OrderLineInput],
    now: DateTime<Utc>,
) -> AppResult<PurchaseOrder> {
    let mut order = ledger
        .purchase_order(order_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound("Purchase order".to_string()))?;
    if order.status != PurchaseOrderStatus::Draft {
        return Err(AppError::InvalidStateTransition(format!(
            "Lines of {} cannot change once it is {}",
            order.document_number, order.status
        )));
    }
    order.set_lines(build_lines(ledger, lines)?);
    order.updated_at = now;
    ledger.update_purchase_order(order.clone())?;
    Ok(order)
}

/// Move an order to `to`. Receiving applies every line as an `in` transaction:
/// all lines are validated first, so either every line lands or none does.
pub fn transition_order(
    ledger: &mut Ledger,
    order_id: Uuid,
    to: PurchaseOrderStatus,
    actor: &Actor,
    settings: &InventorySettings,
    now: DateTime<Utc>,
) -> AppResult<OrderTransition> {
    let mut order = ledger
        .purchase_order(order_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound("Purchase order".to_string()))?;
    let next = order.status.transition(to)?;

    if next == PurchaseOrderStatus::Sent && order.lines.is_empty() {
        return Err(AppError::validation(
            "lines",
            "A purchase order needs at least one line before it is sent",
        ));
    }

    let mut transactions = Vec::new();
    if next == PurchaseOrderStatus::Received {
        if let Some(line) = order.lines.iter().find(|l| ledger.item(l.item_id).is_none()) {
            return Err(AppError::ReferentialIntegrity(format!(
                "Cannot receive {}: item {} no longer exists",
                order.document_number, line.item_id
            )));
        }
        let mut incoming: BTreeMap<Uuid, Decimal> = BTreeMap::new();
        for line in &order.lines {
            let held = match incoming.get(&line.item_id) {
                Some(held) => *held,
                None => ledger.item(line.item_id).map_or(Decimal::ZERO, |i| i.quantity),
            };
            incoming.insert(line.item_id, restocked_quantity(held, line.quantity)?);
        }
        for line in &order.lines {
            let request = TransactionRequest {
                reference: Some(order.document_number.clone()),
                unit_cost: Some(line.unit_price),
                ..TransactionRequest::new(TransactionType::In, line.quantity)
                    .with_reason(format!("received PO {}", order.document_number))
            };
            let applied = apply_transaction(ledger, line.item_id, &request, actor, settings, now)?;
            transactions.push(applied.transaction);
        }
        order.actual_delivery = Some(now);
    }

    let previous = order.status;
    order.status = next;
    order.updated_at = now;
    ledger.update_purchase_order(order.clone())?;

    tracing::info!(
        "Purchase order {} moved from {} to {}",
        order.document_number,
        previous,
        next
    );
    Ok(OrderTransition {
        order,
        transactions,
    })
}

/// Update payment status; cancelled orders are closed for payment
pub fn update_payment(
    ledger: &mut Ledger,
    order_id: Uuid,
    payment_status: PaymentStatus,
    now: DateTime<Utc>,
) -> AppResult<PurchaseOrder> {
    let mut order = ledger
        .purchase_order(order_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound("Purchase order".to_string()))?;
    if order.status == PurchaseOrderStatus::Cancelled {
        return Err(AppError::InvalidStateTransition(format!(
            "{} is cancelled and cannot change payment status",
            order.document_number
        )));
    }
    order.payment_status = payment_status;
    order.updated_at = now;
    ledger.update_purchase_order(order.clone())?;
    Ok(order)
}

// ============================================================================
// Service
// ============================================================================

/// Purchase order service
#[derive(Clone)]
pub struct PurchaseOrderService {
    store: LedgerStore,
    settings: InventorySettings,
}

impl PurchaseOrderService {
    pub fn new(store: LedgerStore, settings: InventorySettings) -> Self {
        Self { store, settings }
    }

    pub async fn create(&self, input: CreatePurchaseOrderInput) -> AppResult<PurchaseOrder> {
        input.validate()?;
        let mut ledger = self.store.write().await;
        let order = create_purchase_order(&mut ledger, &input, Utc::now())?;
        self.store.persist_after_mutation(&ledger).await?;
        Ok(order)
    }

    pub async fn get(&self, order_id: Uuid) -> AppResult<PurchaseOrder> {
        let ledger = self.store.read().await;
        ledger
            .purchase_order(order_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Purchase order".to_string()))
    }

    pub async fn list(&self, query: &PurchaseOrderQuery) -> AppResult<Vec<PurchaseOrder>> {
        let ledger = self.store.read().await;
        filter_purchase_orders(&ledger, query)
    }

    pub async fn replace_lines(
        &self,
        order_id: Uuid,
        input: ReplaceLinesInput,
    ) -> AppResult<PurchaseOrder> {
        let mut ledger = self.store.write().await;
        let order = replace_lines(&mut ledger, order_id, &input.lines, Utc::now())?;
        self.store.persist_after_mutation(&ledger).await?;
        Ok(order)
    }

    pub async fn transition(
        &self,
        order_id: Uuid,
        to: PurchaseOrderStatus,
        actor: &Actor,
    ) -> AppResult<OrderTransition> {
        let now = Utc::now();
        let mut ledger = self.store.write().await;
        let result = transition_order(&mut ledger, order_id, to, actor, &self.settings, now)?;
        if !result.transactions.is_empty() {
            refresh_and_scan(&mut ledger, &self.settings, now);
        }
        self.store.persist_after_mutation(&ledger).await?;
        Ok(result)
    }

    pub async fn update_payment(
        &self,
        order_id: Uuid,
        payment_status: PaymentStatus,
    ) -> AppResult<PurchaseOrder> {
        let mut ledger = self.store.write().await;
        let order = update_payment(&mut ledger, order_id, payment_status, Utc::now())?;
        self.store.persist_after_mutation(&ledger).await?;
        tracing::info!(
            "Payment status of {} set to {}",
            order.document_number,
            payment_status.as_str()
        );
        Ok(order)
    }
}
