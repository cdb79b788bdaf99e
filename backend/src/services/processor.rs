//! Transaction processor: applies typed stock movements to a single item
//!
//! [`apply_transaction`] validates the whole request before it touches the
//! ledger. A rejected request leaves the item, its location and the
//! transaction log exactly as they were.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::InventorySettings;
use crate::error::{check, AppError, AppResult};
use crate::models::{
    replay_quantity, Actor, AdjustmentDirection, StockItem, StockTransaction, TransactionType,
    WasteReason,
};
use crate::services::ledger::Ledger;
use shared::validation::{validate_quantity, validate_stock_quantity, validate_unit_price};

/// A stock movement requested by a caller
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionRequest {
    /// Client-chosen id; re-sending it makes the request an idempotent retry
    pub id: Option<Uuid>,
    #[serde(rename = "type", alias = "transaction_type")]
    pub transaction_type: TransactionType,
    /// Moved amount, or the new absolute quantity for `adjustment`
    pub quantity: Decimal,
    pub reason: Option<String>,
    /// Target location (transfer only)
    pub destination: Option<Uuid>,
    pub waste_reason: Option<WasteReason>,
    pub reference: Option<String>,
    /// Overrides the item's unit price when costing the movement
    pub unit_cost: Option<Decimal>,
}

impl TransactionRequest {
    pub fn new(transaction_type: TransactionType, quantity: Decimal) -> Self {
        Self {
            id: None,
            transaction_type,
            quantity,
            reason: None,
            destination: None,
            waste_reason: None,
            reference: None,
            unit_cost: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Result of applying a transaction
#[derive(Debug, Clone, Serialize)]
pub struct AppliedTransaction {
    pub item: StockItem,
    pub transaction: StockTransaction,
    /// True when the request matched an already-recorded transaction
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub replayed: bool,
}

/// Cached quantity that disagrees with its transaction log
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QuantityDrift {
    pub item_id: Uuid,
    pub item_name: String,
    pub cached: Decimal,
    pub replayed: Decimal,
}

/// What a validated request will do to the item
struct Movement {
    new_quantity: Decimal,
    recorded_quantity: Decimal,
    direction: Option<AdjustmentDirection>,
}

/// Apply one transaction to one item.
///
/// Covers every effect of the movement: quantity, derived value and status,
/// usage rate, location membership for transfers and the log entry.
pub fn apply_transaction(
    ledger: &mut Ledger,
    item_id: Uuid,
    request: &TransactionRequest,
    actor: &Actor,
    settings: &InventorySettings,
    now: DateTime<Utc>,
) -> AppResult<AppliedTransaction> {
    let item = ledger
        .item(item_id)
        .ok_or_else(|| AppError::NotFound("Stock item".to_string()))?;

    if let Some(existing) = request.id.and_then(|id| ledger.transaction(id)) {
        if existing.item_id != item_id {
            return Err(AppError::DuplicateEntry("transaction id".to_string()));
        }
        tracing::debug!("Transaction {} already applied, returning it", existing.id);
        return Ok(AppliedTransaction {
            item: item.clone(),
            transaction: existing.clone(),
            replayed: true,
        });
    }

    let movement = plan_movement(item, request)?;
    let source = item.location_id;

    if request.transaction_type == TransactionType::Transfer {
        validate_transfer(ledger, source, request.destination)?;
    }

    let unit_cost = request.unit_cost.unwrap_or(item.unit_price);
    check("unit_cost", validate_unit_price(unit_cost))?;

    let cost = movement
        .recorded_quantity
        .checked_mul(unit_cost)
        .ok_or_else(|| AppError::validation("quantity", "Transaction cost is too large"))?;

    let reason = match movement.direction {
        Some(direction) => Some(adjustment_reason(direction, request.reason.as_deref())),
        None => request.reason.clone(),
    };

    let transaction = StockTransaction {
        id: request.id.unwrap_or_else(Uuid::new_v4),
        transaction_type: request.transaction_type,
        item_id,
        quantity: movement.recorded_quantity,
        date: now,
        user_id: actor.user_id,
        user_name: actor.user_name.clone(),
        reason,
        cost,
        source: None,
        destination: None,
        waste_reason: None,
        adjustment_direction: movement.direction,
        reference: request.reference.clone(),
    };
    let transaction = match request.transaction_type {
        TransactionType::Transfer => StockTransaction {
            source,
            destination: request.destination,
            ..transaction
        },
        TransactionType::Waste => StockTransaction {
            waste_reason: Some(request.waste_reason.unwrap_or_default()),
            ..transaction
        },
        TransactionType::In | TransactionType::Out | TransactionType::Adjustment => transaction,
    };

    // Everything below has been validated and cannot fail part-way
    if let Some(destination) = transaction.destination {
        ledger.move_item_location(item_id, destination)?;
    }
    ledger.add_transaction(transaction.clone())?;

    let usage_rate = usage_rate_for(ledger, item_id, settings, now);
    let item = ledger
        .item_mut(item_id)
        .ok_or_else(|| AppError::NotFound("Stock item".to_string()))?;
    item.quantity = movement.new_quantity;
    item.usage_rate = usage_rate;
    if transaction.transaction_type == TransactionType::In {
        item.last_restocked = now;
    }
    item.touch(now);

    tracing::info!(
        "Applied {} of {} {} to {} (now {})",
        transaction.transaction_type,
        transaction.quantity,
        item.unit,
        item.name,
        item.quantity
    );

    Ok(AppliedTransaction {
        item: item.clone(),
        transaction,
        replayed: false,
    })
}

fn plan_movement(item: &StockItem, request: &TransactionRequest) -> AppResult<Movement> {
    let quantity = request.quantity;
    match request.transaction_type {
        TransactionType::In => {
            check("quantity", validate_quantity(quantity))?;
            Ok(Movement {
                new_quantity: restocked_quantity(item.quantity, quantity)?,
                recorded_quantity: quantity,
                direction: None,
            })
        }
        TransactionType::Out | TransactionType::Transfer | TransactionType::Waste => {
            check("quantity", validate_quantity(quantity))?;
            if quantity > item.quantity {
                return Err(AppError::InsufficientStock {
                    item: item.name.clone(),
                    requested: quantity,
                    available: item.quantity,
                });
            }
            Ok(Movement {
                new_quantity: item.quantity - quantity,
                recorded_quantity: quantity,
                direction: None,
            })
        }
        TransactionType::Adjustment => {
            check("quantity", validate_stock_quantity(quantity))?;
            let delta = quantity
                .checked_sub(item.quantity)
                .ok_or_else(|| AppError::validation("quantity", "Adjustment is too large"))?;
            if delta.is_zero() {
                return Err(AppError::validation(
                    "quantity",
                    "Adjustment target equals the current quantity",
                ));
            }
            let direction = if delta > Decimal::ZERO {
                AdjustmentDirection::Increase
            } else {
                AdjustmentDirection::Decrease
            };
            Ok(Movement {
                new_quantity: quantity,
                recorded_quantity: delta.abs(),
                direction: Some(direction),
            })
        }
    }
}

/// Stock held after adding `quantity`, bounded like any held quantity
pub fn restocked_quantity(current: Decimal, quantity: Decimal) -> AppResult<Decimal> {
    let total = current
        .checked_add(quantity)
        .ok_or_else(|| AppError::validation("quantity", "Resulting stock is too large"))?;
    check("quantity", validate_stock_quantity(total))?;
    Ok(total)
}

fn validate_transfer(
    ledger: &Ledger,
    source: Option<Uuid>,
    destination: Option<Uuid>,
) -> AppResult<()> {
    let destination = destination
        .ok_or_else(|| AppError::validation("destination", "Transfers need a destination"))?;
    let location = ledger.location(destination).ok_or_else(|| {
        AppError::ReferentialIntegrity(format!("Unknown location {}", destination))
    })?;
    if source == Some(destination) {
        return Err(AppError::validation(
            "destination",
            "Destination must differ from the current location",
        ));
    }
    if !location.has_room() {
        return Err(AppError::validation(
            "destination",
            format!("Location {} is full", location.name),
        ));
    }
    Ok(())
}

fn adjustment_reason(direction: AdjustmentDirection, reason: Option<&str>) -> String {
    match reason.map(str::trim).filter(|r| !r.is_empty()) {
        Some(reason) => format!("Adjustment ({}): {}", direction.as_str(), reason),
        None => format!("Adjustment ({})", direction.as_str()),
    }
}

// ============================================================================
// Usage
// ============================================================================

/// Sum of `out` quantities dated at or after `since`
pub fn out_quantity_since<'a, I>(transactions: I, since: DateTime<Utc>) -> Decimal
where
    I: IntoIterator<Item = &'a StockTransaction>,
{
    transactions
        .into_iter()
        .filter(|tx| tx.transaction_type == TransactionType::Out && tx.date >= since)
        .map(|tx| tx.quantity)
        .sum()
}

/// Average daily usage over a window
pub fn calculate_usage_rate(out_total: Decimal, window_days: i64) -> Decimal {
    if window_days <= 0 {
        return Decimal::ZERO;
    }
    (out_total / Decimal::from(window_days)).round_dp(4)
}

fn usage_rate_for(
    ledger: &Ledger,
    item_id: Uuid,
    settings: &InventorySettings,
    now: DateTime<Utc>,
) -> Decimal {
    let since = now - Duration::days(settings.usage_window_days);
    let used = out_quantity_since(ledger.transactions_for(item_id), since);
    calculate_usage_rate(used, settings.usage_window_days)
}

// ============================================================================
// Reconciliation
// ============================================================================

/// Replay every active item's log and report the ones whose cached quantity drifted
pub fn reconcile(ledger: &Ledger) -> Vec<QuantityDrift> {
    let mut drift: Vec<QuantityDrift> = ledger
        .items()
        .filter_map(|item| {
            let replayed = replay_quantity(ledger.transactions_for(item.id));
            (replayed != item.quantity).then(|| QuantityDrift {
                item_id: item.id,
                item_name: item.name.clone(),
                cached: item.quantity,
                replayed,
            })
        })
        .collect();
    drift.sort_by(|a, b| a.item_name.cmp(&b.item_name).then(a.item_id.cmp(&b.item_id)));

    for record in &drift {
        tracing::warn!(
            "Quantity drift on {} ({}): cached {}, log replays to {}",
            record.item_name,
            record.item_id,
            record.cached,
            record.replayed
        );
    }
    drift
}
