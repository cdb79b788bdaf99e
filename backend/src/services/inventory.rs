//! Inventory service for stock items and their movements
//!
//! Every mutation holds the ledger write lock from validation through the
//! alert re-scan, so readers never observe a half-applied change.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::config::InventorySettings;
use crate::error::{check, AppError, AppResult};
use crate::models::{derive_status, Actor, StockItem, StockTransaction, TransactionType};
use crate::services::alert::{price_change_alert, raise, refresh_and_scan};
use crate::services::ledger::Ledger;
use crate::services::processor::{
    apply_transaction, reconcile, AppliedTransaction, QuantityDrift, TransactionRequest,
};
use crate::services::query::{filter_items, filter_transactions, ItemQuery, TransactionQuery};
use crate::services::store::LedgerStore;
use shared::validation::{
    validate_alert_threshold, validate_stock_levels, validate_stock_quantity, validate_tag,
    validate_unit_price,
};

/// Input for creating a stock item
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateItemInput {
    pub id: Option<Uuid>,
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "Category must be 1-100 characters"))]
    pub category: String,
    /// Opening quantity, recorded as an `in` transaction
    #[serde(default)]
    pub quantity: Decimal,
    #[validate(length(min = 1, max = 20, message = "Unit must be 1-20 characters"))]
    pub unit: String,
    pub unit_price: Decimal,
    pub supplier_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    #[serde(default)]
    pub minimum_stock: Decimal,
    /// Defaults to `minimum_stock`
    pub optimum_stock: Option<Decimal>,
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_perishable: bool,
    /// Percent of minimum stock; defaults to 100
    pub alert_threshold: Option<Decimal>,
}

/// Input for editing a stock item. Absent fields stay unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateItemInput {
    /// Reject the edit unless the item is still at this version
    pub expected_version: Option<u64>,
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Category must be 1-100 characters"))]
    pub category: Option<String>,
    #[validate(length(min = 1, max = 20, message = "Unit must be 1-20 characters"))]
    pub unit: Option<String>,
    pub unit_price: Option<Decimal>,
    pub supplier_id: Option<Uuid>,
    #[serde(default)]
    pub clear_supplier: bool,
    /// Moves the item atomically
    pub location_id: Option<Uuid>,
    pub minimum_stock: Option<Decimal>,
    pub optimum_stock: Option<Decimal>,
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub clear_expiry: bool,
    pub tags: Option<Vec<String>>,
    pub is_perishable: Option<bool>,
    pub alert_threshold: Option<Decimal>,
    /// New absolute quantity, recorded as an adjustment
    pub quantity: Option<Decimal>,
    /// Reason attached to the quantity adjustment
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MoveItemInput {
    pub location_id: Uuid,
}

// ============================================================================
// Ledger operations
// ============================================================================

fn normalize_tags(tags: &[String]) -> AppResult<BTreeSet<String>> {
    tags.iter()
        .map(|tag| {
            check("tags", validate_tag(tag))?;
            Ok(tag.trim().to_string())
        })
        .collect()
}

/// Create an item. An opening quantity goes through the processor as
/// "Initial stock" so the log replays to the cached quantity.
pub fn create_item(
    ledger: &mut Ledger,
    input: &CreateItemInput,
    actor: &Actor,
    settings: &InventorySettings,
    now: DateTime<Utc>,
) -> AppResult<StockItem> {
    check("quantity", validate_stock_quantity(input.quantity))?;
    check("unit_price", validate_unit_price(input.unit_price))?;
    let optimum_stock = input.optimum_stock.unwrap_or(input.minimum_stock);
    check(
        "minimum_stock",
        validate_stock_levels(input.minimum_stock, optimum_stock),
    )?;
    let alert_threshold = input.alert_threshold.unwrap_or(Decimal::ONE_HUNDRED);
    check("alert_threshold", validate_alert_threshold(alert_threshold))?;
    let tags = normalize_tags(&input.tags)?;

    let item = StockItem {
        id: input.id.unwrap_or_else(Uuid::new_v4),
        name: input.name.trim().to_string(),
        category: input.category.trim().to_string(),
        quantity: Decimal::ZERO,
        unit: input.unit.trim().to_string(),
        unit_price: input.unit_price,
        total_value: Decimal::ZERO,
        supplier_id: input.supplier_id,
        location_id: input.location_id,
        minimum_stock: input.minimum_stock,
        optimum_stock,
        expiry_date: input.expiry_date,
        last_restocked: now,
        status: derive_status(Decimal::ZERO, input.minimum_stock, input.expiry_date, now),
        tags,
        usage_rate: Decimal::ZERO,
        is_perishable: input.is_perishable,
        alert_threshold,
        version: 1,
        created_at: now,
        updated_at: now,
    };
    let item_id = item.id;
    ledger.add_item(item)?;

    if input.quantity > Decimal::ZERO {
        let request = TransactionRequest::new(TransactionType::In, input.quantity)
            .with_reason("Initial stock");
        if let Err(e) = apply_transaction(ledger, item_id, &request, actor, settings, now) {
            ledger.discard_item(item_id);
            return Err(e);
        }
    }

    let item = ledger
        .item(item_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound("Stock item".to_string()))?;
    tracing::info!(
        "Created stock item {} ({}) with {} {}",
        item.name,
        item.id,
        item.quantity,
        item.unit
    );
    Ok(item)
}

/// Edit an item. Descriptive fields change in place, a location change is an
/// atomic move and a quantity change is recorded as an adjustment.
pub fn update_item(
    ledger: &mut Ledger,
    item_id: Uuid,
    input: &UpdateItemInput,
    actor: &Actor,
    settings: &InventorySettings,
    now: DateTime<Utc>,
) -> AppResult<StockItem> {
    let current = ledger
        .item(item_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound("Stock item".to_string()))?;

    if let Some(expected) = input.expected_version {
        if expected != current.version {
            return Err(AppError::VersionConflict {
                resource: "Stock item".to_string(),
                expected,
                actual: current.version,
            });
        }
    }

    let mut updated = current.clone();
    if let Some(name) = &input.name {
        updated.name = name.trim().to_string();
    }
    if let Some(category) = &input.category {
        updated.category = category.trim().to_string();
    }
    if let Some(unit) = &input.unit {
        updated.unit = unit.trim().to_string();
    }
    if let Some(unit_price) = input.unit_price {
        check("unit_price", validate_unit_price(unit_price))?;
        updated.unit_price = unit_price;
    }
    if input.clear_supplier {
        updated.supplier_id = None;
    } else if let Some(supplier_id) = input.supplier_id {
        if ledger.supplier(supplier_id).is_none() {
            return Err(AppError::ReferentialIntegrity(format!(
                "Unknown supplier {}",
                supplier_id
            )));
        }
        updated.supplier_id = Some(supplier_id);
    }
    if let Some(minimum) = input.minimum_stock {
        updated.minimum_stock = minimum;
    }
    if let Some(optimum) = input.optimum_stock {
        updated.optimum_stock = optimum;
    }
    check(
        "minimum_stock",
        validate_stock_levels(updated.minimum_stock, updated.optimum_stock),
    )?;
    if input.clear_expiry {
        updated.expiry_date = None;
    } else if let Some(expiry) = input.expiry_date {
        updated.expiry_date = Some(expiry);
    }
    if let Some(tags) = &input.tags {
        updated.tags = normalize_tags(tags)?;
    }
    if let Some(perishable) = input.is_perishable {
        updated.is_perishable = perishable;
    }
    if let Some(threshold) = input.alert_threshold {
        check("alert_threshold", validate_alert_threshold(threshold))?;
        updated.alert_threshold = threshold;
    }

    let target_location = input
        .location_id
        .filter(|location_id| current.location_id != Some(*location_id));
    if let Some(location_id) = target_location {
        let location = ledger.location(location_id).ok_or_else(|| {
            AppError::ReferentialIntegrity(format!("Unknown location {}", location_id))
        })?;
        if !location.has_room() {
            return Err(AppError::validation(
                "location_id",
                format!("Location {} is full", location.name),
            ));
        }
    }

    let target_quantity = input.quantity.filter(|q| *q != current.quantity);
    if let Some(quantity) = target_quantity {
        check("quantity", validate_stock_quantity(quantity))?;
    }

    // Validated; apply in order. The adjustment bumps the version itself.
    if target_quantity.is_none() {
        updated.touch(now);
    }
    ledger.update_item(updated)?;
    if let Some(location_id) = target_location {
        ledger.move_item_location(item_id, location_id)?;
    }
    if let Some(quantity) = target_quantity {
        let request = TransactionRequest::new(TransactionType::Adjustment, quantity)
            .with_reason(input.reason.clone().unwrap_or_else(|| "Manual edit".to_string()));
        apply_transaction(ledger, item_id, &request, actor, settings, now)?;
    }

    let item = ledger
        .item(item_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound("Stock item".to_string()))?;

    if item.unit_price != current.unit_price {
        if let Some(alert) = price_change_alert(&item, current.unit_price, settings, now) {
            raise(ledger, alert);
        }
    }

    tracing::info!("Updated stock item {} to version {}", item.id, item.version);
    Ok(item)
}

/// Remove an item from the active collections. Remaining stock is written
/// off with a compensating adjustment to zero before the record is archived.
pub fn remove_item(
    ledger: &mut Ledger,
    item_id: Uuid,
    actor: &Actor,
    settings: &InventorySettings,
    now: DateTime<Utc>,
) -> AppResult<StockItem> {
    let item = ledger
        .item(item_id)
        .ok_or_else(|| AppError::NotFound("Stock item".to_string()))?;

    if item.quantity > Decimal::ZERO {
        let request = TransactionRequest::new(TransactionType::Adjustment, Decimal::ZERO)
            .with_reason("Item removed");
        apply_transaction(ledger, item_id, &request, actor, settings, now)?;
    }

    let archived = ledger.remove_item(item_id)?;
    tracing::info!("Removed stock item {} ({})", archived.name, archived.id);
    Ok(archived)
}

/// Relocate an item without changing its quantity
pub fn move_item(
    ledger: &mut Ledger,
    item_id: Uuid,
    location_id: Uuid,
    now: DateTime<Utc>,
) -> AppResult<StockItem> {
    let previous = ledger.move_item_location(item_id, location_id)?;
    let item = ledger
        .item_mut(item_id)
        .ok_or_else(|| AppError::NotFound("Stock item".to_string()))?;
    item.touch(now);
    tracing::info!(
        "Moved stock item {} from {:?} to {}",
        item.id,
        previous,
        location_id
    );
    Ok(item.clone())
}

// ============================================================================
// Service
// ============================================================================

/// Inventory service
#[derive(Clone)]
pub struct InventoryService {
    store: LedgerStore,
    settings: InventorySettings,
}

impl InventoryService {
    pub fn new(store: LedgerStore, settings: InventorySettings) -> Self {
        Self { store, settings }
    }

    pub async fn create_item(&self, input: CreateItemInput, actor: &Actor) -> AppResult<StockItem> {
        input.validate()?;
        let now = Utc::now();
        let mut ledger = self.store.write().await;
        let item = create_item(&mut ledger, &input, actor, &self.settings, now)?;
        refresh_and_scan(&mut ledger, &self.settings, now);
        self.store.persist_after_mutation(&ledger).await?;
        Ok(item)
    }

    /// Fetch an item with its status derived at the current time
    pub async fn get_item(&self, item_id: Uuid) -> AppResult<StockItem> {
        let ledger = self.store.read().await;
        let mut item = ledger
            .item(item_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Stock item".to_string()))?;
        item.refresh_derived(Utc::now());
        Ok(item)
    }

    pub async fn list_items(&self, query: &ItemQuery) -> AppResult<Vec<StockItem>> {
        let ledger = self.store.read().await;
        filter_items(&ledger, query, Utc::now())
    }

    pub async fn update_item(
        &self,
        item_id: Uuid,
        input: UpdateItemInput,
        actor: &Actor,
    ) -> AppResult<StockItem> {
        input.validate()?;
        let now = Utc::now();
        let mut ledger = self.store.write().await;
        let item = update_item(&mut ledger, item_id, &input, actor, &self.settings, now)?;
        refresh_and_scan(&mut ledger, &self.settings, now);
        self.store.persist_after_mutation(&ledger).await?;
        Ok(item)
    }

    pub async fn remove_item(&self, item_id: Uuid, actor: &Actor) -> AppResult<StockItem> {
        let now = Utc::now();
        let mut ledger = self.store.write().await;
        let item = remove_item(&mut ledger, item_id, actor, &self.settings, now)?;
        refresh_and_scan(&mut ledger, &self.settings, now);
        self.store.persist_after_mutation(&ledger).await?;
        Ok(item)
    }

    /// Apply a stock movement to an item
    pub async fn record_transaction(
        &self,
        item_id: Uuid,
        request: TransactionRequest,
        actor: &Actor,
    ) -> AppResult<AppliedTransaction> {
        let now = Utc::now();
        let mut ledger = self.store.write().await;
        let applied = apply_transaction(&mut ledger, item_id, &request, actor, &self.settings, now)?;
        if !applied.replayed {
            refresh_and_scan(&mut ledger, &self.settings, now);
            self.store.persist_after_mutation(&ledger).await?;
        }
        Ok(applied)
    }

    /// Transactions of one item in log order; archived items keep their history
    pub async fn item_transactions(&self, item_id: Uuid) -> AppResult<Vec<StockTransaction>> {
        let ledger = self.store.read().await;
        if ledger.any_item(item_id).is_none() {
            return Err(AppError::NotFound("Stock item".to_string()));
        }
        Ok(ledger.transactions_for(item_id).cloned().collect())
    }

    pub async fn list_transactions(
        &self,
        query: &TransactionQuery,
    ) -> AppResult<Vec<StockTransaction>> {
        let ledger = self.store.read().await;
        filter_transactions(&ledger, query)
    }

    pub async fn move_item(&self, item_id: Uuid, input: MoveItemInput) -> AppResult<StockItem> {
        let now = Utc::now();
        let mut ledger = self.store.write().await;
        let item = move_item(&mut ledger, item_id, input.location_id, now)?;
        self.store.persist_after_mutation(&ledger).await?;
        Ok(item)
    }

    /// Items whose cached quantity disagrees with their transaction log
    pub async fn reconcile(&self) -> AppResult<Vec<QuantityDrift>> {
        let ledger = self.store.read().await;
        Ok(reconcile(&ledger))
    }
}
