//! Ledger store holding the authoritative stock collections
//!
//! Mutators validate everything they need before touching any collection,
//! so a returned error always means nothing changed.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    PurchaseOrder, StockAlert, StockItem, StockLocation, StockTransaction, Supplier,
};

/// In-memory stock ledger
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    items: HashMap<Uuid, StockItem>,
    /// Removed items, kept so historical transactions still resolve
    archived_items: HashMap<Uuid, StockItem>,
    /// Append-only, in application order
    transactions: Vec<StockTransaction>,
    transaction_index: HashMap<Uuid, usize>,
    suppliers: HashMap<Uuid, Supplier>,
    purchase_orders: HashMap<Uuid, PurchaseOrder>,
    alerts: HashMap<Uuid, StockAlert>,
    locations: HashMap<Uuid, StockLocation>,
    document_sequence: u32,
}

/// Serializable form of the ledger: one id -> record map per collection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    #[serde(default)]
    pub items: BTreeMap<Uuid, StockItem>,
    #[serde(default)]
    pub archived_items: BTreeMap<Uuid, StockItem>,
    #[serde(default)]
    pub transactions: Vec<StockTransaction>,
    #[serde(default)]
    pub suppliers: BTreeMap<Uuid, Supplier>,
    #[serde(default)]
    pub purchase_orders: BTreeMap<Uuid, PurchaseOrder>,
    #[serde(default)]
    pub alerts: BTreeMap<Uuid, StockAlert>,
    #[serde(default)]
    pub locations: BTreeMap<Uuid, StockLocation>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Items
    // ========================================================================

    pub fn item(&self, item_id: Uuid) -> Option<&StockItem> {
        self.items.get(&item_id)
    }

    pub(crate) fn item_mut(&mut self, item_id: Uuid) -> Option<&mut StockItem> {
        self.items.get_mut(&item_id)
    }

    /// Active or archived item
    pub fn any_item(&self, item_id: Uuid) -> Option<&StockItem> {
        self.items
            .get(&item_id)
            .or_else(|| self.archived_items.get(&item_id))
    }

    pub fn items(&self) -> impl Iterator<Item = &StockItem> {
        self.items.values()
    }

    pub(crate) fn items_mut(&mut self) -> impl Iterator<Item = &mut StockItem> {
        self.items.values_mut()
    }

    pub fn archived_items(&self) -> impl Iterator<Item = &StockItem> {
        self.archived_items.values()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Insert a new item and register it with its location
    pub fn add_item(&mut self, item: StockItem) -> AppResult<()> {
        if self.items.contains_key(&item.id) || self.archived_items.contains_key(&item.id) {
            return Err(AppError::DuplicateEntry("item id".to_string()));
        }
        if let Some(supplier_id) = item.supplier_id {
            self.require_supplier(supplier_id)?;
        }
        if let Some(location_id) = item.location_id {
            let location = self.require_location(location_id)?;
            if !location.has_room() {
                return Err(AppError::validation(
                    "location_id",
                    format!("Location {} is full", location.name),
                ));
            }
        }

        if let Some(location_id) = item.location_id {
            if let Some(location) = self.locations.get_mut(&location_id) {
                location.insert_item(item.id);
            }
        }
        self.items.insert(item.id, item);
        Ok(())
    }

    /// Replace an item's record. Location membership is owned by
    /// [`Ledger::move_item_location`] and cannot change here.
    pub fn update_item(&mut self, item: StockItem) -> AppResult<()> {
        let existing = self
            .items
            .get(&item.id)
            .ok_or_else(|| AppError::NotFound("Stock item".to_string()))?;
        if existing.location_id != item.location_id {
            return Err(AppError::validation(
                "location_id",
                "Location changes must go through an item move",
            ));
        }
        if let Some(supplier_id) = item.supplier_id {
            self.require_supplier(supplier_id)?;
        }
        self.items.insert(item.id, item);
        Ok(())
    }

    /// Take an item out of the active collections. Its transactions stay in
    /// the log and the record moves to the archive.
    pub fn remove_item(&mut self, item_id: Uuid) -> AppResult<StockItem> {
        let item = self
            .items
            .remove(&item_id)
            .ok_or_else(|| AppError::NotFound("Stock item".to_string()))?;

        if let Some(location_id) = item.location_id {
            if let Some(location) = self.locations.get_mut(&location_id) {
                location.remove_item(item_id);
            }
        }
        self.alerts.retain(|_, alert| alert.item_id != item_id);
        self.archived_items.insert(item_id, item.clone());
        Ok(item)
    }

    /// Drop an item that never took part in the log, as if it was never added
    pub(crate) fn discard_item(&mut self, item_id: Uuid) {
        if let Some(item) = self.items.remove(&item_id) {
            if let Some(location) = item.location_id.and_then(|id| self.locations.get_mut(&id)) {
                location.remove_item(item_id);
            }
            self.alerts.retain(|_, alert| alert.item_id != item_id);
        }
    }

    /// Move an item between locations in one step. Either both locations and
    /// the item change, or none of them do. Returns the previous location.
    pub fn move_item_location(&mut self, item_id: Uuid, destination: Uuid) -> AppResult<Option<Uuid>> {
        let item = self
            .items
            .get(&item_id)
            .ok_or_else(|| AppError::NotFound("Stock item".to_string()))?;
        let previous = item.location_id;

        let target = self.require_location(destination)?;
        if previous == Some(destination) {
            return Err(AppError::validation(
                "destination",
                "Item is already stored at this location",
            ));
        }
        if !target.has_room() {
            return Err(AppError::validation(
                "destination",
                format!("Location {} is full", target.name),
            ));
        }

        if let Some(source) = previous.and_then(|id| self.locations.get_mut(&id)) {
            source.remove_item(item_id);
        }
        if let Some(target) = self.locations.get_mut(&destination) {
            target.insert_item(item_id);
        }
        if let Some(item) = self.items.get_mut(&item_id) {
            item.location_id = Some(destination);
        }
        Ok(previous)
    }

    // ========================================================================
    // Transactions
    // ========================================================================

    /// Append a transaction for an active item
    pub fn add_transaction(&mut self, transaction: StockTransaction) -> AppResult<()> {
        if !self.items.contains_key(&transaction.item_id) {
            return Err(AppError::ReferentialIntegrity(format!(
                "Transaction references unknown item {}",
                transaction.item_id
            )));
        }
        if self.transaction_index.contains_key(&transaction.id) {
            return Err(AppError::DuplicateEntry("transaction id".to_string()));
        }
        self.transaction_index
            .insert(transaction.id, self.transactions.len());
        self.transactions.push(transaction);
        Ok(())
    }

    pub fn transaction(&self, transaction_id: Uuid) -> Option<&StockTransaction> {
        self.transaction_index
            .get(&transaction_id)
            .and_then(|&idx| self.transactions.get(idx))
    }

    pub fn transactions(&self) -> &[StockTransaction] {
        &self.transactions
    }

    pub fn transactions_for(&self, item_id: Uuid) -> impl Iterator<Item = &StockTransaction> {
        self.transactions
            .iter()
            .filter(move |tx| tx.item_id == item_id)
    }

    // ========================================================================
    // Suppliers
    // ========================================================================

    pub fn supplier(&self, supplier_id: Uuid) -> Option<&Supplier> {
        self.suppliers.get(&supplier_id)
    }

    pub fn suppliers(&self) -> impl Iterator<Item = &Supplier> {
        self.suppliers.values()
    }

    pub fn add_supplier(&mut self, supplier: Supplier) -> AppResult<()> {
        if self.suppliers.contains_key(&supplier.id) {
            return Err(AppError::DuplicateEntry("supplier id".to_string()));
        }
        if self
            .suppliers
            .values()
            .any(|s| s.name.eq_ignore_ascii_case(&supplier.name))
        {
            return Err(AppError::DuplicateEntry("supplier name".to_string()));
        }
        self.suppliers.insert(supplier.id, supplier);
        Ok(())
    }

    pub fn update_supplier(&mut self, supplier: Supplier) -> AppResult<()> {
        if !self.suppliers.contains_key(&supplier.id) {
            return Err(AppError::NotFound("Supplier".to_string()));
        }
        if self
            .suppliers
            .values()
            .any(|s| s.id != supplier.id && s.name.eq_ignore_ascii_case(&supplier.name))
        {
            return Err(AppError::DuplicateEntry("supplier name".to_string()));
        }
        self.suppliers.insert(supplier.id, supplier);
        Ok(())
    }

    fn require_supplier(&self, supplier_id: Uuid) -> AppResult<&Supplier> {
        self.suppliers.get(&supplier_id).ok_or_else(|| {
            AppError::ReferentialIntegrity(format!("Unknown supplier {}", supplier_id))
        })
    }

    // ========================================================================
    // Purchase orders
    // ========================================================================

    pub fn purchase_order(&self, order_id: Uuid) -> Option<&PurchaseOrder> {
        self.purchase_orders.get(&order_id)
    }

    pub fn purchase_orders(&self) -> impl Iterator<Item = &PurchaseOrder> {
        self.purchase_orders.values()
    }

    /// Next value for document numbering
    pub fn next_document_sequence(&mut self) -> u32 {
        self.document_sequence += 1;
        self.document_sequence
    }

    pub fn add_purchase_order(&mut self, order: PurchaseOrder) -> AppResult<()> {
        if self.purchase_orders.contains_key(&order.id) {
            return Err(AppError::DuplicateEntry("purchase order id".to_string()));
        }
        if self
            .purchase_orders
            .values()
            .any(|po| po.document_number == order.document_number)
        {
            return Err(AppError::DuplicateEntry("document number".to_string()));
        }
        self.check_order_references(&order)?;
        self.purchase_orders.insert(order.id, order);
        Ok(())
    }

    pub fn update_purchase_order(&mut self, order: PurchaseOrder) -> AppResult<()> {
        if !self.purchase_orders.contains_key(&order.id) {
            return Err(AppError::NotFound("Purchase order".to_string()));
        }
        self.check_order_references(&order)?;
        self.purchase_orders.insert(order.id, order);
        Ok(())
    }

    fn check_order_references(&self, order: &PurchaseOrder) -> AppResult<()> {
        self.require_supplier(order.supplier_id)?;
        if let Some(line) = order
            .lines
            .iter()
            .find(|line| self.any_item(line.item_id).is_none())
        {
            return Err(AppError::ReferentialIntegrity(format!(
                "Purchase order line references unknown item {}",
                line.item_id
            )));
        }
        Ok(())
    }

    // ========================================================================
    // Alerts
    // ========================================================================

    pub fn alert(&self, alert_id: Uuid) -> Option<&StockAlert> {
        self.alerts.get(&alert_id)
    }

    pub(crate) fn alert_mut(&mut self, alert_id: Uuid) -> Option<&mut StockAlert> {
        self.alerts.get_mut(&alert_id)
    }

    pub fn alerts(&self) -> impl Iterator<Item = &StockAlert> {
        self.alerts.values()
    }

    pub(crate) fn alerts_mut(&mut self) -> impl Iterator<Item = &mut StockAlert> {
        self.alerts.values_mut()
    }

    /// Returns false when an alert with the same id already exists
    pub fn add_alert(&mut self, alert: StockAlert) -> bool {
        if self.alerts.contains_key(&alert.id) {
            return false;
        }
        self.alerts.insert(alert.id, alert);
        true
    }

    pub fn remove_alert(&mut self, alert_id: Uuid) -> AppResult<StockAlert> {
        self.alerts
            .remove(&alert_id)
            .ok_or_else(|| AppError::NotFound("Alert".to_string()))
    }

    // ========================================================================
    // Locations
    // ========================================================================

    pub fn location(&self, location_id: Uuid) -> Option<&StockLocation> {
        self.locations.get(&location_id)
    }

    pub fn locations(&self) -> impl Iterator<Item = &StockLocation> {
        self.locations.values()
    }

    pub fn add_location(&mut self, location: StockLocation) -> AppResult<()> {
        if self.locations.contains_key(&location.id) {
            return Err(AppError::DuplicateEntry("location id".to_string()));
        }
        if self
            .locations
            .values()
            .any(|l| l.name.eq_ignore_ascii_case(&location.name))
        {
            return Err(AppError::DuplicateEntry("location name".to_string()));
        }
        if !location.items.is_empty() {
            return Err(AppError::validation(
                "items",
                "New locations start empty; move items in instead",
            ));
        }
        self.locations.insert(location.id, location);
        Ok(())
    }

    fn require_location(&self, location_id: Uuid) -> AppResult<&StockLocation> {
        self.locations.get(&location_id).ok_or_else(|| {
            AppError::ReferentialIntegrity(format!("Unknown location {}", location_id))
        })
    }

    // ========================================================================
    // Snapshots
    // ========================================================================

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            items: self.items.iter().map(|(k, v)| (*k, v.clone())).collect(),
            archived_items: self
                .archived_items
                .iter()
                .map(|(k, v)| (*k, v.clone()))
                .collect(),
            transactions: self.transactions.clone(),
            suppliers: self.suppliers.iter().map(|(k, v)| (*k, v.clone())).collect(),
            purchase_orders: self
                .purchase_orders
                .iter()
                .map(|(k, v)| (*k, v.clone()))
                .collect(),
            alerts: self.alerts.iter().map(|(k, v)| (*k, v.clone())).collect(),
            locations: self.locations.iter().map(|(k, v)| (*k, v.clone())).collect(),
        }
    }

    /// Rebuild a ledger from a snapshot. Location membership is rebuilt from
    /// the items so occupancy always matches.
    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Self {
        let mut locations: HashMap<Uuid, StockLocation> = snapshot
            .locations
            .into_iter()
            .map(|(id, mut location)| {
                for item_id in std::mem::take(&mut location.items) {
                    location.remove_item(item_id);
                }
                (id, location)
            })
            .collect();
        for item in snapshot.items.values() {
            if let Some(location) = item.location_id.and_then(|id| locations.get_mut(&id)) {
                location.insert_item(item.id);
            }
        }

        let transaction_index = snapshot
            .transactions
            .iter()
            .enumerate()
            .map(|(idx, tx)| (tx.id, idx))
            .collect();

        Self {
            document_sequence: snapshot.purchase_orders.len() as u32,
            items: snapshot.items.into_iter().collect(),
            archived_items: snapshot.archived_items.into_iter().collect(),
            transactions: snapshot.transactions,
            transaction_index,
            suppliers: snapshot.suppliers.into_iter().collect(),
            purchase_orders: snapshot.purchase_orders.into_iter().collect(),
            alerts: snapshot.alerts.into_iter().collect(),
            locations,
        }
    }
}
