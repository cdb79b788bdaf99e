//! Shared fixtures for the ledger integration tests

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use stock_backend::models::{
    Actor, LocationType, StockItem, StockLocation, Supplier, SupplierStatus, TransactionType,
};
use stock_backend::services::inventory::{create_item, CreateItemInput};
use stock_backend::services::processor::{apply_transaction, AppliedTransaction, TransactionRequest};
use stock_backend::{AppResult, InventorySettings, Ledger};

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// Fixed clock for deterministic derivations
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap()
}

pub fn days_ago(days: i64) -> DateTime<Utc> {
    now() - Duration::days(days)
}

pub fn settings() -> InventorySettings {
    InventorySettings::default()
}

pub fn chef() -> Actor {
    Actor::new(None, "chef")
}

pub fn item_input(name: &str, category: &str, quantity: &str, minimum: &str) -> CreateItemInput {
    CreateItemInput {
        id: None,
        name: name.to_string(),
        category: category.to_string(),
        quantity: dec(quantity),
        unit: "kg".to_string(),
        unit_price: dec("2"),
        supplier_id: None,
        location_id: None,
        minimum_stock: dec(minimum),
        optimum_stock: None,
        expiry_date: None,
        tags: Vec::new(),
        is_perishable: false,
        alert_threshold: None,
    }
}

pub fn add_item(ledger: &mut Ledger, name: &str, quantity: &str, minimum: &str) -> StockItem {
    create_item(
        ledger,
        &item_input(name, "Produce", quantity, minimum),
        &chef(),
        &settings(),
        now(),
    )
    .unwrap()
}

pub fn add_supplier(ledger: &mut Ledger, name: &str, status: SupplierStatus) -> Supplier {
    let supplier = Supplier {
        id: Uuid::new_v4(),
        name: name.to_string(),
        contact_person: None,
        email: None,
        phone: None,
        address: None,
        payment_terms: "Net 30".to_string(),
        delivery_time: 2,
        reliability: 4,
        preferred_for_categories: vec!["Produce".to_string()],
        status,
        created_at: now(),
        updated_at: now(),
    };
    ledger.add_supplier(supplier.clone()).unwrap();
    supplier
}

pub fn add_location(ledger: &mut Ledger, name: &str, capacity: u32) -> StockLocation {
    let location = StockLocation::new(
        Uuid::new_v4(),
        name.to_string(),
        LocationType::Refrigerator,
        capacity,
    );
    ledger.add_location(location.clone()).unwrap();
    location
}

pub fn apply(
    ledger: &mut Ledger,
    item_id: Uuid,
    transaction_type: TransactionType,
    quantity: &str,
) -> AppResult<AppliedTransaction> {
    apply_at(ledger, item_id, transaction_type, quantity, now())
}

pub fn apply_at(
    ledger: &mut Ledger,
    item_id: Uuid,
    transaction_type: TransactionType,
    quantity: &str,
    at: DateTime<Utc>,
) -> AppResult<AppliedTransaction> {
    let request = TransactionRequest::new(transaction_type, dec(quantity));
    apply_transaction(ledger, item_id, &request, &chef(), &settings(), at)
}
