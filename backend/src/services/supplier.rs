//! Supplier management service

use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::error::{check, AppError, AppResult};
use crate::models::{Supplier, SupplierStatus};
use crate::services::query::{filter_suppliers, SupplierQuery};
use crate::services::store::LedgerStore;
use shared::validation::{validate_email, validate_phone, validate_reliability};

/// Input for creating a supplier
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSupplierInput {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[serde(default = "default_payment_terms")]
    pub payment_terms: String,
    #[serde(default)]
    pub delivery_time: u32,
    #[serde(default)]
    pub reliability: u8,
    #[serde(default)]
    pub preferred_for_categories: Vec<String>,
    #[serde(default)]
    pub status: SupplierStatus,
}

fn default_payment_terms() -> String {
    "Net 30".to_string()
}

/// Input for updating a supplier. Absent fields stay unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateSupplierInput {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub payment_terms: Option<String>,
    pub delivery_time: Option<u32>,
    pub reliability: Option<u8>,
    pub preferred_for_categories: Option<Vec<String>>,
    pub status: Option<SupplierStatus>,
}

fn check_contact(email: Option<&str>, phone: Option<&str>) -> AppResult<()> {
    if let Some(email) = email {
        check("email", validate_email(email))?;
    }
    if let Some(phone) = phone {
        check("phone", validate_phone(phone))?;
    }
    Ok(())
}

/// Supplier service
#[derive(Clone)]
pub struct SupplierService {
    store: LedgerStore,
}

impl SupplierService {
    pub fn new(store: LedgerStore) -> Self {
        Self { store }
    }

    pub async fn create(&self, input: CreateSupplierInput) -> AppResult<Supplier> {
        input.validate()?;
        check_contact(input.email.as_deref(), input.phone.as_deref())?;
        check("reliability", validate_reliability(input.reliability))?;

        let now = Utc::now();
        let supplier = Supplier {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            contact_person: input.contact_person,
            email: input.email,
            phone: input.phone,
            address: input.address,
            payment_terms: input.payment_terms,
            delivery_time: input.delivery_time,
            reliability: input.reliability,
            preferred_for_categories: input.preferred_for_categories,
            status: input.status,
            created_at: now,
            updated_at: now,
        };

        let mut ledger = self.store.write().await;
        ledger.add_supplier(supplier.clone())?;
        self.store.persist_after_mutation(&ledger).await?;

        tracing::info!("Created supplier {} ({})", supplier.name, supplier.id);
        Ok(supplier)
    }

    pub async fn get(&self, supplier_id: Uuid) -> AppResult<Supplier> {
        let ledger = self.store.read().await;
        ledger
            .supplier(supplier_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Supplier".to_string()))
    }

    pub async fn list(&self, query: &SupplierQuery) -> AppResult<Vec<Supplier>> {
        let ledger = self.store.read().await;
        filter_suppliers(&ledger, query)
    }

    pub async fn update(&self, supplier_id: Uuid, input: UpdateSupplierInput) -> AppResult<Supplier> {
        input.validate()?;
        check_contact(input.email.as_deref(), input.phone.as_deref())?;
        if let Some(reliability) = input.reliability {
            check("reliability", validate_reliability(reliability))?;
        }

        let mut ledger = self.store.write().await;
        let mut supplier = ledger
            .supplier(supplier_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Supplier".to_string()))?;

        if let Some(name) = input.name {
            supplier.name = name.trim().to_string();
        }
        if input.contact_person.is_some() {
            supplier.contact_person = input.contact_person;
        }
        if input.email.is_some() {
            supplier.email = input.email;
        }
        if input.phone.is_some() {
            supplier.phone = input.phone;
        }
        if input.address.is_some() {
            supplier.address = input.address;
        }
        if let Some(terms) = input.payment_terms {
            supplier.payment_terms = terms;
        }
        if let Some(days) = input.delivery_time {
            supplier.delivery_time = days;
        }
        if let Some(reliability) = input.reliability {
            supplier.reliability = reliability;
        }
        if let Some(categories) = input.preferred_for_categories {
            supplier.preferred_for_categories = categories;
        }
        if let Some(status) = input.status {
            supplier.status = status;
        }
        supplier.updated_at = Utc::now();

        ledger.update_supplier(supplier.clone())?;
        self.store.persist_after_mutation(&ledger).await?;

        tracing::info!("Updated supplier {}", supplier.id);
        Ok(supplier)
    }
}
