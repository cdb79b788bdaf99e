//! Supplier models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A vendor that stock items and purchase orders refer to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// Free-form terms, e.g. "Net 30"
    pub payment_terms: String,
    /// Typical delivery lead time in days
    pub delivery_time: u32,
    /// 0-100
    pub reliability: u8,
    pub preferred_for_categories: Vec<String>,
    pub status: SupplierStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Supplier {
    pub fn is_active(&self) -> bool {
        self.status == SupplierStatus::Active
    }

    pub fn is_preferred_for(&self, category: &str) -> bool {
        self.preferred_for_categories
            .iter()
            .any(|c| c.eq_ignore_ascii_case(category))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SupplierStatus {
    #[default]
    Active,
    Inactive,
}

impl SupplierStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupplierStatus::Active => "active",
            SupplierStatus::Inactive => "inactive",
        }
    }
}

impl std::str::FromStr for SupplierStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(SupplierStatus::Active),
            "inactive" => Ok(SupplierStatus::Inactive),
            _ => Err(format!("Unknown supplier status: {}", s)),
        }
    }
}
