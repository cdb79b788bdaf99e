//! Purchase order models and lifecycle rules

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A supplier order moving through draft -> sent -> confirmed -> received
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PurchaseOrder {
    pub id: Uuid,
    /// Unique display id, e.g. "PO-2026-0007"
    pub document_number: String,
    pub supplier_id: Uuid,
    pub status: PurchaseOrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expected_delivery: Option<DateTime<Utc>>,
    pub actual_delivery: Option<DateTime<Utc>>,
    pub lines: Vec<PurchaseOrderLine>,
    /// Always the sum of line totals
    pub total_value: Decimal,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
}

impl PurchaseOrder {
    /// Swap the line items and keep the order total consistent
    pub fn set_lines(&mut self, lines: Vec<PurchaseOrderLine>) {
        self.total_value = calculate_order_total(&lines);
        self.lines = lines;
    }

    pub fn references_item(&self, item_id: Uuid) -> bool {
        self.lines.iter().any(|line| line.item_id == item_id)
    }
}

/// One ordered item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PurchaseOrderLine {
    pub item_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    /// Always `quantity * unit_price`
    pub total_price: Decimal,
}

impl PurchaseOrderLine {
    pub fn new(item_id: Uuid, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            item_id,
            quantity,
            unit_price,
            total_price: quantity.checked_mul(unit_price).unwrap_or(Decimal::MAX),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseOrderStatus {
    #[default]
    Draft,
    Sent,
    Confirmed,
    Received,
    Cancelled,
}

impl PurchaseOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseOrderStatus::Draft => "draft",
            PurchaseOrderStatus::Sent => "sent",
            PurchaseOrderStatus::Confirmed => "confirmed",
            PurchaseOrderStatus::Received => "received",
            PurchaseOrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PurchaseOrderStatus::Received | PurchaseOrderStatus::Cancelled
        )
    }

    /// Forward-only transition table. Receiving straight from `sent` is allowed.
    pub fn can_transition_to(&self, next: PurchaseOrderStatus) -> bool {
        use PurchaseOrderStatus::*;
        matches!(
            (self, next),
            (Draft, Sent)
                | (Sent, Confirmed)
                | (Sent, Received)
                | (Confirmed, Received)
                | (Draft, Cancelled)
                | (Sent, Cancelled)
                | (Confirmed, Cancelled)
        )
    }

    pub fn transition(self, next: PurchaseOrderStatus) -> Result<Self, TransitionError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(TransitionError {
                from: self,
                to: next,
            })
        }
    }
}

impl std::fmt::Display for PurchaseOrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PurchaseOrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(PurchaseOrderStatus::Draft),
            "sent" => Ok(PurchaseOrderStatus::Sent),
            "confirmed" => Ok(PurchaseOrderStatus::Confirmed),
            "received" => Ok(PurchaseOrderStatus::Received),
            "cancelled" | "canceled" => Ok(PurchaseOrderStatus::Cancelled),
            _ => Err(format!("Unknown purchase order status: {}", s)),
        }
    }
}

/// Rejected purchase order status change
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("cannot move purchase order from {from} to {to}")]
pub struct TransitionError {
    pub from: PurchaseOrderStatus,
    pub to: PurchaseOrderStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Overdue,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Overdue => "overdue",
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            "overdue" => Ok(PaymentStatus::Overdue),
            _ => Err(format!("Unknown payment status: {}", s)),
        }
    }
}

pub fn calculate_order_total(lines: &[PurchaseOrderLine]) -> Decimal {
    lines.iter().fold(Decimal::ZERO, |total, line| {
        total.checked_add(line.total_price).unwrap_or(Decimal::MAX)
    })
}

/// Generate a purchase order document number
pub fn generate_document_number(year: i32, sequence: u32) -> String {
    format!("PO-{}-{:04}", year, sequence)
}
