//! Stock transaction models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An immutable record of a quantity change applied to an item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockTransaction {
    pub id: Uuid,
    pub transaction_type: TransactionType,
    pub item_id: Uuid,
    /// Always positive; the direction follows from the type
    pub quantity: Decimal,
    pub date: DateTime<Utc>,
    pub user_id: Option<Uuid>,
    pub user_name: String,
    pub reason: Option<String>,
    /// `quantity * unit_price` at the time of the transaction
    pub cost: Decimal,
    /// Location the item left (transfer only)
    pub source: Option<Uuid>,
    /// Location the item moved to (transfer only)
    pub destination: Option<Uuid>,
    pub waste_reason: Option<WasteReason>,
    pub adjustment_direction: Option<AdjustmentDirection>,
    /// External document that caused the movement, e.g. a purchase order number
    pub reference: Option<String>,
}

impl StockTransaction {
    /// Signed change this transaction made to the item quantity
    pub fn quantity_delta(&self) -> Decimal {
        match self.transaction_type {
            TransactionType::In => self.quantity,
            TransactionType::Out | TransactionType::Transfer | TransactionType::Waste => {
                -self.quantity
            }
            TransactionType::Adjustment => match self.adjustment_direction {
                Some(AdjustmentDirection::Decrease) => -self.quantity,
                _ => self.quantity,
            },
        }
    }
}

/// Types of stock transactions
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    In,
    Out,
    Adjustment,
    Transfer,
    Waste,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::In => "in",
            TransactionType::Out => "out",
            TransactionType::Adjustment => "adjustment",
            TransactionType::Transfer => "transfer",
            TransactionType::Waste => "waste",
        }
    }

    /// Types that draw down the current quantity and must be covered by it
    pub fn consumes_stock(&self) -> bool {
        matches!(
            self,
            TransactionType::Out | TransactionType::Transfer | TransactionType::Waste
        )
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "in" => Ok(TransactionType::In),
            "out" => Ok(TransactionType::Out),
            "adjustment" => Ok(TransactionType::Adjustment),
            "transfer" => Ok(TransactionType::Transfer),
            "waste" => Ok(TransactionType::Waste),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

/// Direction of an adjustment relative to the previous quantity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentDirection {
    Increase,
    Decrease,
}

impl AdjustmentDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustmentDirection::Increase => "increase",
            AdjustmentDirection::Decrease => "decrease",
        }
    }
}

/// Why stock was thrown away
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[serde(rename_all = "lowercase")]
pub enum WasteReason {
    Expired,
    Damaged,
    Spoiled,
    Overproduction,
    #[default]
    Other,
}

impl WasteReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            WasteReason::Expired => "expired",
            WasteReason::Damaged => "damaged",
            WasteReason::Spoiled => "spoiled",
            WasteReason::Overproduction => "overproduction",
            WasteReason::Other => "other",
        }
    }
}

/// Rebuild a quantity by folding transactions from zero, in log order
pub fn replay_quantity<'a, I>(transactions: I) -> Decimal
where
    I: IntoIterator<Item = &'a StockTransaction>,
{
    transactions
        .into_iter()
        .fold(Decimal::ZERO, |acc, tx| acc + tx.quantity_delta())
}
