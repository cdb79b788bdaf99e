//! Analytics snapshot models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::WasteReason;

/// Read-only projection over items, transactions and suppliers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockAnalytics {
    pub generated_at: DateTime<Utc>,
    pub total_value: Decimal,
    pub total_items: usize,
    pub low_stock_items: usize,
    pub out_of_stock_items: usize,
    pub expired_items: usize,
    pub pending_purchase_orders: usize,
    pub turnover_rate: Decimal,
    pub most_used_items: Vec<ItemUsage>,
    pub least_used_items: Vec<ItemUsage>,
    pub category_breakdown: Vec<CategoryBreakdown>,
    pub monthly_spending: Vec<MonthlySpending>,
    pub waste_analysis: Vec<WasteBreakdown>,
    pub supplier_performance: Vec<SupplierPerformance>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemUsage {
    pub item_id: Uuid,
    pub name: String,
    /// Summed `out` quantity over the usage window
    pub quantity_used: Decimal,
    pub unit: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryBreakdown {
    pub category: String,
    pub item_count: usize,
    pub total_value: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlySpending {
    /// "YYYY-MM"
    pub month: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WasteBreakdown {
    pub reason: WasteReason,
    pub count: usize,
    pub total_cost: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SupplierPerformance {
    pub supplier_id: Uuid,
    pub name: String,
    pub reliability: u8,
    pub delivery_time: u32,
}

/// Recent consumption over average held quantity; zero when nothing is held
pub fn calculate_turnover_rate(total_out: Decimal, mean_quantity: Decimal) -> Decimal {
    if mean_quantity.is_zero() {
        return Decimal::ZERO;
    }
    total_out.checked_div(mean_quantity).unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turnover_rate() {
        assert_eq!(
            calculate_turnover_rate(Decimal::from(30), Decimal::from(15)),
            Decimal::from(2)
        );
        assert_eq!(
            calculate_turnover_rate(Decimal::from(30), Decimal::ZERO),
            Decimal::ZERO
        );
    }
}
