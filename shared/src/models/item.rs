//! Stock item models and status derivation

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A trackable inventory unit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockItem {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub quantity: Decimal,
    /// Unit of measure (kg, l, bottle, ...)
    pub unit: String,
    pub unit_price: Decimal,
    /// Always `quantity * unit_price`
    pub total_value: Decimal,
    pub supplier_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub minimum_stock: Decimal,
    pub optimum_stock: Decimal,
    pub expiry_date: Option<DateTime<Utc>>,
    pub last_restocked: DateTime<Utc>,
    pub status: StockStatus,
    pub tags: BTreeSet<String>,
    /// Average daily `out` quantity over the trailing usage window
    pub usage_rate: Decimal,
    pub is_perishable: bool,
    /// Percentage of `minimum_stock` at which a low-stock alert fires
    pub alert_threshold: Decimal,
    /// Incremented on every change, used for optimistic concurrency
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StockItem {
    /// Re-derive `total_value` and `status` from the current fields
    pub fn refresh_derived(&mut self, now: DateTime<Utc>) {
        self.total_value = calculate_total_value(self.quantity, self.unit_price);
        self.status = derive_status(self.quantity, self.minimum_stock, self.expiry_date, now);
    }

    /// Mark the item as changed at `now`
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.refresh_derived(now);
        self.version += 1;
        self.updated_at = now;
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// Derived stock-health classification of an item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
    Expired,
    /// Never produced by [`derive_status`]; reserved for purchase-order linkage
    Ordered,
}

impl StockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::InStock => "in-stock",
            StockStatus::LowStock => "low-stock",
            StockStatus::OutOfStock => "out-of-stock",
            StockStatus::Expired => "expired",
            StockStatus::Ordered => "ordered",
        }
    }
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StockStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "in-stock" => Ok(StockStatus::InStock),
            "low-stock" => Ok(StockStatus::LowStock),
            "out-of-stock" => Ok(StockStatus::OutOfStock),
            "expired" => Ok(StockStatus::Expired),
            "ordered" => Ok(StockStatus::Ordered),
            _ => Err(format!("Unknown stock status: {}", s)),
        }
    }
}

/// Derive the status of an item, first matching rule wins:
/// empty, expired, at or below minimum, otherwise in stock.
pub fn derive_status(
    quantity: Decimal,
    minimum_stock: Decimal,
    expiry_date: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> StockStatus {
    if quantity.is_zero() {
        return StockStatus::OutOfStock;
    }
    if is_expired(expiry_date, now) {
        return StockStatus::Expired;
    }
    if quantity <= minimum_stock {
        return StockStatus::LowStock;
    }
    StockStatus::InStock
}

/// Calculate the held value of an item
pub fn calculate_total_value(quantity: Decimal, unit_price: Decimal) -> Decimal {
    quantity.checked_mul(unit_price).unwrap_or(Decimal::MAX)
}

/// Low-stock alert rule: `quantity <= minimum_stock * threshold% / 100`
pub fn is_low_stock(quantity: Decimal, minimum_stock: Decimal, alert_threshold: Decimal) -> bool {
    minimum_stock
        .checked_mul(alert_threshold)
        .map_or(true, |scaled| quantity <= scaled / Decimal::ONE_HUNDRED)
}

pub fn is_expired(expiry_date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    matches!(expiry_date, Some(expiry) if expiry < now)
}

/// Expiry falls in `(now, now + warning_days]`
pub fn is_expiring(expiry_date: Option<DateTime<Utc>>, now: DateTime<Utc>, warning_days: i64) -> bool {
    match expiry_date {
        Some(expiry) => expiry > now && expiry <= now + Duration::days(warning_days),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_zero_quantity_is_out_of_stock_even_when_expired() {
        let expired = Some(now() - Duration::days(1));
        assert_eq!(
            derive_status(Decimal::ZERO, Decimal::from(5), expired, now()),
            StockStatus::OutOfStock
        );
    }

    #[test]
    fn test_expired_wins_over_low_stock() {
        let expired = Some(now() - Duration::hours(1));
        assert_eq!(
            derive_status(Decimal::from(2), Decimal::from(5), expired, now()),
            StockStatus::Expired
        );
    }

    #[test]
    fn test_minimum_boundary_is_low_stock() {
        assert_eq!(
            derive_status(Decimal::from(5), Decimal::from(5), None, now()),
            StockStatus::LowStock
        );
        assert_eq!(
            derive_status(Decimal::from(6), Decimal::from(5), None, now()),
            StockStatus::InStock
        );
    }

    #[test]
    fn test_future_expiry_does_not_expire() {
        let expiry = Some(now() + Duration::days(30));
        assert_eq!(
            derive_status(Decimal::from(20), Decimal::from(5), expiry, now()),
            StockStatus::InStock
        );
    }

    #[test]
    fn test_low_stock_threshold_percent() {
        // 50% of a minimum of 10 is 5
        assert!(is_low_stock(Decimal::from(5), Decimal::from(10), Decimal::from(50)));
        assert!(!is_low_stock(Decimal::from(6), Decimal::from(10), Decimal::from(50)));
    }

    #[test]
    fn test_expiring_window_is_half_open() {
        assert!(!is_expiring(Some(now()), now(), 7));
        assert!(is_expiring(Some(now() + Duration::days(7)), now(), 7));
        assert!(!is_expiring(Some(now() + Duration::days(7) + Duration::seconds(1)), now(), 7));
        assert!(!is_expiring(None, now(), 7));
    }

    #[test]
    fn test_status_parse_and_serialize() {
        assert_eq!("low_stock".parse::<StockStatus>().unwrap(), StockStatus::LowStock);
        assert_eq!("Out-Of-Stock".parse::<StockStatus>().unwrap(), StockStatus::OutOfStock);
        assert!("missing".parse::<StockStatus>().is_err());
        assert_eq!(
            serde_json::to_string(&StockStatus::InStock).unwrap(),
            "\"in-stock\""
        );
    }
}
