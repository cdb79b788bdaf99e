//! Stock alert models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Namespace for deterministic alert ids
pub const ALERT_NAMESPACE: Uuid = Uuid::from_u128(0x6b1f_3c2e_9a4d_4e0b_8f7a_2d5c_1e90_b3a4);

/// A system-generated notice about an item needing attention
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockAlert {
    pub id: Uuid,
    pub alert_type: AlertType,
    pub item_id: Uuid,
    pub message: String,
    pub severity: AlertSeverity,
    pub date: DateTime<Utc>,
    pub is_read: bool,
}

impl StockAlert {
    pub fn new(
        alert_type: AlertType,
        item_id: Uuid,
        message: String,
        severity: AlertSeverity,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: alert_id(alert_type, item_id, date.date_naive()),
            alert_type,
            item_id,
            message,
            severity,
            date,
            is_read: false,
        }
    }

    /// Whether this alert suppresses a new `alert_type` alert for `item_id` on `day`
    pub fn covers(&self, alert_type: AlertType, item_id: Uuid, day: NaiveDate) -> bool {
        self.alert_type == alert_type
            && self.item_id == item_id
            && (!self.is_read || self.date.date_naive() == day)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum AlertType {
    LowStock,
    Expiring,
    Expired,
    PriceChange,
    UsageSpike,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::LowStock => "low-stock",
            AlertType::Expiring => "expiring",
            AlertType::Expired => "expired",
            AlertType::PriceChange => "price-change",
            AlertType::UsageSpike => "usage-spike",
        }
    }
}

impl std::fmt::Display for AlertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AlertType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "low-stock" => Ok(AlertType::LowStock),
            "expiring" => Ok(AlertType::Expiring),
            "expired" => Ok(AlertType::Expired),
            "price-change" => Ok(AlertType::PriceChange),
            "usage-spike" => Ok(AlertType::UsageSpike),
            _ => Err(format!("Unknown alert type: {}", s)),
        }
    }
}

/// Ordered from least to most urgent
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Info => "info",
            AlertSeverity::Warning => "warning",
            AlertSeverity::Critical => "critical",
        }
    }
}

impl std::str::FromStr for AlertSeverity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "info" => Ok(AlertSeverity::Info),
            "warning" => Ok(AlertSeverity::Warning),
            "critical" => Ok(AlertSeverity::Critical),
            _ => Err(format!("Unknown alert severity: {}", s)),
        }
    }
}

/// Stable per-day alert id: the same item, type and day always map to the same id
pub fn alert_id(alert_type: AlertType, item_id: Uuid, day: NaiveDate) -> Uuid {
    let key = format!("{}:{}:{}", alert_type.as_str(), item_id, day.format("%Y-%m-%d"));
    Uuid::new_v5(&ALERT_NAMESPACE, key.as_bytes())
}
