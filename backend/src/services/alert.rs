//! Status & alert engine
//!
//! Re-derives item status and scans the item set for conditions that need
//! attention. Scans are idempotent: alert ids are stable per item, type and
//! day, and an existing unread alert of the same type suppresses a new one.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::config::InventorySettings;
use crate::error::{AppError, AppResult};
use crate::models::{
    is_expired, is_expiring, is_low_stock, AlertSeverity, AlertType, StockAlert, StockItem,
};
use crate::services::ledger::Ledger;
use crate::services::processor::out_quantity_since;
use crate::services::query::{filter_alerts, AlertQuery};
use crate::services::store::LedgerStore;

/// Re-derive status and value of every active item at `now`
pub fn refresh_statuses(ledger: &mut Ledger, now: DateTime<Utc>) {
    for item in ledger.items_mut() {
        item.refresh_derived(now);
    }
}

/// Scan all active items and store the alerts that are not already covered.
/// Returns only the newly created alerts.
pub fn scan(ledger: &mut Ledger, settings: &InventorySettings, now: DateTime<Utc>) -> Vec<StockAlert> {
    let view: &Ledger = ledger;
    let candidates: Vec<StockAlert> = view
        .items()
        .flat_map(|item| candidate_alerts(view, item, settings, now))
        .collect();

    let mut raised: Vec<StockAlert> = candidates
        .into_iter()
        .filter_map(|alert| raise(ledger, alert))
        .collect();
    raised.sort_by(|a, b| b.severity.cmp(&a.severity).then(a.id.cmp(&b.id)));
    raised
}

/// Refresh statuses then scan; run after every ledger mutation
pub fn refresh_and_scan(
    ledger: &mut Ledger,
    settings: &InventorySettings,
    now: DateTime<Utc>,
) -> Vec<StockAlert> {
    refresh_statuses(ledger, now);
    let raised = scan(ledger, settings, now);
    if !raised.is_empty() {
        tracing::info!("Raised {} new stock alert(s)", raised.len());
    }
    raised
}

/// Store `alert` unless an equivalent one already covers it
pub fn raise(ledger: &mut Ledger, alert: StockAlert) -> Option<StockAlert> {
    let day = alert.date.date_naive();
    if ledger
        .alerts()
        .any(|existing| existing.covers(alert.alert_type, alert.item_id, day))
    {
        return None;
    }
    if !ledger.add_alert(alert.clone()) {
        return None;
    }
    tracing::debug!(
        "{} alert for item {}: {}",
        alert.alert_type,
        alert.item_id,
        alert.message
    );
    Some(alert)
}

fn candidate_alerts(
    ledger: &Ledger,
    item: &StockItem,
    settings: &InventorySettings,
    now: DateTime<Utc>,
) -> Vec<StockAlert> {
    let mut alerts = Vec::new();

    if is_low_stock(item.quantity, item.minimum_stock, item.alert_threshold) {
        alerts.push(StockAlert::new(
            AlertType::LowStock,
            item.id,
            format!(
                "{} is running low: {} {} left (minimum {})",
                item.name, item.quantity, item.unit, item.minimum_stock
            ),
            AlertSeverity::Warning,
            now,
        ));
    }

    if let Some(expiry) = item.expiry_date {
        if is_expired(item.expiry_date, now) {
            alerts.push(StockAlert::new(
                AlertType::Expired,
                item.id,
                format!("{} expired on {}", item.name, expiry.format("%Y-%m-%d")),
                AlertSeverity::Critical,
                now,
            ));
        } else if is_expiring(item.expiry_date, now, settings.expiry_warning_days) {
            alerts.push(StockAlert::new(
                AlertType::Expiring,
                item.id,
                format!("{} expires on {}", item.name, expiry.format("%Y-%m-%d")),
                AlertSeverity::Warning,
                now,
            ));
        }
    }

    if item.usage_rate > Decimal::ZERO {
        let last_day = out_quantity_since(ledger.transactions_for(item.id), now - Duration::hours(24));
        if is_usage_spike(last_day, item.usage_rate, settings.usage_spike_factor) {
            alerts.push(StockAlert::new(
                AlertType::UsageSpike,
                item.id,
                format!(
                    "{} used {} {} in the last 24h against a daily average of {}",
                    item.name, last_day, item.unit, item.usage_rate
                ),
                AlertSeverity::Info,
                now,
            ));
        }
    }

    alerts
}

/// Last-24h usage above `factor` times the daily average
pub fn is_usage_spike(last_day: Decimal, usage_rate: Decimal, factor: u32) -> bool {
    usage_rate > Decimal::ZERO && last_day > usage_rate * Decimal::from(factor)
}

/// Relative price change in percent; `None` when there was no previous price
pub fn price_change_percent(old_price: Decimal, new_price: Decimal) -> Option<Decimal> {
    if old_price.is_zero() {
        return None;
    }
    Some(((new_price - old_price).abs() / old_price * Decimal::ONE_HUNDRED).round_dp(2))
}

/// Build a price-change alert when the change reaches the configured threshold.
/// Twice the threshold escalates to a warning.
pub fn price_change_alert(
    item: &StockItem,
    old_price: Decimal,
    settings: &InventorySettings,
    now: DateTime<Utc>,
) -> Option<StockAlert> {
    let change = price_change_percent(old_price, item.unit_price)?;
    let threshold = Decimal::from(settings.price_change_percent);
    if change < threshold {
        return None;
    }
    let severity = if change >= threshold * Decimal::TWO {
        AlertSeverity::Warning
    } else {
        AlertSeverity::Info
    };
    let verb = if item.unit_price > old_price { "rose" } else { "fell" };
    Some(StockAlert::new(
        AlertType::PriceChange,
        item.id,
        format!(
            "Unit price of {} {} {}% from {} to {}",
            item.name, verb, change, old_price, item.unit_price
        ),
        severity,
        now,
    ))
}

/// Alert service for listing and acknowledging alerts
#[derive(Clone)]
pub struct AlertService {
    store: LedgerStore,
    settings: InventorySettings,
}

impl AlertService {
    pub fn new(store: LedgerStore, settings: InventorySettings) -> Self {
        Self { store, settings }
    }

    pub async fn list(&self, query: &AlertQuery) -> AppResult<Vec<StockAlert>> {
        let ledger = self.store.read().await;
        filter_alerts(&ledger, query)
    }

    /// Run the scan on demand and return only new alerts
    pub async fn scan(&self) -> AppResult<Vec<StockAlert>> {
        let mut ledger = self.store.write().await;
        let raised = refresh_and_scan(&mut ledger, &self.settings, Utc::now());
        self.store.persist_after_mutation(&ledger).await?;
        Ok(raised)
    }

    pub async fn mark_read(&self, alert_id: Uuid) -> AppResult<StockAlert> {
        let mut ledger = self.store.write().await;
        let alert = ledger
            .alert_mut(alert_id)
            .ok_or_else(|| AppError::NotFound("Alert".to_string()))?;
        alert.is_read = true;
        let alert = alert.clone();
        self.store.persist_after_mutation(&ledger).await?;
        Ok(alert)
    }

    /// Returns the number of alerts that changed
    pub async fn mark_all_read(&self) -> AppResult<usize> {
        let mut ledger = self.store.write().await;
        let mut changed = 0;
        for alert in ledger.alerts_mut().filter(|a| !a.is_read) {
            alert.is_read = true;
            changed += 1;
        }
        self.store.persist_after_mutation(&ledger).await?;
        tracing::info!("Marked {} alert(s) as read", changed);
        Ok(changed)
    }

    pub async fn remove(&self, alert_id: Uuid) -> AppResult<()> {
        let mut ledger = self.store.write().await;
        ledger.remove_alert(alert_id)?;
        self.store.persist_after_mutation(&ledger).await?;
        tracing::info!("Removed alert {}", alert_id);
        Ok(())
    }
}
