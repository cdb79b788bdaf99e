//! Analytics aggregator: a read-only projection over the ledger

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::config::InventorySettings;
use crate::error::AppResult;
use crate::models::{
    calculate_turnover_rate, CategoryBreakdown, ItemUsage, MonthlySpending, PurchaseOrderStatus,
    StockAnalytics, StockItem, StockStatus, SupplierPerformance, TransactionType,
    WasteBreakdown, WasteReason,
};
use crate::services::ledger::Ledger;
use crate::services::store::LedgerStore;

/// Compute the analytics snapshot at `now`. Item status is derived fresh.
pub fn compute_analytics(
    ledger: &Ledger,
    settings: &InventorySettings,
    now: DateTime<Utc>,
) -> StockAnalytics {
    let items: Vec<StockItem> = ledger
        .items()
        .cloned()
        .map(|mut item| {
            item.refresh_derived(now);
            item
        })
        .collect();

    let count_status = |status: StockStatus| items.iter().filter(|i| i.status == status).count();

    let window_start = now - Duration::days(settings.usage_window_days);
    let usage = usage_by_item(ledger, window_start, now);
    let total_out: Decimal = usage.values().copied().sum();

    let mean_quantity = if items.is_empty() {
        Decimal::ZERO
    } else {
        items.iter().map(|i| i.quantity).sum::<Decimal>() / Decimal::from(items.len())
    };

    let (most_used_items, least_used_items) = usage_rankings(&items, &usage, settings.ranking_size);

    StockAnalytics {
        generated_at: now,
        total_value: items.iter().map(|i| i.total_value).sum(),
        total_items: items.len(),
        low_stock_items: count_status(StockStatus::LowStock),
        out_of_stock_items: count_status(StockStatus::OutOfStock),
        expired_items: count_status(StockStatus::Expired),
        pending_purchase_orders: ledger
            .purchase_orders()
            .filter(|po| {
                matches!(
                    po.status,
                    PurchaseOrderStatus::Draft
                        | PurchaseOrderStatus::Sent
                        | PurchaseOrderStatus::Confirmed
                )
            })
            .count(),
        turnover_rate: calculate_turnover_rate(total_out, mean_quantity).round_dp(4),
        most_used_items,
        least_used_items,
        category_breakdown: category_breakdown(&items),
        monthly_spending: monthly_spending(ledger, now, settings.spending_months),
        waste_analysis: waste_analysis(ledger),
        supplier_performance: supplier_performance(ledger),
    }
}

/// Summed `out` quantity per item over `[since, now]`
fn usage_by_item(ledger: &Ledger, since: DateTime<Utc>, now: DateTime<Utc>) -> HashMap<Uuid, Decimal> {
    let mut usage: HashMap<Uuid, Decimal> = HashMap::new();
    for tx in ledger.transactions().iter().filter(|tx| {
        tx.transaction_type == TransactionType::Out && tx.date >= since && tx.date <= now
    }) {
        *usage.entry(tx.item_id).or_default() += tx.quantity;
    }
    usage
}

/// Most used excludes items with no usage; least used ranks every active item.
/// Ties break on name.
fn usage_rankings(
    items: &[StockItem],
    usage: &HashMap<Uuid, Decimal>,
    size: usize,
) -> (Vec<ItemUsage>, Vec<ItemUsage>) {
    let mut ranked: Vec<ItemUsage> = items
        .iter()
        .map(|item| ItemUsage {
            item_id: item.id,
            name: item.name.clone(),
            quantity_used: usage.get(&item.id).copied().unwrap_or_default(),
            unit: item.unit.clone(),
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.quantity_used
            .cmp(&a.quantity_used)
            .then_with(|| a.name.cmp(&b.name))
    });
    let most_used = ranked
        .iter()
        .filter(|u| u.quantity_used > Decimal::ZERO)
        .take(size)
        .cloned()
        .collect();

    ranked.sort_by(|a, b| {
        a.quantity_used
            .cmp(&b.quantity_used)
            .then_with(|| a.name.cmp(&b.name))
    });
    ranked.truncate(size);
    (most_used, ranked)
}

fn category_breakdown(items: &[StockItem]) -> Vec<CategoryBreakdown> {
    let mut categories: BTreeMap<&str, (usize, Decimal)> = BTreeMap::new();
    for item in items {
        let entry = categories.entry(item.category.as_str()).or_default();
        entry.0 += 1;
        entry.1 += item.total_value;
    }
    categories
        .into_iter()
        .map(|(category, (item_count, total_value))| CategoryBreakdown {
            category: category.to_string(),
            item_count,
            total_value,
        })
        .collect()
}

/// Calendar months ending with the current one, oldest first, as "YYYY-MM"
pub fn trailing_months(now: DateTime<Utc>, count: u32) -> Vec<String> {
    let mut year = now.year();
    let mut month = now.month();
    let mut months = Vec::with_capacity(count as usize);
    for _ in 0..count {
        months.push(format!("{:04}-{:02}", year, month));
        if month == 1 {
            month = 12;
            year -= 1;
        } else {
            month -= 1;
        }
    }
    months.reverse();
    months
}

/// Cost of `in` transactions per trailing calendar month
fn monthly_spending(ledger: &Ledger, now: DateTime<Utc>, months: u32) -> Vec<MonthlySpending> {
    let mut buckets: BTreeMap<String, Decimal> = trailing_months(now, months)
        .into_iter()
        .map(|month| (month, Decimal::ZERO))
        .collect();
    for tx in ledger
        .transactions()
        .iter()
        .filter(|tx| tx.transaction_type == TransactionType::In)
    {
        if let Some(amount) = buckets.get_mut(&tx.date.format("%Y-%m").to_string()) {
            *amount += tx.cost;
        }
    }
    buckets
        .into_iter()
        .map(|(month, amount)| MonthlySpending { month, amount })
        .collect()
}

/// Count and cost of waste per reason; unrecorded reasons count as `other`
fn waste_analysis(ledger: &Ledger) -> Vec<WasteBreakdown> {
    let mut reasons: BTreeMap<WasteReason, (usize, Decimal)> = BTreeMap::new();
    for tx in ledger
        .transactions()
        .iter()
        .filter(|tx| tx.transaction_type == TransactionType::Waste)
    {
        let entry = reasons.entry(tx.waste_reason.unwrap_or_default()).or_default();
        entry.0 += 1;
        entry.1 += tx.cost;
    }
    reasons
        .into_iter()
        .map(|(reason, (count, total_cost))| WasteBreakdown {
            reason,
            count,
            total_cost,
        })
        .collect()
}

fn supplier_performance(ledger: &Ledger) -> Vec<SupplierPerformance> {
    let mut suppliers: Vec<SupplierPerformance> = ledger
        .suppliers()
        .map(|s| SupplierPerformance {
            supplier_id: s.id,
            name: s.name.clone(),
            reliability: s.reliability,
            delivery_time: s.delivery_time,
        })
        .collect();
    suppliers.sort_by(|a, b| a.name.cmp(&b.name).then(a.supplier_id.cmp(&b.supplier_id)));
    suppliers
}

/// Analytics service
#[derive(Clone)]
pub struct AnalyticsService {
    store: LedgerStore,
    settings: InventorySettings,
}

impl AnalyticsService {
    pub fn new(store: LedgerStore, settings: InventorySettings) -> Self {
        Self { store, settings }
    }

    pub async fn snapshot(&self) -> AppResult<StockAnalytics> {
        let ledger = self.store.read().await;
        Ok(compute_analytics(&ledger, &self.settings, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_trailing_months_cross_year_boundary() {
        let now = Utc.with_ymd_and_hms(2026, 2, 10, 9, 0, 0).unwrap();
        assert_eq!(
            trailing_months(now, 4),
            vec!["2025-11", "2025-12", "2026-01", "2026-02"]
        );
        assert!(trailing_months(now, 0).is_empty());
    }
}
