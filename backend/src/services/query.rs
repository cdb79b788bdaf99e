//! Query/filter layer over the ledger collections
//!
//! Every collection uses the same composition: an AND of independent
//! predicates, then one stable single-key sort. List-valued parameters are
//! comma-separated (`status=low-stock,expired`).

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{check, AppError, AppResult};
use crate::models::{
    AlertSeverity, AlertType, PaymentStatus, PurchaseOrder, PurchaseOrderStatus, SortDirection,
    StockAlert, StockItem, StockStatus, StockTransaction, Supplier, SupplierStatus,
    TransactionType,
};
use crate::services::ledger::Ledger;
use shared::validation::validate_price_range;

// ============================================================================
// Shared plumbing
// ============================================================================

/// Comparable sort value extracted from a record
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    /// Compared case-insensitively
    Text(String),
    Number(Decimal),
    Date(Option<DateTime<Utc>>),
}

impl SortKey {
    pub fn text(value: &str) -> Self {
        SortKey::Text(value.to_lowercase())
    }
}

/// Split a comma-separated parameter and parse every entry
pub fn parse_list<T>(field: &str, raw: Option<&str>) -> AppResult<Option<Vec<T>>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = raw else {
        return Ok(None);
    };
    let values = raw
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<T>()
                .map_err(|e| AppError::validation(field, e.to_string()))
        })
        .collect::<AppResult<Vec<T>>>()?;
    Ok((!values.is_empty()).then_some(values))
}

fn parse_text_list(raw: Option<&str>) -> Option<Vec<String>> {
    let values: Vec<String> = raw?
        .split(',')
        .map(|part| part.trim().to_lowercase())
        .filter(|part| !part.is_empty())
        .collect();
    (!values.is_empty()).then_some(values)
}

fn member<T: PartialEq>(allowed: &Option<Vec<T>>, value: &T) -> bool {
    allowed.as_ref().map_or(true, |set| set.contains(value))
}

fn optional_member<T: PartialEq>(allowed: &Option<Vec<T>>, value: Option<&T>) -> bool {
    match allowed {
        None => true,
        Some(set) => value.map_or(false, |v| set.contains(v)),
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn normalized_search(search: &Option<String>) -> Option<String> {
    search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
}

/// Stable sort by a single key
pub fn sort_records<T, F>(records: &mut [T], direction: SortDirection, key: F)
where
    F: Fn(&T) -> SortKey,
{
    records.sort_by(|a, b| direction.apply(key(a).cmp(&key(b))));
}

fn unknown_sort_field(field: &str) -> AppError {
    AppError::validation("sort_by", format!("Cannot sort by {}", field))
}

// ============================================================================
// Items
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemQuery {
    /// Case-insensitive substring over name, category, supplier name and tags
    pub search: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub supplier_id: Option<String>,
    pub location_id: Option<String>,
    /// Only perishable items
    #[serde(default)]
    pub perishable: bool,
    /// Only non-perishable items
    #[serde(default)]
    pub non_perishable: bool,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    /// Items carrying at least one of these tags
    pub tags: Option<String>,
    pub sort_by: Option<String>,
    pub sort_direction: Option<SortDirection>,
}

/// Filter and sort active items. Status is derived at `now`.
pub fn filter_items(
    ledger: &Ledger,
    query: &ItemQuery,
    now: DateTime<Utc>,
) -> AppResult<Vec<StockItem>> {
    check(
        "min_price",
        validate_price_range(query.min_price, query.max_price),
    )?;
    let search = normalized_search(&query.search);
    let categories = parse_text_list(query.category.as_deref());
    let statuses = parse_list::<StockStatus>("status", query.status.as_deref())?;
    let suppliers = parse_list::<Uuid>("supplier_id", query.supplier_id.as_deref())?;
    let locations = parse_list::<Uuid>("location_id", query.location_id.as_deref())?;
    let tags = parse_text_list(query.tags.as_deref());

    let supplier_name = |item: &StockItem| {
        item.supplier_id
            .and_then(|id| ledger.supplier(id))
            .map(|s| s.name.as_str())
    };

    let mut items: Vec<StockItem> = ledger
        .items()
        .cloned()
        .map(|mut item| {
            item.refresh_derived(now);
            item
        })
        .filter(|item| {
            search.as_deref().map_or(true, |needle| {
                contains_ci(&item.name, needle)
                    || contains_ci(&item.category, needle)
                    || supplier_name(item).map_or(false, |name| contains_ci(name, needle))
                    || item.tags.iter().any(|tag| contains_ci(tag, needle))
            })
        })
        .filter(|item| member(&categories, &item.category.to_lowercase()))
        .filter(|item| member(&statuses, &item.status))
        .filter(|item| optional_member(&suppliers, item.supplier_id.as_ref()))
        .filter(|item| optional_member(&locations, item.location_id.as_ref()))
        .filter(|item| !query.perishable || item.is_perishable)
        .filter(|item| !query.non_perishable || !item.is_perishable)
        .filter(|item| query.min_price.map_or(true, |min| item.unit_price >= min))
        .filter(|item| query.max_price.map_or(true, |max| item.unit_price <= max))
        .filter(|item| {
            tags.as_ref()
                .map_or(true, |wanted| wanted.iter().any(|tag| item.has_tag(tag)))
        })
        .collect();

    let field = query.sort_by.as_deref().unwrap_or("name");
    let key: fn(&StockItem) -> SortKey = match field {
        "name" => |i| SortKey::text(&i.name),
        "category" => |i| SortKey::text(&i.category),
        "status" => |i| SortKey::text(i.status.as_str()),
        "quantity" => |i| SortKey::Number(i.quantity),
        "unit_price" => |i| SortKey::Number(i.unit_price),
        "total_value" => |i| SortKey::Number(i.total_value),
        "usage_rate" => |i| SortKey::Number(i.usage_rate),
        "expiry_date" => |i| SortKey::Date(i.expiry_date),
        "last_restocked" => |i| SortKey::Date(Some(i.last_restocked)),
        "created_at" => |i| SortKey::Date(Some(i.created_at)),
        other => return Err(unknown_sort_field(other)),
    };
    // Creation order first so equal keys come out the same way every time
    items.sort_by_key(|i| (i.created_at, i.id));
    sort_records(&mut items, query.sort_direction.unwrap_or_default(), key);
    Ok(items)
}

// ============================================================================
// Transactions
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionQuery {
    /// Substring over reason, reference and item name
    pub search: Option<String>,
    pub item_id: Option<String>,
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    pub user: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub sort_by: Option<String>,
    pub sort_direction: Option<SortDirection>,
}

/// Filter and sort the transaction log. Without `sort_by` log order is kept.
pub fn filter_transactions(
    ledger: &Ledger,
    query: &TransactionQuery,
) -> AppResult<Vec<StockTransaction>> {
    if let (Some(from), Some(to)) = (query.from, query.to) {
        if from > to {
            return Err(AppError::validation("from", "Start date is after end date"));
        }
    }
    let search = normalized_search(&query.search);
    let item_ids = parse_list::<Uuid>("item_id", query.item_id.as_deref())?;
    let types = parse_list::<TransactionType>("type", query.transaction_type.as_deref())?;
    let user = normalized_search(&query.user);

    let mut transactions: Vec<StockTransaction> = ledger
        .transactions()
        .iter()
        .filter(|tx| {
            search.as_deref().map_or(true, |needle| {
                tx.reason.as_deref().map_or(false, |r| contains_ci(r, needle))
                    || tx.reference.as_deref().map_or(false, |r| contains_ci(r, needle))
                    || ledger
                        .any_item(tx.item_id)
                        .map_or(false, |item| contains_ci(&item.name, needle))
            })
        })
        .filter(|tx| member(&item_ids, &tx.item_id))
        .filter(|tx| member(&types, &tx.transaction_type))
        .filter(|tx| {
            user.as_deref().map_or(true, |needle| {
                contains_ci(&tx.user_name, needle)
                    || tx.user_id.map_or(false, |id| id.to_string() == needle)
            })
        })
        .filter(|tx| query.from.map_or(true, |from| tx.date >= from))
        .filter(|tx| query.to.map_or(true, |to| tx.date <= to))
        .cloned()
        .collect();

    if let Some(field) = query.sort_by.as_deref() {
        let key: fn(&StockTransaction) -> SortKey = match field {
            "date" => |t| SortKey::Date(Some(t.date)),
            "quantity" => |t| SortKey::Number(t.quantity),
            "cost" => |t| SortKey::Number(t.cost),
            "type" => |t| SortKey::text(t.transaction_type.as_str()),
            other => return Err(unknown_sort_field(other)),
        };
        sort_records(&mut transactions, query.sort_direction.unwrap_or_default(), key);
    } else if query.sort_direction == Some(SortDirection::Desc) {
        transactions.reverse();
    }
    Ok(transactions)
}

// ============================================================================
// Purchase orders
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PurchaseOrderQuery {
    /// Substring over document number, supplier name and notes
    pub search: Option<String>,
    pub status: Option<String>,
    pub supplier_id: Option<String>,
    pub payment_status: Option<String>,
    pub sort_by: Option<String>,
    pub sort_direction: Option<SortDirection>,
}

pub fn filter_purchase_orders(
    ledger: &Ledger,
    query: &PurchaseOrderQuery,
) -> AppResult<Vec<PurchaseOrder>> {
    let search = normalized_search(&query.search);
    let statuses = parse_list::<PurchaseOrderStatus>("status", query.status.as_deref())?;
    let suppliers = parse_list::<Uuid>("supplier_id", query.supplier_id.as_deref())?;
    let payments = parse_list::<PaymentStatus>("payment_status", query.payment_status.as_deref())?;

    let mut orders: Vec<PurchaseOrder> = ledger
        .purchase_orders()
        .filter(|po| {
            search.as_deref().map_or(true, |needle| {
                contains_ci(&po.document_number, needle)
                    || ledger
                        .supplier(po.supplier_id)
                        .map_or(false, |s| contains_ci(&s.name, needle))
                    || po.notes.as_deref().map_or(false, |n| contains_ci(n, needle))
            })
        })
        .filter(|po| member(&statuses, &po.status))
        .filter(|po| member(&suppliers, &po.supplier_id))
        .filter(|po| member(&payments, &po.payment_status))
        .cloned()
        .collect();

    let field = query.sort_by.as_deref().unwrap_or("created_at");
    let key: fn(&PurchaseOrder) -> SortKey = match field {
        "created_at" => |po| SortKey::Date(Some(po.created_at)),
        "updated_at" => |po| SortKey::Date(Some(po.updated_at)),
        "expected_delivery" => |po| SortKey::Date(po.expected_delivery),
        "total_value" => |po| SortKey::Number(po.total_value),
        "document_number" => |po| SortKey::text(&po.document_number),
        "status" => |po| SortKey::text(po.status.as_str()),
        other => return Err(unknown_sort_field(other)),
    };
    orders.sort_by_key(|po| (po.created_at, po.id));
    sort_records(&mut orders, query.sort_direction.unwrap_or_default(), key);
    Ok(orders)
}

// ============================================================================
// Suppliers
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SupplierQuery {
    /// Substring over name, contact person and email
    pub search: Option<String>,
    pub status: Option<String>,
    /// Suppliers preferred for any of these categories
    pub category: Option<String>,
    pub sort_by: Option<String>,
    pub sort_direction: Option<SortDirection>,
}

pub fn filter_suppliers(ledger: &Ledger, query: &SupplierQuery) -> AppResult<Vec<Supplier>> {
    let search = normalized_search(&query.search);
    let statuses = parse_list::<SupplierStatus>("status", query.status.as_deref())?;
    let categories = parse_text_list(query.category.as_deref());

    let mut suppliers: Vec<Supplier> = ledger
        .suppliers()
        .filter(|s| {
            search.as_deref().map_or(true, |needle| {
                contains_ci(&s.name, needle)
                    || s.contact_person.as_deref().map_or(false, |c| contains_ci(c, needle))
                    || s.email.as_deref().map_or(false, |e| contains_ci(e, needle))
            })
        })
        .filter(|s| member(&statuses, &s.status))
        .filter(|s| {
            categories
                .as_ref()
                .map_or(true, |wanted| wanted.iter().any(|c| s.is_preferred_for(c)))
        })
        .cloned()
        .collect();

    let field = query.sort_by.as_deref().unwrap_or("name");
    let key: fn(&Supplier) -> SortKey = match field {
        "name" => |s| SortKey::text(&s.name),
        "reliability" => |s| SortKey::Number(Decimal::from(s.reliability)),
        "delivery_time" => |s| SortKey::Number(Decimal::from(s.delivery_time)),
        "created_at" => |s| SortKey::Date(Some(s.created_at)),
        other => return Err(unknown_sort_field(other)),
    };
    suppliers.sort_by_key(|s| (s.created_at, s.id));
    sort_records(&mut suppliers, query.sort_direction.unwrap_or_default(), key);
    Ok(suppliers)
}

// ============================================================================
// Alerts
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertQuery {
    #[serde(rename = "type")]
    pub alert_type: Option<String>,
    pub severity: Option<String>,
    pub is_read: Option<bool>,
    pub item_id: Option<String>,
    pub sort_by: Option<String>,
    pub sort_direction: Option<SortDirection>,
}

/// Filter and sort alerts, newest first unless asked otherwise
pub fn filter_alerts(ledger: &Ledger, query: &AlertQuery) -> AppResult<Vec<StockAlert>> {
    let types = parse_list::<AlertType>("type", query.alert_type.as_deref())?;
    let severities = parse_list::<AlertSeverity>("severity", query.severity.as_deref())?;
    let item_ids = parse_list::<Uuid>("item_id", query.item_id.as_deref())?;

    let mut alerts: Vec<StockAlert> = ledger
        .alerts()
        .filter(|a| member(&types, &a.alert_type))
        .filter(|a| member(&severities, &a.severity))
        .filter(|a| query.is_read.map_or(true, |read| a.is_read == read))
        .filter(|a| member(&item_ids, &a.item_id))
        .cloned()
        .collect();

    // Id order first so equal keys come out the same way every time
    alerts.sort_by_key(|a| a.id);
    let field = query.sort_by.as_deref().unwrap_or("date");
    let direction = query.sort_direction.unwrap_or(SortDirection::Desc);
    match field {
        "date" => sort_records(&mut alerts, direction, |a| SortKey::Date(Some(a.date))),
        "severity" => alerts.sort_by(|a, b| direction.apply(severity_order(a, b))),
        "type" => sort_records(&mut alerts, direction, |a| SortKey::text(a.alert_type.as_str())),
        other => return Err(unknown_sort_field(other)),
    }
    Ok(alerts)
}

fn severity_order(a: &StockAlert, b: &StockAlert) -> Ordering {
    a.severity.cmp(&b.severity)
}
