//! Reporting service for stock and transaction exports
//! Rows are flat so the same data serves JSON and CSV

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::query::{filter_items, filter_transactions, ItemQuery, TransactionQuery};
use crate::services::store::LedgerStore;

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    store: LedgerStore,
}

/// One line of the stock report
#[derive(Debug, Serialize)]
pub struct StockReportRow {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub quantity: Decimal,
    pub unit: String,
    pub unit_price: Decimal,
    pub total_value: Decimal,
    pub status: String,
    pub supplier: Option<String>,
    pub location: Option<String>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub is_perishable: bool,
    /// Semicolon-separated
    pub tags: String,
}

/// One line of the transaction report
#[derive(Debug, Serialize)]
pub struct TransactionReportRow {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub transaction_type: String,
    pub item_id: Uuid,
    pub item_name: Option<String>,
    pub quantity: Decimal,
    pub cost: Decimal,
    pub user_name: String,
    pub reason: Option<String>,
    pub reference: Option<String>,
    pub waste_reason: Option<String>,
}

impl ReportingService {
    pub fn new(store: LedgerStore) -> Self {
        Self { store }
    }

    /// Current stock, filtered and sorted like the item list
    pub async fn stock_report(&self, query: &ItemQuery) -> AppResult<Vec<StockReportRow>> {
        let ledger = self.store.read().await;
        let items = filter_items(&ledger, query, Utc::now())?;

        Ok(items
            .into_iter()
            .map(|item| StockReportRow {
                supplier: item
                    .supplier_id
                    .and_then(|id| ledger.supplier(id))
                    .map(|s| s.name.clone()),
                location: item
                    .location_id
                    .and_then(|id| ledger.location(id))
                    .map(|l| l.name.clone()),
                tags: item.tags.iter().cloned().collect::<Vec<_>>().join(";"),
                status: item.status.as_str().to_string(),
                id: item.id,
                name: item.name,
                category: item.category,
                quantity: item.quantity,
                unit: item.unit,
                unit_price: item.unit_price,
                total_value: item.total_value,
                expiry_date: item.expiry_date,
                is_perishable: item.is_perishable,
            })
            .collect())
    }

    /// Transaction log, filtered like the transaction list
    pub async fn transaction_report(
        &self,
        query: &TransactionQuery,
    ) -> AppResult<Vec<TransactionReportRow>> {
        let ledger = self.store.read().await;
        let transactions = filter_transactions(&ledger, query)?;

        Ok(transactions
            .into_iter()
            .map(|tx| TransactionReportRow {
                item_name: ledger.any_item(tx.item_id).map(|item| item.name.clone()),
                transaction_type: tx.transaction_type.as_str().to_string(),
                waste_reason: tx.waste_reason.map(|r| r.as_str().to_string()),
                id: tx.id,
                date: tx.date,
                item_id: tx.item_id,
                quantity: tx.quantity,
                cost: tx.cost,
                user_name: tx.user_name,
                reason: tx.reason,
                reference: tx.reference,
            })
            .collect())
    }

    /// Export data to CSV format
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        name: &'static str,
        quantity: Decimal,
        note: Option<&'static str>,
    }

    #[test]
    fn test_export_to_csv_writes_header_and_rows() {
        let rows = vec![
            Row {
                name: "Olive oil",
                quantity: Decimal::new(125, 1),
                note: None,
            },
            Row {
                name: "Flour, 00",
                quantity: Decimal::from(40),
                note: Some("bulk"),
            },
        ];
        let csv = ReportingService::export_to_csv(&rows).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "name,quantity,note");
        assert_eq!(lines[1], "Olive oil,12.5,");
        assert_eq!(lines[2], "\"Flour, 00\",40,bulk");
    }
}
