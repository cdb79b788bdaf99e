//! Reporting handlers for data export

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::services::query::{ItemQuery, TransactionQuery};
use crate::services::ReportingService;
use crate::AppState;

/// Output format, read alongside the list filters
#[derive(Deserialize)]
pub struct ReportFormat {
    pub format: Option<String>, // "json" or "csv"
}

fn respond<T: Serialize>(format: &ReportFormat, data: Vec<T>, filename: &str) -> AppResult<Response> {
    match format.format.as_deref() {
        None | Some("json") => Ok(Json(data).into_response()),
        Some("csv") => {
            let csv = ReportingService::export_to_csv(&data)?;
            let disposition = format!("attachment; filename=\"{}\"", filename);
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                csv,
            )
                .into_response())
        }
        Some(other) => Err(AppError::validation(
            "format",
            format!("Unsupported report format {}", other),
        )),
    }
}

/// Current stock report
pub async fn get_stock_report(
    State(state): State<AppState>,
    Query(format): Query<ReportFormat>,
    Query(query): Query<ItemQuery>,
) -> AppResult<Response> {
    let service = ReportingService::new(state.store.clone());
    let rows = service.stock_report(&query).await?;
    respond(&format, rows, "stock.csv")
}

/// Transaction log report
pub async fn get_transaction_report(
    State(state): State<AppState>,
    Query(format): Query<ReportFormat>,
    Query(query): Query<TransactionQuery>,
) -> AppResult<Response> {
    let service = ReportingService::new(state.store.clone());
    let rows = service.transaction_report(&query).await?;
    respond(&format, rows, "transactions.csv")
}
