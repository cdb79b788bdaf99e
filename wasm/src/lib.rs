//! WebAssembly module for the Restaurant Stock dashboard
//!
//! Provides client-side previews of the ledger's pure derivations:
//! - Item status and held value
//! - Low-stock alert rule
//! - Purchase order totals and lifecycle checks
//! - Turnover rate

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

fn to_decimal(value: f64) -> Decimal {
    Decimal::try_from(value).unwrap_or(Decimal::ZERO)
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

fn parse_instant(value: &str, field: &str) -> Result<DateTime<Utc>, JsValue> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| JsValue::from_str(&format!("Invalid {}: {}", field, e)))
}

/// Current time from the browser clock
fn browser_now() -> Result<DateTime<Utc>, JsValue> {
    let iso: String = js_sys::Date::new_0().to_iso_string().into();
    parse_instant(&iso, "clock")
}

/// Derive an item's status. `expiry` and `now` are RFC 3339 timestamps;
/// `now` defaults to the browser clock.
#[wasm_bindgen]
pub fn derive_stock_status(
    quantity: f64,
    minimum_stock: f64,
    expiry: Option<String>,
    now: Option<String>,
) -> Result<String, JsValue> {
    let expiry = expiry
        .as_deref()
        .map(|value| parse_instant(value, "expiry"))
        .transpose()?;
    let now = match now.as_deref() {
        Some(value) => parse_instant(value, "now")?,
        None => browser_now()?,
    };
    let status = derive_status(to_decimal(quantity), to_decimal(minimum_stock), expiry, now);
    Ok(status.as_str().to_string())
}

/// Held value of an item
#[wasm_bindgen(js_name = calculate_total_value)]
pub fn calculate_item_value(quantity: f64, unit_price: f64) -> f64 {
    to_f64(calculate_total_value(
        to_decimal(quantity),
        to_decimal(unit_price),
    ))
}

#[derive(Deserialize)]
struct LineInput {
    quantity: Decimal,
    unit_price: Decimal,
}

/// Sum a JSON array of `{quantity, unit_price}` lines
#[wasm_bindgen]
pub fn calculate_order_total(lines_json: &str) -> Result<f64, JsValue> {
    let lines: Vec<LineInput> = serde_json::from_str(lines_json).map_err(|e| {
        let message = format!("Invalid lines JSON: {}", e);
        #[cfg(target_arch = "wasm32")]
        web_sys::console::warn_1(&JsValue::from_str(&message));
        JsValue::from_str(&message)
    })?;
    let lines: Vec<PurchaseOrderLine> = lines
        .into_iter()
        .map(|line| PurchaseOrderLine::new(Uuid::nil(), line.quantity, line.unit_price))
        .collect();
    Ok(to_f64(shared::calculate_order_total(&lines)))
}

/// Whether a purchase order may move from `from` to `to`
#[wasm_bindgen]
pub fn can_transition_order(from: &str, to: &str) -> bool {
    match (
        from.parse::<PurchaseOrderStatus>(),
        to.parse::<PurchaseOrderStatus>(),
    ) {
        (Ok(from), Ok(to)) => from.can_transition_to(to),
        _ => false,
    }
}

/// Low-stock alert rule: quantity at or below `alert_threshold`% of minimum
#[wasm_bindgen]
pub fn is_low_stock_alert(quantity: f64, minimum_stock: f64, alert_threshold: f64) -> bool {
    is_low_stock(
        to_decimal(quantity),
        to_decimal(minimum_stock),
        to_decimal(alert_threshold),
    )
}

/// Consumption over mean held quantity
#[wasm_bindgen(js_name = calculate_turnover_rate)]
pub fn calculate_turnover(total_out: f64, mean_quantity: f64) -> f64 {
    to_f64(calculate_turnover_rate(
        to_decimal(total_out),
        to_decimal(mean_quantity),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: &str = "2026-03-15T12:00:00Z";

    #[test]
    fn test_derive_stock_status() {
        let status = |q: f64, expiry: Option<&str>| {
            derive_stock_status(q, 5.0, expiry.map(String::from), Some(NOW.to_string())).unwrap()
        };
        assert_eq!(status(10.0, None), "in-stock");
        assert_eq!(status(5.0, None), "low-stock");
        assert_eq!(status(0.0, None), "out-of-stock");
        assert_eq!(status(10.0, Some("2026-03-14T12:00:00Z")), "expired");
        assert_eq!(status(10.0, Some("2026-04-14T12:00:00Z")), "in-stock");
    }

    #[test]
    fn test_item_value() {
        assert_eq!(calculate_item_value(4.0, 2.5), 10.0);
    }

    #[test]
    fn test_order_total() {
        let total = calculate_order_total(
            r#"[{"quantity":"10","unit_price":"40"},{"quantity":"20","unit_price":"30"}]"#,
        )
        .unwrap();
        assert_eq!(total, 1000.0);
    }

    #[test]
    fn test_transitions() {
        assert!(can_transition_order("draft", "sent"));
        assert!(can_transition_order("sent", "received"));
        assert!(!can_transition_order("draft", "confirmed"));
        assert!(!can_transition_order("received", "cancelled"));
        assert!(!can_transition_order("bogus", "sent"));
    }

    #[test]
    fn test_low_stock_alert() {
        assert!(is_low_stock_alert(5.0, 10.0, 50.0));
        assert!(!is_low_stock_alert(6.0, 10.0, 50.0));
    }

    #[test]
    fn test_turnover() {
        assert_eq!(calculate_turnover(30.0, 15.0), 2.0);
        assert_eq!(calculate_turnover(30.0, 0.0), 0.0);
    }
}
