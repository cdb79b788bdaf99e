//! Validation utilities for the restaurant stock ledger

use rust_decimal::Decimal;

// ============================================================================
// Stock Validations
// ============================================================================

/// Upper bound for quantities and unit prices. The product of two bounded
/// amounts, and sums of such products, stay far inside `Decimal` range.
pub const MAX_AMOUNT: i64 = 1_000_000_000;

fn within_max(amount: Decimal) -> bool {
    amount <= Decimal::from(MAX_AMOUNT)
}

/// Transaction and order quantities must be strictly positive
pub fn validate_quantity(quantity: Decimal) -> Result<(), &'static str> {
    if quantity <= Decimal::ZERO {
        return Err("Quantity must be greater than zero");
    }
    if !within_max(quantity) {
        return Err("Quantity must be at most 1000000000");
    }
    Ok(())
}

/// Held quantities and stock levels may be zero but never negative
pub fn validate_stock_quantity(quantity: Decimal) -> Result<(), &'static str> {
    if quantity < Decimal::ZERO {
        return Err("Quantity cannot be negative");
    }
    if !within_max(quantity) {
        return Err("Quantity must be at most 1000000000");
    }
    Ok(())
}

pub fn validate_unit_price(price: Decimal) -> Result<(), &'static str> {
    if price < Decimal::ZERO {
        return Err("Unit price cannot be negative");
    }
    if !within_max(price) {
        return Err("Unit price must be at most 1000000000");
    }
    Ok(())
}

/// Minimum stock cannot exceed optimum stock
pub fn validate_stock_levels(minimum: Decimal, optimum: Decimal) -> Result<(), &'static str> {
    validate_stock_quantity(minimum)?;
    validate_stock_quantity(optimum)?;
    if minimum > optimum {
        return Err("Minimum stock cannot exceed optimum stock");
    }
    Ok(())
}

/// Alert threshold is a percentage of minimum stock
pub fn validate_alert_threshold(threshold: Decimal) -> Result<(), &'static str> {
    if threshold < Decimal::ZERO || threshold > Decimal::ONE_HUNDRED {
        return Err("Alert threshold must be between 0 and 100");
    }
    Ok(())
}

pub fn validate_reliability(reliability: u8) -> Result<(), &'static str> {
    if reliability > 100 {
        return Err("Reliability must be between 0 and 100");
    }
    Ok(())
}

/// Tags are matched case-insensitively and passed comma-separated in queries
pub fn validate_tag(tag: &str) -> Result<(), &'static str> {
    if tag.trim().is_empty() {
        return Err("Tags cannot be empty");
    }
    if tag.contains(',') {
        return Err("Tags cannot contain commas");
    }
    if tag.len() > 50 {
        return Err("Tags must be at most 50 characters");
    }
    Ok(())
}

pub fn validate_price_range(min: Option<Decimal>, max: Option<Decimal>) -> Result<(), &'static str> {
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err("Minimum price cannot exceed maximum price");
        }
    }
    Ok(())
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate phone number: 7-15 digits, optional leading +, spaces and dashes allowed
pub fn validate_phone(phone: &str) -> Result<(), &'static str> {
    let body = phone.strip_prefix('+').unwrap_or(phone);
    if !body
        .chars()
        .all(|c| c.is_ascii_digit() || c == ' ' || c == '-')
    {
        return Err("Phone number may only contain digits, spaces and dashes");
    }
    let digits = body.chars().filter(|c| c.is_ascii_digit()).count();
    if !(7..=15).contains(&digits) {
        return Err("Phone number must have 7 to 15 digits");
    }
    Ok(())
}
