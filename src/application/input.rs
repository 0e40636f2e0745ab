//! Parsing of raw caller-supplied strings into typed values.
//!
//! Every failure is reported as [`AppError::InvalidInput`] naming the field.

use chrono::NaiveDate;

use crate::domain::{Cents, ProductType, parse_cents};

use super::AppError;

pub fn parse_amount(field: &str, input: &str) -> Result<Cents, AppError> {
    parse_cents(input).map_err(|e| invalid(field, input, e))
}

pub fn parse_term(field: &str, input: &str) -> Result<i64, AppError> {
    input.trim().parse::<i64>().map_err(|e| invalid(field, input, e))
}

pub fn parse_id(field: &str, input: &str) -> Result<i64, AppError> {
    let id = input.trim().parse::<i64>().map_err(|e| invalid(field, input, e))?;
    if id <= 0 {
        return Err(invalid(field, input, "must be a positive number"));
    }
    Ok(id)
}

pub fn parse_phone(field: &str, input: &str) -> Result<i64, AppError> {
    input.trim().parse::<i64>().map_err(|e| invalid(field, input, e))
}

/// Interest rate in percent; must be finite and non-negative.
pub fn parse_rate(field: &str, input: &str) -> Result<f64, AppError> {
    let rate = input.trim().parse::<f64>().map_err(|e| invalid(field, input, e))?;
    if !rate.is_finite() || rate < 0.0 {
        return Err(invalid(field, input, "must be a non-negative percentage"));
    }
    Ok(rate)
}

pub fn parse_product_type(field: &str, input: &str) -> Result<ProductType, AppError> {
    input
        .parse::<ProductType>()
        .map_err(|e| invalid(field, input, e))
}

/// ISO 8601 calendar date (YYYY-MM-DD).
pub fn parse_date(field: &str, input: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|e| invalid(field, input, e))
}

fn invalid(field: &str, input: &str, reason: impl std::fmt::Display) -> AppError {
    AppError::InvalidInput(format!("{} '{}': {}", field, input, reason))
}
