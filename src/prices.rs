//! Prices
//!
//! Parsing of human-written prices (`"45000 VND"`) and percentages (`"10%"`)
//! shared by the store configuration and the fixture loaders.

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, USD, VND},
};
use thiserror::Error;

/// Errors raised while parsing prices and percentages.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PriceParseError {
    /// The price was not written as `AMOUNT CURRENCY`.
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// The percentage could not be parsed.
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// The currency code is not one the store supports.
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),
}

/// Look up a supported currency and its minor unit exponent by ISO code.
///
/// # Errors
///
/// Returns [`PriceParseError::UnknownCurrency`] for unsupported codes.
pub fn currency_from_code(code: &str) -> Result<(&'static Currency, u32), PriceParseError> {
    match code {
        "VND" => Ok((VND, 0)),
        "GBP" => Ok((GBP, 2)),
        "USD" => Ok((USD, 2)),
        "EUR" => Ok((EUR, 2)),
        other => Err(PriceParseError::UnknownCurrency(other.to_string())),
    }
}

/// Parse price string (e.g., "45000 VND" or "2.99 GBP") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), PriceParseError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    let [amount, code] = parts.as_slice() else {
        return Err(PriceParseError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let (currency, exponent) = currency_from_code(code)?;

    let amount = amount
        .replace('_', "")
        .parse::<Decimal>()
        .map_err(|_err| PriceParseError::InvalidPrice(s.to_string()))?;

    let scale = 10_i64
        .checked_pow(exponent)
        .ok_or_else(|| PriceParseError::InvalidPrice(s.to_string()))?;

    let minor_units = amount
        .checked_mul(Decimal::from(scale))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| PriceParseError::InvalidPrice(s.to_string()))?;

    Ok((minor_units, currency))
}

/// Parse a price string straight into [`Money`].
///
/// # Errors
///
/// See [`parse_price`].
pub fn parse_money(s: &str) -> Result<Money<'static, Currency>, PriceParseError> {
    let (minor_units, currency) = parse_price(s)?;

    Ok(Money::from_minor(minor_units, currency))
}

/// Parse percentage string (e.g., "10%" or "0.10") into a `Percentage`
///
/// Accepts two formats:
/// - Percentage format: "10%" for 10%
/// - Decimal format: "0.10" for 10%
///
/// # Errors
///
/// Returns an error if the string cannot be parsed.
pub fn parse_percentage(s: &str) -> Result<Percentage, PriceParseError> {
    let trimmed = s.trim();

    if let Some(percent_str) = trimmed.strip_suffix('%') {
        let value = percent_str
            .trim()
            .parse::<f64>()
            .map_err(|_err| PriceParseError::InvalidPercentage(s.to_string()))?;

        Ok(Percentage::from(value / 100.0))
    } else {
        let value = trimmed
            .parse::<f64>()
            .map_err(|_err| PriceParseError::InvalidPercentage(s.to_string()))?;

        Ok(Percentage::from(value))
    }
}
