//! Discounts
//!
//! Discount amounts a voucher takes off a cart subtotal.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

/// Errors specific to discount calculations.
#[derive(Debug, Error, PartialEq)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// What a voucher does to the order.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum VoucherDiscount<'a> {
    /// Take a percentage off the subtotal (e.g., "10% off")
    PercentageOff(Percentage),

    /// Take a fixed amount off the subtotal (e.g., "15.000đ off")
    AmountOff(Money<'a, Currency>),

    /// Waive the shipping fee
    FreeShipping,
}

impl<'a> VoucherDiscount<'a> {
    /// Amount taken off `subtotal`.
    ///
    /// Percentage discounts are capped at `cap` when one is given. Fixed
    /// discounts never exceed the subtotal. Free shipping takes nothing off the
    /// subtotal.
    ///
    /// # Errors
    ///
    /// - [`DiscountError::PercentConversion`] if the percentage cannot be applied.
    /// - [`DiscountError::Money`] if a fixed amount or cap is in another currency.
    pub fn amount_off(
        &self,
        subtotal: Money<'a, Currency>,
        cap: Option<Money<'a, Currency>>,
    ) -> Result<Money<'a, Currency>, DiscountError> {
        let currency = subtotal.currency();
        let subtotal_minor = subtotal.to_minor_units().max(0);

        let minor = match self {
            VoucherDiscount::PercentageOff(percent) => {
                let raw = percent_of_minor(percent, subtotal_minor)?;

                match cap {
                    Some(cap) => {
                        ensure_currency(currency, cap.currency())?;
                        raw.min(cap.to_minor_units().max(0))
                    }
                    None => raw,
                }
            }
            VoucherDiscount::AmountOff(amount) => {
                ensure_currency(currency, amount.currency())?;
                amount.to_minor_units().clamp(0, subtotal_minor)
            }
            VoucherDiscount::FreeShipping => 0,
        };

        Ok(Money::from_minor(minor, currency))
    }

    /// Whether this discount waives the shipping fee.
    #[must_use]
    pub fn waives_shipping(&self) -> bool {
        matches!(self, VoucherDiscount::FreeShipping)
    }
}

fn ensure_currency(expected: &Currency, actual: &Currency) -> Result<(), DiscountError> {
    if expected == actual {
        Ok(())
    } else {
        Err(DiscountError::Money(MoneyError::CurrencyMismatch {
            expected: expected.iso_alpha_code,
            actual: actual.iso_alpha_code,
        }))
    }
}

/// Calculate the discount amount in minor units based on a percentage and a minor unit amount.
///
/// Halves round away from zero.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the calculation overflows or cannot be
/// represented in minor units.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, DiscountError> {
    let minor = Decimal::from_i64(minor).ok_or(DiscountError::PercentConversion)?;

    fraction(*percent)
        .checked_mul(minor)
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}

/// Percentage as a plain fraction, e.g. `0.1` for 10%.
pub fn fraction(percent: Percentage) -> Decimal {
    percent * Decimal::ONE
}
