//! Vouchers
//!
//! A voucher is a discount code with an optional minimum order. Its validity
//! is a pure function of the cart subtotal: a voucher below its minimum stays
//! selected but takes nothing off and blocks checkout.

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    discounts::{DiscountError, VoucherDiscount, fraction},
    items::LineItem,
    pricing::{PricingError, ShippingPolicy, subtotal},
};

/// Errors raised when constructing vouchers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VoucherError {
    /// An amount was below zero.
    #[error("voucher {code}: amount must not be negative, got {minor} minor units")]
    NegativeAmount {
        /// Voucher code
        code: String,
        /// Offending amount
        minor: i64,
    },

    /// A percentage was outside 0-100%.
    #[error("voucher {0}: percentage must be between 0% and 100%")]
    PercentageOutOfRange(String),

    /// The voucher mixes currencies.
    #[error("voucher {code}: expected currency {expected}, found {actual}")]
    CurrencyMismatch {
        /// Voucher code
        code: String,
        /// Currency of the voucher's first amount
        expected: &'static str,
        /// Currency that did not match
        actual: &'static str,
    },
}

/// Eligibility of a voucher for a given subtotal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VoucherStatus<'a> {
    /// The voucher applies to the cart.
    Applicable,

    /// The subtotal has not reached the voucher's minimum order.
    BelowMinimum {
        /// How much more has to be ordered
        shortfall: Money<'a, Currency>,
    },
}

impl VoucherStatus<'_> {
    /// Whether the voucher applies.
    #[must_use]
    pub fn is_applicable(&self) -> bool {
        matches!(self, VoucherStatus::Applicable)
    }
}

/// A discount code the customer can select for a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct Voucher<'a> {
    id: String,
    code: String,
    discount: VoucherDiscount<'a>,
    min_order: Option<Money<'a, Currency>>,
    max_discount: Option<Money<'a, Currency>>,
}

impl<'a> Voucher<'a> {
    /// Create a voucher without a minimum order or a discount cap.
    ///
    /// # Errors
    ///
    /// - [`VoucherError::NegativeAmount`] for a negative fixed amount.
    /// - [`VoucherError::PercentageOutOfRange`] for a percentage outside 0-100%.
    pub fn new(
        id: impl Into<String>,
        code: impl Into<String>,
        discount: VoucherDiscount<'a>,
    ) -> Result<Self, VoucherError> {
        let code = code.into();

        match discount {
            VoucherDiscount::PercentageOff(percent) => {
                let fraction = fraction(percent);

                if fraction < Decimal::ZERO || fraction > Decimal::ONE {
                    return Err(VoucherError::PercentageOutOfRange(code));
                }
            }
            VoucherDiscount::AmountOff(amount) => ensure_non_negative(&code, &amount)?,
            VoucherDiscount::FreeShipping => {}
        }

        Ok(Self {
            id: id.into(),
            code,
            discount,
            min_order: None,
            max_discount: None,
        })
    }

    /// Require the subtotal to reach `min_order` before the voucher applies.
    ///
    /// # Errors
    ///
    /// Returns a [`VoucherError`] for a negative amount or a currency that
    /// differs from the voucher's other amounts.
    pub fn with_min_order(mut self, min_order: Money<'a, Currency>) -> Result<Self, VoucherError> {
        ensure_non_negative(&self.code, &min_order)?;
        self.ensure_currency(&min_order)?;

        self.min_order = Some(min_order);

        Ok(self)
    }

    /// Cap the amount a percentage voucher takes off. Ignored by other kinds.
    ///
    /// # Errors
    ///
    /// Returns a [`VoucherError`] for a negative amount or a currency that
    /// differs from the voucher's other amounts.
    pub fn with_max_discount(
        mut self,
        max_discount: Money<'a, Currency>,
    ) -> Result<Self, VoucherError> {
        ensure_non_negative(&self.code, &max_discount)?;
        self.ensure_currency(&max_discount)?;

        self.max_discount = Some(max_discount);

        Ok(self)
    }

    /// Returns the voucher id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the display code
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the discount
    pub fn discount(&self) -> &VoucherDiscount<'a> {
        &self.discount
    }

    /// Returns the minimum order
    pub fn min_order(&self) -> Option<Money<'a, Currency>> {
        self.min_order
    }

    /// Returns the discount cap
    pub fn max_discount(&self) -> Option<Money<'a, Currency>> {
        self.max_discount
    }

    /// The currency of the voucher's amounts, if it has any.
    pub fn currency(&self) -> Option<&'a Currency> {
        let fixed = match self.discount {
            VoucherDiscount::AmountOff(amount) => Some(amount),
            VoucherDiscount::PercentageOff(_) | VoucherDiscount::FreeShipping => None,
        };

        fixed
            .or(self.min_order)
            .or(self.max_discount)
            .map(|amount| amount.currency())
    }

    /// A voucher is valid when it has no minimum order or `subtotal` reaches it.
    pub fn is_valid_for(&self, subtotal: &Money<'a, Currency>) -> bool {
        self.min_order
            .is_none_or(|min| subtotal.to_minor_units() >= min.to_minor_units())
    }

    /// Eligibility of the voucher for `subtotal`.
    pub fn status_for(&self, subtotal: &Money<'a, Currency>) -> VoucherStatus<'a> {
        match self.min_order {
            Some(min) if subtotal.to_minor_units() < min.to_minor_units() => {
                VoucherStatus::BelowMinimum {
                    shortfall: Money::from_minor(
                        min.to_minor_units() - subtotal.to_minor_units(),
                        min.currency(),
                    ),
                }
            }
            _ => VoucherStatus::Applicable,
        }
    }

    /// Amount the voucher takes off `subtotal`, or zero when it is not valid.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] if the discount cannot be calculated.
    pub fn discount_for(
        &self,
        subtotal: Money<'a, Currency>,
    ) -> Result<Money<'a, Currency>, DiscountError> {
        if !self.is_valid_for(&subtotal) {
            return Ok(Money::from_minor(0, subtotal.currency()));
        }

        let cap = match self.discount {
            VoucherDiscount::PercentageOff(_) => self.max_discount,
            VoucherDiscount::AmountOff(_) | VoucherDiscount::FreeShipping => None,
        };

        self.discount.amount_off(subtotal, cap)
    }

    /// Whether the voucher waives shipping for `subtotal`.
    pub fn waives_shipping_for(&self, subtotal: &Money<'a, Currency>) -> bool {
        self.discount.waives_shipping() && self.is_valid_for(subtotal)
    }

    fn ensure_currency(&self, amount: &Money<'a, Currency>) -> Result<(), VoucherError> {
        match self.currency() {
            Some(expected) if expected != amount.currency() => {
                Err(VoucherError::CurrencyMismatch {
                    code: self.code.clone(),
                    expected: expected.iso_alpha_code,
                    actual: amount.currency().iso_alpha_code,
                })
            }
            _ => Ok(()),
        }
    }
}

fn ensure_non_negative(code: &str, amount: &Money<'_, Currency>) -> Result<(), VoucherError> {
    let minor = amount.to_minor_units();

    if minor < 0 {
        Err(VoucherError::NegativeAmount {
            code: code.to_string(),
            minor,
        })
    } else {
        Ok(())
    }
}

/// Vouchers from `vouchers` that apply to `subtotal`, in list order.
pub fn eligible_vouchers<'v, 'a>(
    vouchers: &'v [Voucher<'a>],
    subtotal: &Money<'a, Currency>,
) -> impl Iterator<Item = &'v Voucher<'a>> {
    vouchers
        .iter()
        .filter(move |voucher| voucher.is_valid_for(subtotal))
}

/// Amount a voucher saves on `items`: its discount plus any shipping fee it waives.
///
/// # Errors
///
/// Returns a [`PricingError`] if the cart cannot be priced.
pub fn savings<'a>(
    voucher: &Voucher<'a>,
    items: &[LineItem<'a>],
    shipping: &ShippingPolicy<'a>,
) -> Result<Money<'a, Currency>, PricingError> {
    let subtotal = subtotal(items, shipping.currency())?;
    let discount = voucher.discount_for(subtotal)?;

    let waived = shipping.fee(&subtotal, false).to_minor_units()
        - shipping
            .fee(&subtotal, voucher.waives_shipping_for(&subtotal))
            .to_minor_units();

    let minor = discount
        .to_minor_units()
        .checked_add(waived)
        .ok_or(PricingError::Overflow)?;

    Ok(Money::from_minor(minor, shipping.currency()))
}

/// The voucher that saves the most on `items`; earlier vouchers win ties.
///
/// Returns `None` when no voucher saves anything.
///
/// # Errors
///
/// Returns a [`PricingError`] if the cart cannot be priced with one of the vouchers.
pub fn best_voucher<'v, 'a>(
    vouchers: &'v [Voucher<'a>],
    items: &[LineItem<'a>],
    shipping: &ShippingPolicy<'a>,
) -> Result<Option<&'v Voucher<'a>>, PricingError> {
    let mut best: Option<(&'v Voucher<'a>, i64)> = None;

    for voucher in vouchers {
        let saved = savings(voucher, items, shipping)?.to_minor_units();

        if saved > 0 && best.is_none_or(|(_, best_saved)| saved > best_saved) {
            best = Some((voucher, saved));
        }
    }

    Ok(best.map(|(voucher, _)| voucher))
}
