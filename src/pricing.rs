//! Pricing
//!
//! Subtotal, shipping fee and grand total of a cart. Every function here is a
//! pure computation over the values it is given.

use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    discounts::DiscountError,
    items::LineItem,
    vouchers::Voucher,
};

/// Errors that can occur while pricing a cart.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// An amount did not fit in minor units.
    #[error("amount overflowed the minor unit range")]
    Overflow,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Errors bubbled up from discount calculation.
    #[error(transparent)]
    Discount(#[from] DiscountError),
}

/// Calculates the subtotal of a list of items: the sum of unit price times quantity.
///
/// An empty list has a zero subtotal in `currency`.
///
/// # Errors
///
/// - [`PricingError::Overflow`]: the sum does not fit in minor units.
/// - [`PricingError::Money`]: an item is priced in another currency.
pub fn subtotal<'a>(
    items: &[LineItem<'a>],
    currency: &'a Currency,
) -> Result<Money<'a, Currency>, PricingError> {
    items.iter().try_fold(Money::from_minor(0, currency), |acc, item| {
        let line = item.line_total()?;

        if line.currency() != currency {
            return Err(PricingError::Money(MoneyError::CurrencyMismatch {
                expected: currency.iso_alpha_code,
                actual: line.currency().iso_alpha_code,
            }));
        }

        let minor = acc
            .to_minor_units()
            .checked_add(line.to_minor_units())
            .ok_or(PricingError::Overflow)?;

        Ok(Money::from_minor(minor, currency))
    })
}

/// Store-wide shipping fee rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShippingPolicy<'a> {
    flat_fee: Money<'a, Currency>,
    free_shipping_threshold: Option<Money<'a, Currency>>,
}

impl<'a> ShippingPolicy<'a> {
    /// Charge `flat_fee` on every order, waived once the subtotal reaches
    /// `free_shipping_threshold` when one is set.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Money`] if the two amounts use different currencies.
    pub fn new(
        flat_fee: Money<'a, Currency>,
        free_shipping_threshold: Option<Money<'a, Currency>>,
    ) -> Result<Self, PricingError> {
        if let Some(threshold) = free_shipping_threshold
            && threshold.currency() != flat_fee.currency()
        {
            return Err(PricingError::Money(MoneyError::CurrencyMismatch {
                expected: flat_fee.currency().iso_alpha_code,
                actual: threshold.currency().iso_alpha_code,
            }));
        }

        Ok(Self {
            flat_fee,
            free_shipping_threshold,
        })
    }

    /// The fee charged when shipping is not waived.
    pub fn flat_fee(&self) -> Money<'a, Currency> {
        self.flat_fee
    }

    /// Subtotal at or above which shipping is free.
    pub fn free_shipping_threshold(&self) -> Option<Money<'a, Currency>> {
        self.free_shipping_threshold
    }

    /// The currency fees are charged in.
    pub fn currency(&self) -> &'a Currency {
        self.flat_fee.currency()
    }

    /// Whether `subtotal` alone earns free shipping.
    pub fn is_free_for(&self, subtotal: &Money<'a, Currency>) -> bool {
        self.free_shipping_threshold
            .is_some_and(|threshold| subtotal.to_minor_units() >= threshold.to_minor_units())
    }

    /// How much more the customer has to order to earn free shipping.
    ///
    /// `None` when there is no threshold or it is already met.
    pub fn free_shipping_shortfall(
        &self,
        subtotal: &Money<'a, Currency>,
    ) -> Option<Money<'a, Currency>> {
        let threshold = self.free_shipping_threshold?;
        let remaining = threshold
            .to_minor_units()
            .saturating_sub(subtotal.to_minor_units());

        (remaining > 0).then(|| Money::from_minor(remaining, threshold.currency()))
    }

    /// Shipping fee for an order with `subtotal`. `waived` is set when a valid
    /// free-shipping voucher is selected.
    pub fn fee(&self, subtotal: &Money<'a, Currency>, waived: bool) -> Money<'a, Currency> {
        if waived || self.is_free_for(subtotal) {
            Money::from_minor(0, self.currency())
        } else {
            self.flat_fee
        }
    }
}

/// Derived amounts of a cart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals<'a> {
    /// Sum of line totals
    pub subtotal: Money<'a, Currency>,

    /// Shipping fee after waivers
    pub shipping_fee: Money<'a, Currency>,

    /// Amount taken off by the selected voucher
    pub discount: Money<'a, Currency>,

    /// Amount charged
    pub total: Money<'a, Currency>,
}

/// Price a list of items with an optional voucher.
///
/// A voucher only counts while it is valid for the subtotal; an invalid
/// voucher contributes no discount and does not waive shipping.
///
/// # Errors
///
/// Returns a [`PricingError`] on overflow, currency mismatch or a failed
/// discount calculation.
pub fn price<'a>(
    items: &[LineItem<'a>],
    voucher: Option<&Voucher<'a>>,
    shipping: &ShippingPolicy<'a>,
) -> Result<Totals<'a>, PricingError> {
    let subtotal = subtotal(items, shipping.currency())?;
    let applied = voucher.filter(|voucher| voucher.is_valid_for(&subtotal));

    let discount = match applied {
        Some(voucher) => voucher.discount_for(subtotal)?,
        None => Money::from_minor(0, shipping.currency()),
    };

    let waived = applied.is_some_and(|voucher| voucher.discount().waives_shipping());
    let shipping_fee = shipping.fee(&subtotal, waived);
    let total = grand_total(subtotal, discount, shipping_fee)?;

    Ok(Totals {
        subtotal,
        shipping_fee,
        discount,
        total,
    })
}

/// `subtotal - discount + shipping_fee`, never below zero.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if the sum does not fit in minor units.
pub fn grand_total<'a>(
    subtotal: Money<'a, Currency>,
    discount: Money<'a, Currency>,
    shipping_fee: Money<'a, Currency>,
) -> Result<Money<'a, Currency>, PricingError> {
    let minor = subtotal
        .to_minor_units()
        .checked_sub(discount.to_minor_units())
        .and_then(|value| value.checked_add(shipping_fee.to_minor_units()))
        .ok_or(PricingError::Overflow)?;

    Ok(Money::from_minor(minor.max(0), subtotal.currency()))
}
