//! Receipt
//!
//! Immutable snapshot of a cart with every derived amount, as shown on the
//! cart and checkout screens.

use std::{fmt, io};

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    settings::{Alignment, Color, Style, object::Columns, object::Rows},
};
use thiserror::Error;

use crate::{
    cart::Cart,
    items::{ItemOptions, LineItemId},
    pricing::PricingError,
    vouchers::VoucherStatus,
};

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// IO error
    #[error("IO error")]
    IO,
}

/// One line of the receipt.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptLine<'a> {
    /// Line item id
    pub id: LineItemId,

    /// Display name
    pub name: String,

    /// Chosen options
    pub options: ItemOptions,

    /// Unit price
    pub unit_price: Money<'a, Currency>,

    /// Number of units
    pub quantity: u32,

    /// Unit price times quantity
    pub line_total: Money<'a, Currency>,
}

/// The selected voucher and whether it applies.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptVoucher<'a> {
    /// Voucher code
    pub code: String,

    /// Eligibility at the time of the snapshot
    pub status: VoucherStatus<'a>,
}

/// Something the customer should be told about the cart.
#[derive(Debug, Clone, PartialEq)]
pub enum ReceiptNotice<'a> {
    /// The selected voucher has not reached its minimum order; checkout is blocked.
    VoucherBelowMinimum {
        /// Voucher code
        code: String,
        /// How much more has to be ordered
        shortfall: Money<'a, Currency>,
    },

    /// Ordering a little more would make shipping free.
    FreeShippingWithin {
        /// How much more has to be ordered
        remaining: Money<'a, Currency>,
    },
}

impl ReceiptNotice<'_> {
    /// Whether this notice blocks checkout.
    #[must_use]
    pub fn blocks_checkout(&self) -> bool {
        matches!(self, ReceiptNotice::VoucherBelowMinimum { .. })
    }
}

impl fmt::Display for ReceiptNotice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReceiptNotice::VoucherBelowMinimum { code, shortfall } => {
                write!(f, "Voucher {code} needs {shortfall} more to apply")
            }
            ReceiptNotice::FreeShippingWithin { remaining } => {
                write!(f, "Add {remaining} more for free shipping")
            }
        }
    }
}

/// Snapshot of a priced cart.
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt<'a> {
    lines: SmallVec<[ReceiptLine<'a>; 8]>,
    subtotal: Money<'a, Currency>,
    shipping_fee: Money<'a, Currency>,
    flat_shipping_fee: Money<'a, Currency>,
    discount: Money<'a, Currency>,
    total: Money<'a, Currency>,
    item_count: u64,
    voucher: Option<ReceiptVoucher<'a>>,
    notices: SmallVec<[ReceiptNotice<'a>; 2]>,
}

impl<'a> Receipt<'a> {
    /// Price `cart` and capture the result.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the cart cannot be priced.
    pub fn from_cart(cart: &Cart<'a>) -> Result<Self, PricingError> {
        let totals = cart.totals()?;

        let lines = cart
            .iter()
            .map(|item| {
                Ok(ReceiptLine {
                    id: item.id().clone(),
                    name: item.name().to_string(),
                    options: *item.options(),
                    unit_price: *item.price(),
                    quantity: item.quantity(),
                    line_total: item.line_total()?,
                })
            })
            .collect::<Result<SmallVec<_>, PricingError>>()?;

        let voucher = cart.voucher().map(|voucher| ReceiptVoucher {
            code: voucher.code().to_string(),
            status: voucher.status_for(&totals.subtotal),
        });

        let mut notices = SmallVec::new();

        if let Some(ReceiptVoucher {
            code,
            status: VoucherStatus::BelowMinimum { shortfall },
        }) = &voucher
        {
            notices.push(ReceiptNotice::VoucherBelowMinimum {
                code: code.clone(),
                shortfall: *shortfall,
            });
        }

        let shipping = cart.shipping_policy();

        if !cart.is_empty()
            && totals.shipping_fee.to_minor_units() > 0
            && let Some(remaining) = shipping.free_shipping_shortfall(&totals.subtotal)
        {
            notices.push(ReceiptNotice::FreeShippingWithin { remaining });
        }

        Ok(Self {
            lines,
            subtotal: totals.subtotal,
            shipping_fee: totals.shipping_fee,
            flat_shipping_fee: shipping.flat_fee(),
            discount: totals.discount,
            total: totals.total,
            item_count: cart.item_count(),
            voucher,
            notices,
        })
    }

    /// Line items in display order
    pub fn lines(&self) -> &[ReceiptLine<'a>] {
        &self.lines
    }

    /// Total cost before discount and shipping
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Shipping fee charged
    pub fn shipping_fee(&self) -> Money<'a, Currency> {
        self.shipping_fee
    }

    /// Amount taken off by the voucher
    pub fn discount(&self) -> Money<'a, Currency> {
        self.discount
    }

    /// Amount charged
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }

    /// Total number of units
    pub fn item_count(&self) -> u64 {
        self.item_count
    }

    /// The selected voucher, if any
    pub fn voucher(&self) -> Option<&ReceiptVoucher<'a>> {
        self.voucher.as_ref()
    }

    /// Notices for the customer
    pub fn notices(&self) -> &[ReceiptNotice<'a>] {
        &self.notices
    }

    /// Whether the checkout action is disabled for this snapshot.
    pub fn checkout_blocked(&self) -> bool {
        self.lines.is_empty() || self.notices.iter().any(ReceiptNotice::blocks_checkout)
    }

    /// Discount plus any shipping fee waived.
    pub fn savings(&self) -> Money<'a, Currency> {
        let waived = self
            .flat_shipping_fee
            .to_minor_units()
            .saturating_sub(self.shipping_fee.to_minor_units());

        Money::from_minor(
            self.discount.to_minor_units().saturating_add(waived),
            self.subtotal.currency(),
        )
    }

    /// Writes the receipt as a table followed by a summary.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::IO`] if writing fails.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record(["", "Item", "Options", "Unit Price", "Qty", "Line Total"]);

        for (idx, line) in self.lines.iter().enumerate() {
            builder.push_record([
                format!("#{}", idx + 1),
                line.name.clone(),
                line.options.to_string(),
                line.unit_price.to_string(),
                line.quantity.to_string(),
                line.line_total.to_string(),
            ]);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(3..6), Alignment::right());

        writeln!(out, "\n{table}").map_err(|_err| ReceiptError::IO)?;

        self.write_summary(&mut out)
    }

    fn write_summary(&self, out: &mut impl io::Write) -> Result<(), ReceiptError> {
        let discount = match &self.voucher {
            Some(voucher) => format!("-{} ({})", self.discount, voucher.code),
            None => format!("-{}", self.discount),
        };

        let rows = [
            ("Subtotal:", self.subtotal.to_string()),
            ("Shipping:", self.shipping_fee.to_string()),
            ("Discount:", discount),
            ("Total:", self.total.to_string()),
        ];

        let value_width = rows.iter().map(|(_, value)| value.len()).max().unwrap_or(0);

        for (label, value) in rows {
            writeln!(out, " {label:>9}  {value:>value_width$}").map_err(|_err| ReceiptError::IO)?;
        }

        for notice in &self.notices {
            writeln!(out, " ! {notice}").map_err(|_err| ReceiptError::IO)?;
        }

        if self.checkout_blocked() {
            writeln!(out, " Checkout unavailable").map_err(|_err| ReceiptError::IO)?;
        }

        writeln!(out).map_err(|_err| ReceiptError::IO)
    }
}

#[cfg(test)]
mod tests {
    use decimal_percentage::Percentage;
    use rusty_money::iso::VND;
    use testresult::TestResult;

    use crate::{
        discounts::VoucherDiscount,
        items::{DrinkOptions, NewLineItem},
        pricing::ShippingPolicy,
        vouchers::Voucher,
    };

    use super::*;

    fn vnd(minor: i64) -> Money<'static, Currency> {
        Money::from_minor(minor, VND)
    }

    fn cart_with_coffee(quantity: u32) -> TestResult<Cart<'static>> {
        let mut cart = Cart::new(ShippingPolicy::new(vnd(20_000), Some(vnd(200_000)))?);

        cart.add_item(NewLineItem {
            product_id: "ca-phe-sua-da".to_string(),
            name: "Cà phê sữa đá".to_string(),
            price: vnd(45_000),
            quantity,
            options: ItemOptions::Drink(DrinkOptions::default()),
            note: None,
        })?;

        Ok(cart)
    }

    #[test]
    fn from_cart_captures_totals() -> TestResult {
        let cart = cart_with_coffee(2)?;
        let receipt = Receipt::from_cart(&cart)?;

        assert_eq!(receipt.subtotal(), vnd(90_000));
        assert_eq!(receipt.shipping_fee(), vnd(20_000));
        assert_eq!(receipt.discount(), vnd(0));
        assert_eq!(receipt.total(), vnd(110_000));
        assert_eq!(receipt.item_count(), 2);
        assert_eq!(receipt.lines().len(), 1);
        assert!(!receipt.checkout_blocked());

        Ok(())
    }

    #[test]
    fn voucher_below_minimum_blocks_checkout() -> TestResult {
        let mut cart = cart_with_coffee(2)?;

        cart.select_voucher(
            Voucher::new("v1", "FREESHIP", VoucherDiscount::FreeShipping)?
                .with_min_order(vnd(100_000))?,
        )?;

        let receipt = Receipt::from_cart(&cart)?;

        assert!(receipt.checkout_blocked());
        assert_eq!(
            receipt.voucher().map(|voucher| voucher.status),
            Some(VoucherStatus::BelowMinimum {
                shortfall: vnd(10_000)
            })
        );
        assert!(receipt.notices().contains(&ReceiptNotice::VoucherBelowMinimum {
            code: "FREESHIP".to_string(),
            shortfall: vnd(10_000),
        }));

        Ok(())
    }

    #[test]
    fn free_shipping_hint_below_threshold() -> TestResult {
        let receipt = Receipt::from_cart(&cart_with_coffee(4)?)?;

        assert_eq!(
            receipt.notices(),
            &[ReceiptNotice::FreeShippingWithin {
                remaining: vnd(20_000)
            }]
        );

        let receipt = Receipt::from_cart(&cart_with_coffee(5)?)?;

        assert!(receipt.notices().is_empty());

        Ok(())
    }

    #[test]
    fn savings_include_waived_shipping() -> TestResult {
        let mut cart = cart_with_coffee(3)?;

        cart.select_voucher(Voucher::new("v2", "FREESHIP", VoucherDiscount::FreeShipping)?)?;

        assert_eq!(Receipt::from_cart(&cart)?.savings(), vnd(20_000));

        cart.select_voucher(
            Voucher::new(
                "v3",
                "GIAM10",
                VoucherDiscount::PercentageOff(Percentage::from(0.10)),
            )?
            .with_max_discount(vnd(5_000))?,
        )?;

        assert_eq!(Receipt::from_cart(&cart)?.savings(), vnd(5_000));

        Ok(())
    }

    #[test]
    fn empty_cart_receipt_blocks_checkout() -> TestResult {
        let cart = Cart::new(ShippingPolicy::new(vnd(20_000), None)?);
        let receipt = Receipt::from_cart(&cart)?;

        assert!(receipt.checkout_blocked());
        assert!(receipt.notices().is_empty());

        Ok(())
    }

    #[test]
    fn write_to_renders_lines_and_summary() -> TestResult {
        let mut cart = cart_with_coffee(2)?;

        cart.select_voucher(
            Voucher::new("v4", "GIAM15K", VoucherDiscount::AmountOff(vnd(15_000)))?
                .with_min_order(vnd(0))?,
        )?;

        let mut out = Vec::new();
        Receipt::from_cart(&cart)?.write_to(&mut out)?;
        let rendered = String::from_utf8(out)?;

        assert!(rendered.contains("Cà phê sữa đá"));
        assert!(rendered.contains("Subtotal:"));
        assert!(rendered.contains("GIAM15K"));
        assert!(!rendered.contains("Checkout unavailable"));

        Ok(())
    }
}
