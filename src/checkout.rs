//! Checkout
//!
//! Turns a cart into an order draft for submission, refusing carts the
//! checkout action is disabled for.

use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    cart::Cart,
    items::LineItem,
    pricing::PricingError,
    vouchers::VoucherStatus,
};

/// Reasons a checkout is refused.
#[derive(Debug, Error, PartialEq)]
pub enum CheckoutError {
    /// The cart has no line items.
    #[error("cart is empty")]
    EmptyCart,

    /// The selected voucher has not reached its minimum order.
    #[error("voucher {code} needs {shortfall} more to apply")]
    VoucherBelowMinimum {
        /// Voucher code
        code: String,
        /// Amount still missing, in minor units
        shortfall: i64,
    },

    /// A required delivery field is blank.
    #[error("delivery {0} is required")]
    MissingField(&'static str),

    /// The phone number is not a plausible phone number.
    #[error("invalid phone number: {0}")]
    InvalidPhone(String),

    /// The cart could not be priced.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaymentMethod {
    /// Cash to the courier
    #[default]
    CashOnDelivery,

    /// Bank transfer before delivery
    BankTransfer,
}

/// Where the order goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryDetails {
    /// Recipient name
    pub recipient: String,

    /// Contact phone number
    pub phone: String,

    /// Delivery address
    pub address: String,
}

impl DeliveryDetails {
    /// Check every field is filled in and the phone number is plausible.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::MissingField`] for a blank field.
    /// - [`CheckoutError::InvalidPhone`] when the phone has characters other than
    ///   digits, spaces, `+`, `-` and `.`, or fewer than 9 or more than 15 digits.
    pub fn validate(&self) -> Result<(), CheckoutError> {
        for (field, value) in [
            ("recipient", &self.recipient),
            ("phone", &self.phone),
            ("address", &self.address),
        ] {
            if value.trim().is_empty() {
                return Err(CheckoutError::MissingField(field));
            }
        }

        let phone = self.phone.trim();
        let allowed = phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '.'));
        let digits = phone.chars().filter(char::is_ascii_digit).count();

        if !allowed || !(9..=15).contains(&digits) {
            return Err(CheckoutError::InvalidPhone(self.phone.clone()));
        }

        Ok(())
    }
}

/// What the customer entered on the checkout screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    /// Delivery details
    pub delivery: DeliveryDetails,

    /// Payment method
    pub payment: PaymentMethod,

    /// Note for the store
    pub note: Option<String>,
}

/// A priced order ready to be submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft<'a> {
    /// Line items at checkout time
    pub items: Vec<LineItem<'a>>,

    /// Code of the applied voucher
    pub voucher_code: Option<String>,

    /// Sum of line totals
    pub subtotal: Money<'a, Currency>,

    /// Shipping fee charged
    pub shipping_fee: Money<'a, Currency>,

    /// Amount taken off by the voucher
    pub discount: Money<'a, Currency>,

    /// Amount charged
    pub total: Money<'a, Currency>,

    /// Delivery details
    pub delivery: DeliveryDetails,

    /// Payment method
    pub payment: PaymentMethod,

    /// Note for the store
    pub note: Option<String>,
}

/// Check out `cart`.
///
/// The cart is left untouched; clearing it after a successful submission is up
/// to the caller.
///
/// # Errors
///
/// - [`CheckoutError::EmptyCart`] for an empty cart.
/// - [`CheckoutError::VoucherBelowMinimum`] when the selected voucher does not apply.
/// - [`CheckoutError::MissingField`] / [`CheckoutError::InvalidPhone`] for bad delivery details.
/// - [`CheckoutError::Pricing`] if the cart cannot be priced.
pub fn checkout<'a>(
    cart: &Cart<'a>,
    request: CheckoutRequest,
) -> Result<OrderDraft<'a>, CheckoutError> {
    if cart.is_empty() {
        warn!("checkout refused: empty cart");
        return Err(CheckoutError::EmptyCart);
    }

    if let (Some(voucher), Some(VoucherStatus::BelowMinimum { shortfall })) =
        (cart.voucher(), cart.voucher_status()?)
    {
        warn!(voucher = voucher.code(), %shortfall, "checkout refused: voucher below minimum order");

        return Err(CheckoutError::VoucherBelowMinimum {
            code: voucher.code().to_string(),
            shortfall: shortfall.to_minor_units(),
        });
    }

    request.delivery.validate()?;

    let totals = cart.totals()?;
    let note = request
        .note
        .map(|note| note.trim().to_string())
        .filter(|note| !note.is_empty());

    info!(
        items = cart.len(),
        total = %totals.total,
        voucher = cart.voucher().map(|voucher| voucher.code()),
        "checked out cart"
    );

    Ok(OrderDraft {
        items: cart.items().to_vec(),
        voucher_code: cart.voucher().map(|voucher| voucher.code().to_string()),
        subtotal: totals.subtotal,
        shipping_fee: totals.shipping_fee,
        discount: totals.discount,
        total: totals.total,
        delivery: request.delivery,
        payment: request.payment,
        note,
    })
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::VND;
    use testresult::TestResult;

    use crate::{
        discounts::VoucherDiscount,
        items::{ItemOptions, NewLineItem},
        pricing::ShippingPolicy,
        vouchers::Voucher,
    };

    use super::*;

    fn vnd(minor: i64) -> Money<'static, Currency> {
        Money::from_minor(minor, VND)
    }

    fn request() -> CheckoutRequest {
        CheckoutRequest {
            delivery: DeliveryDetails {
                recipient: "Nguyễn Văn An".to_string(),
                phone: "0901 234 567".to_string(),
                address: "12 Lý Tự Trọng, Quận 1".to_string(),
            },
            payment: PaymentMethod::CashOnDelivery,
            note: Some("  ít đá  ".to_string()),
        }
    }

    fn cart(quantity: u32) -> TestResult<Cart<'static>> {
        let mut cart = Cart::new(ShippingPolicy::new(vnd(20_000), Some(vnd(200_000)))?);

        cart.add_item(NewLineItem {
            product_id: "ca-phe-sua-da".to_string(),
            name: "Cà phê sữa đá".to_string(),
            price: vnd(45_000),
            quantity,
            options: ItemOptions::Plain,
            note: None,
        })?;

        Ok(cart)
    }

    #[test]
    fn checkout_builds_draft() -> TestResult {
        let mut cart = cart(2)?;

        cart.select_voucher(
            Voucher::new("v1", "GIAM15K", VoucherDiscount::AmountOff(vnd(15_000)))?
                .with_min_order(vnd(0))?,
        )?;

        let draft = checkout(&cart, request())?;

        assert_eq!(draft.items.len(), 1);
        assert_eq!(draft.voucher_code.as_deref(), Some("GIAM15K"));
        assert_eq!(draft.subtotal, vnd(90_000));
        assert_eq!(draft.discount, vnd(15_000));
        assert_eq!(draft.shipping_fee, vnd(20_000));
        assert_eq!(draft.total, vnd(95_000));
        assert_eq!(draft.note.as_deref(), Some("ít đá"));
        assert_eq!(cart.len(), 1);

        Ok(())
    }

    #[test]
    fn empty_cart_is_refused() -> TestResult {
        let cart = Cart::new(ShippingPolicy::new(vnd(20_000), None)?);

        assert_eq!(checkout(&cart, request()), Err(CheckoutError::EmptyCart));

        Ok(())
    }

    #[test]
    fn voucher_below_minimum_is_refused() -> TestResult {
        let mut cart = cart(2)?;

        cart.select_voucher(
            Voucher::new("v2", "FREESHIP", VoucherDiscount::FreeShipping)?
                .with_min_order(vnd(100_000))?,
        )?;

        assert_eq!(
            checkout(&cart, request()),
            Err(CheckoutError::VoucherBelowMinimum {
                code: "FREESHIP".to_string(),
                shortfall: 10_000,
            })
        );

        Ok(())
    }

    #[test]
    fn blank_fields_are_refused() -> TestResult {
        let cart = cart(1)?;
        let mut missing_address = request();
        missing_address.delivery.address = "   ".to_string();

        assert_eq!(
            checkout(&cart, missing_address),
            Err(CheckoutError::MissingField("address"))
        );

        Ok(())
    }

    #[test]
    fn implausible_phone_is_refused() {
        let mut details = request().delivery;

        details.phone = "0901-ABC".to_string();
        assert!(matches!(details.validate(), Err(CheckoutError::InvalidPhone(_))));

        details.phone = "1234".to_string();
        assert!(matches!(details.validate(), Err(CheckoutError::InvalidPhone(_))));

        details.phone = "+84 901 234 567".to_string();
        assert_eq!(details.validate(), Ok(()));
    }

    #[test]
    fn blank_note_is_dropped() -> TestResult {
        let cart = cart(1)?;
        let mut blank_note = request();
        blank_note.note = Some("  ".to_string());
        blank_note.payment = PaymentMethod::BankTransfer;

        let draft = checkout(&cart, blank_note)?;

        assert_eq!(draft.note, None);
        assert_eq!(draft.payment, PaymentMethod::BankTransfer);

        Ok(())
    }
}
