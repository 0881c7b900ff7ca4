//! Cart
//!
//! The cart owned by one shopping session: an ordered list of line items and
//! at most one selected voucher. Amounts are derived on every read and never
//! stored.

use std::num::NonZeroU32;

use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::debug;

use crate::{
    config::StoreConfig,
    items::{LineItem, LineItemError, LineItemId, NewLineItem},
    pricing::{self, PricingError, ShippingPolicy, Totals},
    receipt::Receipt,
    vouchers::{Voucher, VoucherStatus},
};

/// Errors related to cart mutations.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// An amount's currency differs from the cart currency (amount currency, cart currency).
    #[error("Amount has currency {0}, but cart has currency {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// The line item was not found in the cart.
    #[error("Line item {0} not found")]
    ItemNotFound(LineItemId),

    /// A quantity did not fit the quantity range.
    #[error("Quantity {0} is out of range")]
    QuantityOutOfRange(i64),

    /// The line item could not be built.
    #[error(transparent)]
    LineItem(#[from] LineItemError),

    /// The cart could not be priced.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Outcome of a quantity change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// The line item now has this quantity.
    Updated(u32),

    /// The quantity dropped to zero and the line item was removed.
    Removed,
}

/// Cart
#[derive(Debug, Clone)]
pub struct Cart<'a> {
    items: Vec<LineItem<'a>>,
    voucher: Option<Voucher<'a>>,
    shipping: ShippingPolicy<'a>,
    next_stamp: u64,
}

impl<'a> Cart<'a> {
    /// Create an empty cart priced with `shipping`; the cart currency is the
    /// currency of the shipping fee.
    #[must_use]
    pub fn new(shipping: ShippingPolicy<'a>) -> Self {
        Self {
            items: Vec::new(),
            voucher: None,
            shipping,
            next_stamp: 1,
        }
    }

    /// Create an empty cart for a store.
    #[must_use]
    pub fn for_store(config: &StoreConfig<'a>) -> Self {
        Self::new(config.shipping)
    }

    /// Add a product to the cart and return the new line item's id.
    ///
    /// Every call creates a new line item, even when an identical product with
    /// identical options is already in the cart.
    ///
    /// # Errors
    ///
    /// - [`CartError::CurrencyMismatch`] if the price is in another currency.
    /// - [`CartError::LineItem`] for a negative price or zero quantity.
    pub fn add_item(&mut self, new: NewLineItem<'a>) -> Result<LineItemId, CartError> {
        self.ensure_currency(&new.price)?;

        let id = LineItemId::new(&new.product_id, self.next_stamp);
        let item = LineItem::new(id.clone(), new)?;

        self.next_stamp += 1;

        debug!(
            item_id = %id,
            product_id = item.product_id(),
            quantity = item.quantity(),
            "added line item"
        );

        self.items.push(item);

        Ok(id)
    }

    /// Remove a line item and return it.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] if no line item has this id.
    pub fn remove_item(&mut self, id: &LineItemId) -> Result<LineItem<'a>, CartError> {
        let index = self.position(id)?;
        let removed = self.items.remove(index);

        debug!(item_id = %id, "removed line item");

        Ok(removed)
    }

    /// Set the quantity of a line item. A quantity of zero or less removes it.
    ///
    /// # Errors
    ///
    /// - [`CartError::ItemNotFound`] if no line item has this id.
    /// - [`CartError::QuantityOutOfRange`] if `quantity` exceeds `u32::MAX`.
    pub fn set_quantity(
        &mut self,
        id: &LineItemId,
        quantity: i64,
    ) -> Result<QuantityChange, CartError> {
        let index = self.position(id)?;

        let Some(quantity) = positive_quantity(quantity)? else {
            self.items.remove(index);
            debug!(item_id = %id, "quantity dropped to zero, removed line item");

            return Ok(QuantityChange::Removed);
        };

        let item = self
            .items
            .get_mut(index)
            .ok_or_else(|| CartError::ItemNotFound(id.clone()))?;

        item.set_quantity(quantity);

        debug!(item_id = %id, quantity = quantity.get(), "updated quantity");

        Ok(QuantityChange::Updated(quantity.get()))
    }

    /// Add one unit to a line item.
    ///
    /// # Errors
    ///
    /// See [`Cart::set_quantity`].
    pub fn increase_quantity(&mut self, id: &LineItemId) -> Result<QuantityChange, CartError> {
        let current = self.quantity_of(id)?;

        self.set_quantity(id, current + 1)
    }

    /// Take one unit off a line item, removing it at zero.
    ///
    /// # Errors
    ///
    /// See [`Cart::set_quantity`].
    pub fn decrease_quantity(&mut self, id: &LineItemId) -> Result<QuantityChange, CartError> {
        let current = self.quantity_of(id)?;

        self.set_quantity(id, current - 1)
    }

    /// Select a voucher, replacing any previous selection.
    ///
    /// A voucher is accepted even if the cart does not meet its minimum order;
    /// [`Cart::is_voucher_valid`] reports that.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::CurrencyMismatch`] if the voucher's amounts are in another currency.
    pub fn select_voucher(&mut self, voucher: Voucher<'a>) -> Result<(), CartError> {
        if let Some(currency) = voucher.currency() {
            self.ensure_currency_of(currency)?;
        }

        debug!(voucher = voucher.code(), "selected voucher");

        self.voucher = Some(voucher);

        Ok(())
    }

    /// Deselect the voucher and return it.
    pub fn clear_voucher(&mut self) -> Option<Voucher<'a>> {
        let cleared = self.voucher.take();

        if let Some(voucher) = &cleared {
            debug!(voucher = voucher.code(), "cleared voucher");
        }

        cleared
    }

    /// Remove every line item and the selected voucher.
    pub fn clear(&mut self) {
        debug!(items = self.items.len(), "cleared cart");

        self.items.clear();
        self.voucher = None;
    }

    /// Sum of unit price times quantity.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the sum overflows.
    pub fn subtotal(&self) -> Result<Money<'a, Currency>, PricingError> {
        pricing::subtotal(&self.items, self.currency())
    }

    /// Shipping fee after the free-shipping threshold and any valid
    /// free-shipping voucher.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the cart cannot be priced.
    pub fn shipping_fee(&self) -> Result<Money<'a, Currency>, PricingError> {
        Ok(self.totals()?.shipping_fee)
    }

    /// Amount the selected voucher takes off; zero without a valid voucher.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the cart cannot be priced.
    pub fn discount_amount(&self) -> Result<Money<'a, Currency>, PricingError> {
        Ok(self.totals()?.discount)
    }

    /// Subtotal minus discount plus shipping, never below zero.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the cart cannot be priced.
    pub fn total_price(&self) -> Result<Money<'a, Currency>, PricingError> {
        Ok(self.totals()?.total)
    }

    /// All derived amounts at once.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the cart cannot be priced.
    pub fn totals(&self) -> Result<Totals<'a>, PricingError> {
        pricing::price(&self.items, self.voucher.as_ref(), &self.shipping)
    }

    /// Eligibility of the selected voucher, `None` without one.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the subtotal cannot be calculated.
    pub fn voucher_status(&self) -> Result<Option<VoucherStatus<'a>>, PricingError> {
        let Some(voucher) = &self.voucher else {
            return Ok(None);
        };

        Ok(Some(voucher.status_for(&self.subtotal()?)))
    }

    /// Whether a voucher is selected and applies to the cart.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the subtotal cannot be calculated.
    pub fn is_voucher_valid(&self) -> Result<bool, PricingError> {
        Ok(self
            .voucher_status()?
            .is_some_and(|status| status.is_applicable()))
    }

    /// How much more has to be ordered for the selected voucher to apply.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the subtotal cannot be calculated.
    pub fn voucher_shortfall(&self) -> Result<Option<Money<'a, Currency>>, PricingError> {
        Ok(match self.voucher_status()? {
            Some(VoucherStatus::BelowMinimum { shortfall }) => Some(shortfall),
            Some(VoucherStatus::Applicable) | None => None,
        })
    }

    /// Whether the checkout action is enabled: the cart has items and the
    /// selected voucher, if any, applies.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the subtotal cannot be calculated.
    pub fn can_checkout(&self) -> Result<bool, PricingError> {
        if self.is_empty() {
            return Ok(false);
        }

        Ok(self
            .voucher_status()?
            .is_none_or(|status| status.is_applicable()))
    }

    /// Snapshot of the cart and every derived amount.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the cart cannot be priced.
    pub fn receipt(&self) -> Result<Receipt<'a>, PricingError> {
        Receipt::from_cart(self)
    }

    /// Get a line item by id.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] if no line item has this id.
    pub fn get_item(&self, id: &LineItemId) -> Result<&LineItem<'a>, CartError> {
        self.items
            .iter()
            .find(|item| item.id() == id)
            .ok_or_else(|| CartError::ItemNotFound(id.clone()))
    }

    /// Whether a line item with this id is in the cart.
    pub fn contains(&self, id: &LineItemId) -> bool {
        self.items.iter().any(|item| item.id() == id)
    }

    /// Iterate over the line items in display order.
    pub fn iter(&self) -> impl Iterator<Item = &LineItem<'a>> {
        self.items.iter()
    }

    /// The line items in display order.
    pub fn items(&self) -> &[LineItem<'a>] {
        &self.items
    }

    /// The selected voucher.
    pub fn voucher(&self) -> Option<&Voucher<'a>> {
        self.voucher.as_ref()
    }

    /// The shipping policy the cart is priced with.
    pub fn shipping_policy(&self) -> &ShippingPolicy<'a> {
        &self.shipping
    }

    /// Total number of units across all line items.
    pub fn item_count(&self) -> u64 {
        self.items
            .iter()
            .map(|item| u64::from(item.quantity()))
            .sum()
    }

    /// Number of line items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The cart currency.
    #[must_use]
    pub fn currency(&self) -> &'a Currency {
        self.shipping.currency()
    }

    fn position(&self, id: &LineItemId) -> Result<usize, CartError> {
        self.items
            .iter()
            .position(|item| item.id() == id)
            .ok_or_else(|| CartError::ItemNotFound(id.clone()))
    }

    fn quantity_of(&self, id: &LineItemId) -> Result<i64, CartError> {
        Ok(i64::from(self.get_item(id)?.quantity()))
    }

    fn ensure_currency(&self, amount: &Money<'a, Currency>) -> Result<(), CartError> {
        self.ensure_currency_of(amount.currency())
    }

    fn ensure_currency_of(&self, currency: &Currency) -> Result<(), CartError> {
        if currency == self.currency() {
            Ok(())
        } else {
            Err(CartError::CurrencyMismatch(
                currency.iso_alpha_code,
                self.currency().iso_alpha_code,
            ))
        }
    }
}

fn positive_quantity(quantity: i64) -> Result<Option<NonZeroU32>, CartError> {
    if quantity <= 0 {
        return Ok(None);
    }

    u32::try_from(quantity)
        .map(NonZeroU32::new)
        .map_err(|_err| CartError::QuantityOutOfRange(quantity))
}

#[cfg(test)]
mod tests {
    use decimal_percentage::Percentage;
    use rusty_money::iso::{USD, VND};
    use testresult::TestResult;

    use crate::{
        discounts::VoucherDiscount,
        items::{DrinkOptions, ItemOptions, Level, Size},
    };

    use super::*;

    fn vnd(minor: i64) -> Money<'static, Currency> {
        Money::from_minor(minor, VND)
    }

    fn cart() -> Result<Cart<'static>, PricingError> {
        Ok(Cart::new(ShippingPolicy::new(vnd(20_000), Some(vnd(200_000)))?))
    }

    fn drink(product_id: &str, price: i64, quantity: u32) -> NewLineItem<'static> {
        NewLineItem {
            product_id: product_id.to_string(),
            name: product_id.to_string(),
            price: vnd(price),
            quantity,
            options: ItemOptions::Drink(DrinkOptions::default()),
            note: None,
        }
    }

    #[test]
    fn add_item_keeps_insertion_order() -> TestResult {
        let mut cart = cart()?;

        cart.add_item(drink("tra-dao", 39_000, 1))?;
        cart.add_item(drink("bac-xiu", 35_000, 1))?;

        let products: Vec<&str> = cart.iter().map(LineItem::product_id).collect();

        assert_eq!(products, vec!["tra-dao", "bac-xiu"]);

        Ok(())
    }

    #[test]
    fn add_same_product_twice_creates_two_lines() -> TestResult {
        let mut cart = cart()?;

        let first = cart.add_item(drink("tra-dao", 39_000, 1))?;
        let second = cart.add_item(drink("tra-dao", 39_000, 1))?;

        assert_ne!(first, second);
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.item_count(), 2);

        Ok(())
    }

    #[test]
    fn add_item_rejects_foreign_currency() -> TestResult {
        let mut cart = cart()?;
        let mut new = drink("latte", 0, 1);
        new.price = Money::from_minor(450, USD);

        assert_eq!(
            cart.add_item(new),
            Err(CartError::CurrencyMismatch("USD", "VND"))
        );
        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn add_item_rejects_zero_quantity() -> TestResult {
        let mut cart = cart()?;

        assert_eq!(
            cart.add_item(drink("tra-dao", 39_000, 0)),
            Err(CartError::LineItem(LineItemError::ZeroQuantity))
        );

        Ok(())
    }

    #[test]
    fn set_quantity_updates_line() -> TestResult {
        let mut cart = cart()?;
        let id = cart.add_item(drink("tra-dao", 39_000, 1))?;

        assert_eq!(cart.set_quantity(&id, 3)?, QuantityChange::Updated(3));
        assert_eq!(cart.get_item(&id)?.quantity(), 3);
        assert_eq!(cart.subtotal()?, vnd(117_000));

        Ok(())
    }

    #[test]
    fn set_quantity_to_zero_or_less_removes() -> TestResult {
        let mut cart = cart()?;
        let first = cart.add_item(drink("tra-dao", 39_000, 2))?;
        let second = cart.add_item(drink("bac-xiu", 35_000, 2))?;

        assert_eq!(cart.set_quantity(&first, 0)?, QuantityChange::Removed);
        assert_eq!(cart.set_quantity(&second, -4)?, QuantityChange::Removed);
        assert!(!cart.contains(&first));
        assert!(!cart.contains(&second));
        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn set_quantity_out_of_range_errors() -> TestResult {
        let mut cart = cart()?;
        let id = cart.add_item(drink("tra-dao", 39_000, 1))?;

        assert_eq!(
            cart.set_quantity(&id, i64::from(u32::MAX) + 1),
            Err(CartError::QuantityOutOfRange(i64::from(u32::MAX) + 1))
        );

        Ok(())
    }

    #[test]
    fn decrease_at_one_removes() -> TestResult {
        let mut cart = cart()?;
        let id = cart.add_item(drink("tra-dao", 39_000, 1))?;

        assert_eq!(cart.increase_quantity(&id)?, QuantityChange::Updated(2));
        assert_eq!(cart.decrease_quantity(&id)?, QuantityChange::Updated(1));
        assert_eq!(cart.decrease_quantity(&id)?, QuantityChange::Removed);
        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn missing_item_errors() -> TestResult {
        let mut cart = cart()?;
        let id = LineItemId::from("ghost-1");

        assert_eq!(
            cart.remove_item(&id).err(),
            Some(CartError::ItemNotFound(id.clone()))
        );
        assert_eq!(
            cart.set_quantity(&id, 1),
            Err(CartError::ItemNotFound(id.clone()))
        );

        Ok(())
    }

    #[test]
    fn remove_item_returns_line() -> TestResult {
        let mut cart = cart()?;
        let options = ItemOptions::Drink(DrinkOptions {
            size: Size::Large,
            ice: Level::new(0)?,
            sugar: Level::new(50)?,
        });
        let id = cart.add_item(drink("tra-sen", 42_000, 1).with_options(options))?;

        let removed = cart.remove_item(&id)?;

        assert_eq!(removed.options(), &options);
        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn voucher_validity_follows_subtotal() -> TestResult {
        let mut cart = cart()?;
        let id = cart.add_item(drink("ca-phe-sua-da", 45_000, 2))?;

        cart.select_voucher(
            Voucher::new("v1", "FREESHIP", VoucherDiscount::FreeShipping)?
                .with_min_order(vnd(100_000))?,
        )?;

        assert!(!cart.is_voucher_valid()?);
        assert_eq!(cart.voucher_shortfall()?, Some(vnd(10_000)));
        assert!(!cart.can_checkout()?);

        cart.set_quantity(&id, 3)?;

        assert!(cart.is_voucher_valid()?);
        assert_eq!(cart.shipping_fee()?, vnd(0));
        assert!(cart.can_checkout()?);

        cart.set_quantity(&id, 1)?;

        assert!(!cart.is_voucher_valid()?);
        assert!(cart.voucher().is_some());

        Ok(())
    }

    #[test]
    fn select_voucher_rejects_foreign_currency() -> TestResult {
        let mut cart = cart()?;
        let voucher = Voucher::new(
            "v2",
            "USD5",
            VoucherDiscount::AmountOff(Money::from_minor(500, USD)),
        )?;

        assert_eq!(
            cart.select_voucher(voucher),
            Err(CartError::CurrencyMismatch("USD", "VND"))
        );
        assert!(cart.voucher().is_none());

        Ok(())
    }

    #[test]
    fn clear_voucher_returns_selection() -> TestResult {
        let mut cart = cart()?;
        let voucher = Voucher::new(
            "v3",
            "GIAM10",
            VoucherDiscount::PercentageOff(Percentage::from(0.10)),
        )?;

        cart.select_voucher(voucher.clone())?;

        assert_eq!(cart.clear_voucher(), Some(voucher));
        assert_eq!(cart.clear_voucher(), None);
        assert!(!cart.is_voucher_valid()?);

        Ok(())
    }

    #[test]
    fn clear_empties_items_and_voucher() -> TestResult {
        let mut cart = cart()?;

        cart.add_item(drink("tra-dao", 39_000, 2))?;
        cart.select_voucher(Voucher::new("v4", "FREESHIP", VoucherDiscount::FreeShipping)?)?;
        cart.clear();

        assert!(cart.is_empty());
        assert!(cart.voucher().is_none());
        assert_eq!(cart.subtotal()?, vnd(0));

        Ok(())
    }

    #[test]
    fn ids_stay_unique_after_removal() -> TestResult {
        let mut cart = cart()?;

        let first = cart.add_item(drink("tra-dao", 39_000, 1))?;
        cart.remove_item(&first)?;
        let second = cart.add_item(drink("tra-dao", 39_000, 1))?;

        assert_ne!(first, second);

        Ok(())
    }

    #[test]
    fn empty_cart_cannot_check_out() -> TestResult {
        let cart = cart()?;

        assert!(!cart.can_checkout()?);

        Ok(())
    }

    #[test]
    fn derived_amounts_are_idempotent() -> TestResult {
        let mut cart = cart()?;

        cart.add_item(drink("ca-phe-sua-da", 45_000, 2))?;

        assert_eq!(cart.totals()?, cart.totals()?);
        assert_eq!(cart.total_price()?, vnd(110_000));

        Ok(())
    }
}
