//! Items
//!
//! Cart line items and the per-line options a customer picks when adding a
//! product to the cart.

use std::{fmt, num::NonZeroU32};

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{pricing::PricingError, products::Product};

/// Errors raised when constructing line items.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LineItemError {
    /// The unit price was below zero.
    #[error("line item price must not be negative, got {0} minor units")]
    NegativePrice(i64),

    /// A line item was created with a quantity of zero.
    #[error("line item quantity must be at least 1")]
    ZeroQuantity,

    /// An ice or sugar level was outside 0-100%.
    #[error("level must be between 0 and 100 percent, got {0}")]
    InvalidLevel(u8),
}

/// Identifier of a line item, unique within its cart.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineItemId(String);

impl LineItemId {
    /// Derive an identifier from a product identifier and a creation stamp.
    #[must_use]
    pub fn new(product_id: &str, stamp: u64) -> Self {
        Self(format!("{product_id}-{stamp}"))
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LineItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LineItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Cup size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Size {
    /// Small
    Small,
    /// Medium
    #[default]
    Medium,
    /// Large
    Large,
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Size::Small => "S",
            Size::Medium => "M",
            Size::Large => "L",
        })
    }
}

/// Ice or sugar level, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Level(u8);

impl Level {
    /// The usual level when the customer does not pick one.
    pub const FULL: Level = Level(100);

    /// Create a level.
    ///
    /// # Errors
    ///
    /// Returns [`LineItemError::InvalidLevel`] when `percent` exceeds 100.
    pub fn new(percent: u8) -> Result<Self, LineItemError> {
        if percent > 100 {
            return Err(LineItemError::InvalidLevel(percent));
        }

        Ok(Self(percent))
    }

    /// The level in percent.
    #[must_use]
    pub fn percent(self) -> u8 {
        self.0
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::FULL
    }
}

/// Options that only make sense for drinks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrinkOptions {
    /// Cup size
    pub size: Size,

    /// Ice level
    pub ice: Level,

    /// Sugar level
    pub sugar: Level,
}

/// Options chosen for a line item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ItemOptions {
    /// A drink with size, ice and sugar levels.
    Drink(DrinkOptions),

    /// Anything without drink options (cakes, snacks).
    #[default]
    Plain,
}

impl ItemOptions {
    /// Whether these options belong to a drink.
    #[must_use]
    pub fn is_drink(&self) -> bool {
        matches!(self, ItemOptions::Drink(_))
    }
}

impl fmt::Display for ItemOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemOptions::Drink(drink) => write!(
                f,
                "{} · {}% ice · {}% sugar",
                drink.size,
                drink.ice.percent(),
                drink.sugar.percent()
            ),
            ItemOptions::Plain => Ok(()),
        }
    }
}

/// A request to add a product to a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLineItem<'a> {
    /// Catalog identifier of the product
    pub product_id: String,

    /// Display name
    pub name: String,

    /// Unit price at the time of adding
    pub price: Money<'a, Currency>,

    /// Number of units
    pub quantity: u32,

    /// Chosen options
    pub options: ItemOptions,

    /// Free-form note for the barista
    pub note: Option<String>,
}

impl<'a> NewLineItem<'a> {
    /// Build a request for `quantity` units of a catalog product.
    ///
    /// Drinks get default drink options; use [`NewLineItem::with_options`] to
    /// pick others.
    #[must_use]
    pub fn from_product(product: &Product<'a>, quantity: u32) -> Self {
        let options = if product.is_drink {
            ItemOptions::Drink(DrinkOptions::default())
        } else {
            ItemOptions::Plain
        };

        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            quantity,
            options,
            note: None,
        }
    }

    /// Replace the chosen options.
    #[must_use]
    pub fn with_options(mut self, options: ItemOptions) -> Self {
        self.options = options;
        self
    }

    /// Attach a note.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// A product entry in a cart with its own quantity and options.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem<'a> {
    id: LineItemId,
    product_id: String,
    name: String,
    price: Money<'a, Currency>,
    quantity: NonZeroU32,
    options: ItemOptions,
    note: Option<String>,
}

impl<'a> LineItem<'a> {
    /// Validate a request and turn it into a line item with the given id.
    ///
    /// # Errors
    ///
    /// - [`LineItemError::NegativePrice`] if the unit price is below zero.
    /// - [`LineItemError::ZeroQuantity`] if the quantity is zero.
    pub fn new(id: LineItemId, new: NewLineItem<'a>) -> Result<Self, LineItemError> {
        let minor = new.price.to_minor_units();

        if minor < 0 {
            return Err(LineItemError::NegativePrice(minor));
        }

        let quantity = NonZeroU32::new(new.quantity).ok_or(LineItemError::ZeroQuantity)?;

        Ok(Self {
            id,
            product_id: new.product_id,
            name: new.name,
            price: new.price,
            quantity,
            options: new.options,
            note: new.note,
        })
    }

    /// Returns the line item id
    pub fn id(&self) -> &LineItemId {
        &self.id
    }

    /// Returns the catalog identifier of the product
    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    /// Returns the display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the unit price
    pub fn price(&self) -> &Money<'a, Currency> {
        &self.price
    }

    /// Returns the quantity
    pub fn quantity(&self) -> u32 {
        self.quantity.get()
    }

    /// Returns the chosen options
    pub fn options(&self) -> &ItemOptions {
        &self.options
    }

    /// Returns the note, if any
    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    /// Whether this line is a drink
    pub fn is_drink(&self) -> bool {
        self.options.is_drink()
    }

    pub(crate) fn set_quantity(&mut self, quantity: NonZeroU32) {
        self.quantity = quantity;
    }

    /// Unit price times quantity.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if the product does not fit in minor units.
    pub fn line_total(&self) -> Result<Money<'a, Currency>, PricingError> {
        let total = self
            .price
            .to_minor_units()
            .checked_mul(i64::from(self.quantity.get()))
            .ok_or(PricingError::Overflow)?;

        Ok(Money::from_minor(total, self.price.currency()))
    }
}
