//! Cart Fixtures

use serde::Deserialize;

use crate::{
    fixtures::FixtureError,
    items::{DrinkOptions, ItemOptions, Level, NewLineItem, Size},
    products::Product,
};

/// Wrapper for cart lines in YAML
#[derive(Debug, Deserialize)]
pub struct CartFixture {
    /// Lines in the order they were added
    pub items: Vec<CartLineFixture>,
}

/// Cup size as written in fixtures
#[derive(Debug, Clone, Copy, Deserialize)]
pub enum SizeFixture {
    /// Small
    #[serde(rename = "S", alias = "small")]
    Small,

    /// Medium
    #[serde(rename = "M", alias = "medium")]
    Medium,

    /// Large
    #[serde(rename = "L", alias = "large")]
    Large,
}

impl From<SizeFixture> for Size {
    fn from(size: SizeFixture) -> Self {
        match size {
            SizeFixture::Small => Size::Small,
            SizeFixture::Medium => Size::Medium,
            SizeFixture::Large => Size::Large,
        }
    }
}

/// Cart line fixture from YAML
#[derive(Debug, Deserialize)]
pub struct CartLineFixture {
    /// Catalog id of the product
    pub product: String,

    /// Number of units
    #[serde(default = "default_quantity")]
    pub quantity: u32,

    /// Cup size, drinks only
    pub size: Option<SizeFixture>,

    /// Ice level in percent, drinks only
    pub ice: Option<u8>,

    /// Sugar level in percent, drinks only
    pub sugar: Option<u8>,

    /// Note for the barista
    pub note: Option<String>,
}

fn default_quantity() -> u32 {
    1
}

impl CartLineFixture {
    /// Build the line item request for `product`.
    ///
    /// Size, ice and sugar are ignored for products that are not drinks.
    ///
    /// # Errors
    ///
    /// Returns an error if an ice or sugar level is above 100.
    pub fn into_line_item<'a>(
        self,
        product: &Product<'a>,
    ) -> Result<NewLineItem<'a>, FixtureError> {
        let mut new = NewLineItem::from_product(product, self.quantity);

        if product.is_drink {
            let defaults = DrinkOptions::default();

            new = new.with_options(ItemOptions::Drink(DrinkOptions {
                size: self.size.map_or(defaults.size, Size::from),
                ice: self.ice.map(Level::new).transpose()?.unwrap_or(defaults.ice),
                sugar: self.sugar.map(Level::new).transpose()?.unwrap_or(defaults.sugar),
            }));
        }

        if let Some(note) = self.note {
            new = new.with_note(note);
        }

        Ok(new)
    }
}
