//! Product Fixtures

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::{fixtures::FixtureError, prices::parse_money, products::Product};

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct ProductsFixture {
    /// Map of product id -> product fixture
    pub products: FxHashMap<String, ProductFixture>,
}

/// Product fixture from YAML
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product name
    pub name: String,

    /// Price (e.g., "45000 VND")
    pub price: String,

    /// Whether size, ice and sugar can be chosen
    #[serde(default)]
    pub drink: bool,
}

impl ProductFixture {
    /// Convert into a [`Product`] with the given catalog id
    ///
    /// # Errors
    ///
    /// Returns an error if the price cannot be parsed.
    pub fn into_product(self, id: String) -> Result<Product<'static>, FixtureError> {
        Ok(Product {
            id,
            name: self.name,
            price: parse_money(&self.price)?,
            is_drink: self.drink,
        })
    }
}
