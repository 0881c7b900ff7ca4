//! Fixtures
//!
//! YAML menus, voucher lists and carts used by the tests and the demo. A
//! fixture set named `coffee` is made of `products/coffee.yml`,
//! `vouchers/coffee.yml` and `carts/coffee.yml` under the base path.

use std::{fs, path::PathBuf};

use rusty_money::iso::Currency;
use thiserror::Error;
use tracing::debug;

use crate::{
    cart::{Cart, CartError},
    config::StoreConfig,
    fixtures::{carts::CartFixture, products::ProductsFixture, vouchers::VouchersFixture},
    items::{LineItemError, NewLineItem},
    prices::PriceParseError,
    products::{Catalog, Product},
    vouchers::{Voucher, VoucherError},
};

pub mod carts;
pub mod products;
pub mod vouchers;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price or percentage
    #[error(transparent)]
    Price(#[from] PriceParseError),

    /// Currency mismatch between fixture entries
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Voucher not found
    #[error("Voucher not found: {0}")]
    VoucherNotFound(String),

    /// Voucher could not be built
    #[error(transparent)]
    Voucher(#[from] VoucherError),

    /// Cart line could not be built
    #[error(transparent)]
    LineItem(#[from] LineItemError),

    /// Cart could not be filled
    #[error(transparent)]
    Cart(#[from] CartError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture<'a> {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Menu loaded from the products file
    catalog: Catalog<'a>,

    /// Vouchers in file order
    vouchers: Vec<Voucher<'a>>,

    /// Cart lines waiting to be added to a cart
    cart_lines: Vec<NewLineItem<'a>>,

    /// Currency for the fixture set
    currency: Option<&'static Currency>,
}

impl Default for Fixture<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Fixture<'a> {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            catalog: Catalog::new(),
            vouchers: Vec::new(),
            cart_lines: Vec::new(),
            currency: None,
        }
    }

    /// Load products from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if there are currency mismatches.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let contents = self.read("products", name)?;
        let fixture: ProductsFixture = serde_norway::from_str(&contents)?;

        for (id, product_fixture) in fixture.products {
            let product = product_fixture.into_product(id)?;

            self.check_currency(product.price.currency())?;
            self.catalog.insert(product);
        }

        debug!(fixture = name, products = self.catalog.len(), "loaded products");

        Ok(self)
    }

    /// Load vouchers from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or a voucher is invalid.
    pub fn load_vouchers(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let contents = self.read("vouchers", name)?;
        let fixture: VouchersFixture = serde_norway::from_str(&contents)?;

        for voucher_fixture in fixture.vouchers {
            let voucher = voucher_fixture.try_into_voucher()?;

            if let Some(currency) = voucher.currency() {
                self.check_currency(currency)?;
            }

            self.vouchers.push(voucher);
        }

        debug!(fixture = name, vouchers = self.vouchers.len(), "loaded vouchers");

        Ok(self)
    }

    /// Load cart lines from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if referenced products don't exist.
    pub fn load_cart(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let contents = self.read("carts", name)?;
        let fixture: CartFixture = serde_norway::from_str(&contents)?;

        for line in fixture.items {
            let product = self
                .catalog
                .find(&line.product)
                .ok_or_else(|| FixtureError::ProductNotFound(line.product.clone()))?;

            let new = line.into_line_item(product)?;

            self.cart_lines.push(new);
        }

        Ok(self)
    }

    /// Load a complete fixture set (products, vouchers and cart with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture
            .load_products(name)?
            .load_vouchers(name)?
            .load_cart(name)?;

        Ok(fixture)
    }

    /// Get a product by its catalog identifier
    ///
    /// # Errors
    ///
    /// Returns `FixtureError::ProductNotFound` if the product is not in the catalog.
    pub fn product(&self, id: &str) -> Result<&Product<'a>, FixtureError> {
        self.catalog
            .find(id)
            .ok_or_else(|| FixtureError::ProductNotFound(id.to_string()))
    }

    /// Get a voucher by its code
    ///
    /// # Errors
    ///
    /// Returns `FixtureError::VoucherNotFound` if no voucher has this code.
    pub fn voucher(&self, code: &str) -> Result<&Voucher<'a>, FixtureError> {
        self.vouchers
            .iter()
            .find(|voucher| voucher.code() == code)
            .ok_or_else(|| FixtureError::VoucherNotFound(code.to_string()))
    }

    /// The loaded menu
    pub fn catalog(&self) -> &Catalog<'a> {
        &self.catalog
    }

    /// The loaded vouchers, in file order
    pub fn vouchers(&self) -> &[Voucher<'a>] {
        &self.vouchers
    }

    /// Currency of the fixture set, once anything priced has been loaded
    pub fn currency(&self) -> Option<&'static Currency> {
        self.currency
    }

    /// Build a cart for `config` holding the loaded cart lines.
    ///
    /// # Errors
    ///
    /// Returns `FixtureError::Cart` if a line cannot be added, for example
    /// because the store currency differs from the fixture currency.
    pub fn cart(&self, config: &StoreConfig<'a>) -> Result<Cart<'a>, FixtureError> {
        let mut cart = Cart::for_store(config);

        for line in &self.cart_lines {
            cart.add_item(line.clone())?;
        }

        Ok(cart)
    }

    fn read(&self, kind: &str, name: &str) -> Result<String, FixtureError> {
        let file_path = self.base_path.join(kind).join(format!("{name}.yml"));

        Ok(fs::read_to_string(&file_path)?)
    }

    fn check_currency(&mut self, currency: &'static Currency) -> Result<(), FixtureError> {
        match self.currency {
            Some(existing) if existing != currency => Err(FixtureError::CurrencyMismatch(
                existing.iso_alpha_code.to_string(),
                currency.iso_alpha_code.to_string(),
            )),
            Some(_) => Ok(()),
            None => {
                self.currency = Some(currency);
                Ok(())
            }
        }
    }
}
