//! Products

use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// Product Key
    pub struct ProductKey;
}

/// A menu entry that can be added to a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct Product<'a> {
    /// Catalog identifier
    pub id: String,

    /// Product name
    pub name: String,

    /// Product price
    pub price: Money<'a, Currency>,

    /// Whether ice and sugar levels apply to this product
    pub is_drink: bool,
}

/// The store menu, keyed by catalog identifier.
#[derive(Debug, Default)]
pub struct Catalog<'a> {
    products: SlotMap<ProductKey, Product<'a>>,
    ids: FxHashMap<String, ProductKey>,
}

impl<'a> Catalog<'a> {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self {
            products: SlotMap::with_key(),
            ids: FxHashMap::default(),
        }
    }

    /// Insert a product, replacing any product with the same identifier.
    pub fn insert(&mut self, product: Product<'a>) -> ProductKey {
        if let Some(existing) = self.ids.get(&product.id).copied()
            && let Some(slot) = self.products.get_mut(existing)
        {
            *slot = product;
            return existing;
        }

        let id = product.id.clone();
        let key = self.products.insert(product);

        self.ids.insert(id, key);

        key
    }

    /// Get a product by key.
    pub fn get(&self, key: ProductKey) -> Option<&Product<'a>> {
        self.products.get(key)
    }

    /// Get a product by catalog identifier.
    pub fn find(&self, id: &str) -> Option<&Product<'a>> {
        self.ids.get(id).and_then(|key| self.products.get(*key))
    }

    /// Iterate over all products.
    pub fn iter(&self) -> impl Iterator<Item = (ProductKey, &Product<'a>)> {
        self.products.iter()
    }

    /// Number of products in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
