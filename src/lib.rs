//! Sipcart
//!
//! Sipcart is the cart pricing and voucher engine behind a drink storefront: line items with
//! drink options, vouchers with minimum orders and caps, shipping rules, receipts and checkout.

pub mod cart;
pub mod checkout;
pub mod config;
pub mod discounts;
pub mod fixtures;
pub mod items;
pub mod orders;
pub mod prelude;
pub mod prices;
pub mod pricing;
pub mod products;
pub mod receipt;
pub mod utils;
pub mod vouchers;
