//! Sipcart prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError, QuantityChange},
    checkout::{
        CheckoutError, CheckoutRequest, DeliveryDetails, OrderDraft, PaymentMethod, checkout,
    },
    config::{ConfigError, StoreConfig},
    discounts::{DiscountError, VoucherDiscount},
    fixtures::{Fixture, FixtureError},
    items::{
        DrinkOptions, ItemOptions, Level, LineItem, LineItemError, LineItemId, NewLineItem, Size,
    },
    orders::{Order, OrderError, OrderStatus},
    prices::{PriceParseError, parse_money, parse_percentage},
    pricing::{PricingError, ShippingPolicy, Totals},
    products::{Catalog, Product, ProductKey},
    receipt::{Receipt, ReceiptError, ReceiptNotice},
    vouchers::{Voucher, VoucherError, VoucherStatus, best_voucher, eligible_vouchers},
};
