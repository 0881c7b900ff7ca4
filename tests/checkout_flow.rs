//! Integration test for the path from a priced cart to a delivered order.

use rusty_money::{Money, iso::VND};
use testresult::TestResult;

use sipcart::{
    cart::Cart,
    checkout::{CheckoutError, CheckoutRequest, DeliveryDetails, PaymentMethod, checkout},
    config::StoreConfig,
    fixtures::Fixture,
    orders::{Order, OrderError, OrderStatus},
};

fn request() -> CheckoutRequest {
    CheckoutRequest {
        delivery: DeliveryDetails {
            recipient: "Lê Minh Châu".to_string(),
            phone: "028.3822.1234".to_string(),
            address: "78 Pasteur, Quận 3".to_string(),
        },
        payment: PaymentMethod::BankTransfer,
        note: None,
    }
}

#[test]
fn checkout_submit_and_deliver() -> TestResult {
    let fixture = Fixture::from_set("coffee")?;
    let mut cart = fixture.cart(&StoreConfig::default())?;

    cart.select_voucher(fixture.voucher("GIAM10")?.clone())?;

    let draft = checkout(&cart, request())?;

    assert_eq!(draft.total, Money::from_minor(105_000, VND));
    assert_eq!(draft.voucher_code.as_deref(), Some("GIAM10"));

    cart.clear();

    assert!(cart.is_empty());
    assert!(cart.voucher().is_none());
    assert_eq!(cart.subtotal()?, Money::from_minor(0, VND));

    let mut order = Order::new("DH-0001", draft);

    order.confirm()?;
    order.start_delivery()?;
    order.deliver()?;

    assert_eq!(order.status(), OrderStatus::Delivered);
    assert_eq!(order.draft().items.len(), 1);
    assert!(matches!(
        order.cancel("too late"),
        Err(OrderError::InvalidTransition { .. })
    ));

    Ok(())
}

#[test]
fn blocked_cart_cannot_check_out() -> TestResult {
    let fixture = Fixture::from_set("coffee")?;
    let mut cart = fixture.cart(&StoreConfig::default())?;

    cart.select_voucher(fixture.voucher("FREESHIP100")?.clone())?;

    assert!(matches!(
        checkout(&cart, request()),
        Err(CheckoutError::VoucherBelowMinimum { shortfall: 10_000, .. })
    ));

    let empty = Cart::for_store(&StoreConfig::default());

    assert_eq!(checkout(&empty, request()), Err(CheckoutError::EmptyCart));

    Ok(())
}

#[test]
fn store_config_file_changes_shipping() -> TestResult {
    let config = StoreConfig::from_path("fixtures/store.yml")?;
    let fixture = Fixture::from_set("coffee")?;
    let cart = fixture.cart(&config)?;

    assert_eq!(config, StoreConfig::default());
    assert_eq!(cart.shipping_fee()?, Money::from_minor(20_000, VND));

    let cheaper = StoreConfig::from_yaml_str("shipping:\n  flat_fee: \"12000 VND\"\n")?;
    let cart = fixture.cart(&cheaper)?;

    assert_eq!(cart.total_price()?, Money::from_minor(102_000, VND));

    Ok(())
}
