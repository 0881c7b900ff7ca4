//! Cart Example
//!
//! This example prices a fixture cart, optionally with a voucher, and prints the receipt.
//!
//! Use `-f` to load a fixture set by name
//! Use `-v` to apply a voucher by code, or `-b` to apply the one that saves the most
//! Use `-c` to load store settings from a YAML file
//!
//! Set `RUST_LOG=sipcart=debug` to see cart events.

use std::io;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sipcart::{
    config::StoreConfig,
    fixtures::Fixture,
    utils::ExampleCartArgs,
    vouchers::{best_voucher, eligible_vouchers},
};

/// Cart Example
#[expect(clippy::print_stdout, reason = "Example code")]
pub fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = ExampleCartArgs::parse();

    let config = match args.config.as_deref() {
        Some(path) => StoreConfig::from_path(path)?,
        None => StoreConfig::default(),
    };

    let fixture = Fixture::from_set(&args.fixture)?;
    let mut cart = fixture.cart(&config)?;

    let voucher = if args.best {
        best_voucher(fixture.vouchers(), cart.items(), cart.shipping_policy())?
    } else {
        args.voucher
            .as_deref()
            .map(|code| fixture.voucher(code))
            .transpose()?
    };

    if let Some(voucher) = voucher {
        cart.select_voucher(voucher.clone())?;
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    cart.receipt()?.write_to(&mut handle)?;

    let subtotal = cart.subtotal()?;
    let codes: Vec<&str> = eligible_vouchers(fixture.vouchers(), &subtotal)
        .map(|voucher| voucher.code())
        .collect();

    if codes.is_empty() {
        println!("\nNo vouchers apply to this cart");
    } else {
        println!("\nVouchers that apply: {}", codes.join(", "));
    }

    Ok(())
}
