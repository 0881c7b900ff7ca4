//! Utils

use clap::Parser;

/// Arguments for the cart demo
#[derive(Debug, Parser)]
pub struct ExampleCartArgs {
    /// Fixture set to use for the menu, vouchers & cart
    #[clap(short, long, default_value = "coffee")]
    pub fixture: String,

    /// Code of the voucher to apply
    #[clap(short, long, conflicts_with = "best")]
    pub voucher: Option<String>,

    /// Apply whichever voucher saves the most
    #[clap(short, long)]
    pub best: bool,

    /// Store configuration file, defaults apply when omitted
    #[clap(short, long)]
    pub config: Option<String>,
}
