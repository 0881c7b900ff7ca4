//! Voucher Fixtures

use serde::Deserialize;

use crate::{
    discounts::VoucherDiscount,
    fixtures::FixtureError,
    prices::{parse_money, parse_percentage},
    vouchers::Voucher,
};

/// Wrapper for vouchers in YAML
#[derive(Debug, Deserialize)]
pub struct VouchersFixture {
    /// Vouchers in the order they are offered
    pub vouchers: Vec<VoucherFixture>,
}

/// Voucher fixture from YAML
#[derive(Debug, Deserialize)]
pub struct VoucherFixture {
    /// Backend identifier, defaults to the code
    pub id: Option<String>,

    /// Code the customer enters
    pub code: String,

    /// What the voucher takes off
    pub discount: VoucherDiscountFixture,

    /// Minimum subtotal (e.g., "100000 VND")
    pub min_order: Option<String>,

    /// Cap for percentage discounts (e.g., "5000 VND")
    pub max_discount: Option<String>,
}

/// Voucher discount configuration from YAML fixtures
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VoucherDiscountFixture {
    /// Percentage off the subtotal (e.g., "10%" or "0.10")
    Percentage {
        /// Percentage string
        value: String,
    },

    /// Fixed amount off the subtotal (e.g., "15000 VND")
    AmountOff {
        /// Amount string
        value: String,
    },

    /// Shipping fee waived
    FreeShipping,
}

impl TryFrom<VoucherDiscountFixture> for VoucherDiscount<'_> {
    type Error = FixtureError;

    fn try_from(config: VoucherDiscountFixture) -> Result<Self, Self::Error> {
        match config {
            VoucherDiscountFixture::Percentage { value } => {
                Ok(VoucherDiscount::PercentageOff(parse_percentage(&value)?))
            }
            VoucherDiscountFixture::AmountOff { value } => {
                Ok(VoucherDiscount::AmountOff(parse_money(&value)?))
            }
            VoucherDiscountFixture::FreeShipping => Ok(VoucherDiscount::FreeShipping),
        }
    }
}

impl VoucherFixture {
    /// Convert to a [`Voucher`]
    ///
    /// # Errors
    ///
    /// Returns an error if an amount cannot be parsed or the voucher is invalid.
    pub fn try_into_voucher(self) -> Result<Voucher<'static>, FixtureError> {
        let id = self.id.unwrap_or_else(|| self.code.clone());
        let mut voucher = Voucher::new(id, self.code, VoucherDiscount::try_from(self.discount)?)?;

        if let Some(min_order) = self.min_order {
            voucher = voucher.with_min_order(parse_money(&min_order)?)?;
        }

        if let Some(max_discount) = self.max_discount {
            voucher = voucher.with_max_discount(parse_money(&max_discount)?)?;
        }

        Ok(voucher)
    }
}
