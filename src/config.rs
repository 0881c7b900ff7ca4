//! Store configuration
//!
//! Store-wide pricing settings, read from YAML:
//!
//! ```yaml
//! shipping:
//!   flat_fee: "20000 VND"
//!   free_shipping_threshold: "200000 VND"
//! ```

use std::{fs, path::Path};

use rusty_money::{Money, iso::Currency, iso::VND};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    prices::{PriceParseError, parse_money},
    pricing::{PricingError, ShippingPolicy},
};

/// Flat shipping fee charged by default, in đồng.
pub const DEFAULT_SHIPPING_FEE: i64 = 20_000;

/// Subtotal at which shipping becomes free by default, in đồng.
pub const DEFAULT_FREE_SHIPPING_THRESHOLD: i64 = 200_000;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading the configuration file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// A price could not be parsed
    #[error(transparent)]
    Price(#[from] PriceParseError),

    /// The shipping settings are inconsistent
    #[error("Invalid shipping settings: {0}")]
    Shipping(#[from] PricingError),
}

#[derive(Debug, Deserialize)]
struct StoreConfigFile {
    shipping: Option<ShippingFile>,
}

#[derive(Debug, Deserialize)]
struct ShippingFile {
    flat_fee: String,
    free_shipping_threshold: Option<String>,
}

/// Store-wide pricing settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoreConfig<'a> {
    /// Shipping fee rules
    pub shipping: ShippingPolicy<'a>,
}

impl StoreConfig<'static> {
    /// Parse a configuration from YAML. Missing sections fall back to the defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for malformed YAML, unparseable prices or a
    /// threshold in another currency than the fee.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let file: StoreConfigFile = serde_norway::from_str(yaml)?;

        let Some(shipping) = file.shipping else {
            return Ok(Self::default());
        };

        let flat_fee = parse_money(&shipping.flat_fee)?;
        let threshold = shipping
            .free_shipping_threshold
            .as_deref()
            .map(parse_money)
            .transpose()?;

        Ok(Self {
            shipping: ShippingPolicy::new(flat_fee, threshold)?,
        })
    }

    /// Read a configuration file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml_str(&contents)
    }
}

impl<'a> StoreConfig<'a> {
    /// The store currency.
    pub fn currency(&self) -> &'a Currency {
        self.shipping.currency()
    }
}

impl Default for StoreConfig<'static> {
    fn default() -> Self {
        Self {
            shipping: default_shipping(),
        }
    }
}

fn default_shipping() -> ShippingPolicy<'static> {
    let flat_fee = Money::from_minor(DEFAULT_SHIPPING_FEE, VND);
    let threshold = Money::from_minor(DEFAULT_FREE_SHIPPING_THRESHOLD, VND);

    match ShippingPolicy::new(flat_fee, Some(threshold)) {
        Ok(policy) => policy,
        Err(_) => unreachable!("default fee and threshold share a currency"),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use rusty_money::iso::USD;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn default_is_vnd_with_free_shipping_threshold() {
        let config = StoreConfig::default();

        assert_eq!(config.currency(), VND);
        assert_eq!(config.shipping.flat_fee(), Money::from_minor(20_000, VND));
        assert_eq!(
            config.shipping.free_shipping_threshold(),
            Some(Money::from_minor(200_000, VND))
        );
    }

    #[test]
    fn from_yaml_reads_shipping() -> TestResult {
        let config = StoreConfig::from_yaml_str(
            "shipping:\n  flat_fee: \"3.50 USD\"\n  free_shipping_threshold: \"25 USD\"\n",
        )?;

        assert_eq!(config.currency(), USD);
        assert_eq!(config.shipping.flat_fee(), Money::from_minor(350, USD));
        assert_eq!(
            config.shipping.free_shipping_threshold(),
            Some(Money::from_minor(2_500, USD))
        );

        Ok(())
    }

    #[test]
    fn from_yaml_without_threshold() -> TestResult {
        let config = StoreConfig::from_yaml_str("shipping:\n  flat_fee: \"15000 VND\"\n")?;

        assert_eq!(config.shipping.free_shipping_threshold(), None);

        Ok(())
    }

    #[test]
    fn empty_document_uses_defaults() -> TestResult {
        let config = StoreConfig::from_yaml_str("{}")?;

        assert_eq!(config, StoreConfig::default());

        Ok(())
    }

    #[test]
    fn mixed_currencies_are_rejected() {
        let result = StoreConfig::from_yaml_str(
            "shipping:\n  flat_fee: \"15000 VND\"\n  free_shipping_threshold: \"25 USD\"\n",
        );

        assert!(matches!(result, Err(ConfigError::Shipping(_))));
    }

    #[test]
    fn bad_price_is_rejected() {
        let result = StoreConfig::from_yaml_str("shipping:\n  flat_fee: \"free\"\n");

        assert!(matches!(result, Err(ConfigError::Price(_))));
    }

    #[test]
    fn from_path_reads_file() -> TestResult {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "shipping:\n  flat_fee: \"25000 VND\"")?;

        let config = StoreConfig::from_path(file.path())?;

        assert_eq!(config.shipping.flat_fee(), Money::from_minor(25_000, VND));

        Ok(())
    }
}
