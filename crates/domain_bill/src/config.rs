//! Bill configuration
//!
//! Read from `SPLITBILL_`-prefixed environment variables, e.g.
//! `SPLITBILL_CURRENCY=EUR` or `SPLITBILL_SETTLEMENT_ROUNDING=round_up`.

use serde::Deserialize;
use std::collections::HashMap;

use core_kernel::Currency;

use crate::bill::DEFAULT_PRODUCT_LIMIT;
use crate::settlement::SettlementRounding;

const ENV_PREFIX: &str = "SPLITBILL";

/// Settings applied to new bills and settlements
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BillConfig {
    /// Currency for new bills
    pub currency: Currency,
    /// Maximum number of products per bill
    pub max_products: usize,
    /// Rounding applied to settlement transfers
    pub settlement_rounding: SettlementRounding,
}

impl Default for BillConfig {
    fn default() -> Self {
        Self {
            currency: Currency::RON,
            max_products: DEFAULT_PRODUCT_LIMIT,
            settlement_rounding: SettlementRounding::Exact,
        }
    }
}

impl BillConfig {
    /// Loads configuration from the environment, after an optional `.env` file
    pub fn from_env() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        Self::load(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
    }

    /// Loads configuration from an explicit set of variables instead of the
    /// process environment
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, config::ConfigError> {
        Self::load(
            config::Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .source(Some(vars.into_iter().collect())),
        )
    }

    fn load(environment: config::Environment) -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        let loaded: Self = config::Config::builder()
            .set_default("currency", defaults.currency.code())?
            .set_default("max_products", defaults.max_products as u64)?
            .set_default("settlement_rounding", "exact")?
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        if loaded.max_products == 0 {
            return Err(config::ConfigError::Message(
                "max_products must be at least 1".to_string(),
            ));
        }
        Ok(loaded)
    }
}
