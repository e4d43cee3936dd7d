//! Catalog client configuration

use core_config::{ConfigError, FromEnv, env_or_default, env_parse_or};
use std::time::Duration;

use crate::scorer::ScoringWeights;

/// Azure Retail Prices API endpoint
pub const RETAIL_PRICES_API: &str = "https://prices.azure.com/api/retail/prices";

/// API version sent with every query
pub const DEFAULT_API_VERSION: &str = "2023-01-01-preview";

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogConfig {
    pub endpoint: String,
    pub api_version: String,
    /// ISO currency code; USD is the catalog default and is not sent explicitly
    pub currency_code: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Upper bound on `NextPageLink` hops for one filter
    pub max_pages: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            endpoint: RETAIL_PRICES_API.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            currency_code: "USD".to_string(),
            timeout: Duration::from_secs(30),
            max_pages: 100,
        }
    }
}

impl CatalogConfig {
    pub fn with_currency(mut self, currency_code: impl Into<String>) -> Self {
        self.currency_code = currency_code.into().to_uppercase();
        self
    }

    /// Currency to request explicitly, if it differs from the catalog default
    pub fn requested_currency(&self) -> Option<&str> {
        if self.currency_code.is_empty() || self.currency_code.eq_ignore_ascii_case("USD") {
            None
        } else {
            Some(&self.currency_code)
        }
    }
}

impl FromEnv for CatalogConfig {
    /// Reads from environment variables with defaults:
    /// - PRICING_API_ENDPOINT: defaults to the public retail prices API
    /// - PRICING_API_VERSION: defaults to 2023-01-01-preview
    /// - PRICING_CURRENCY: defaults to USD
    /// - PRICING_TIMEOUT_SECS: defaults to 30
    /// - PRICING_MAX_PAGES: defaults to 100
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let timeout_secs: u64 =
            env_parse_or("PRICING_TIMEOUT_SECS", defaults.timeout.as_secs())?;
        let max_pages: usize = env_parse_or("PRICING_MAX_PAGES", defaults.max_pages)?;

        Ok(Self {
            endpoint: env_or_default("PRICING_API_ENDPOINT", &defaults.endpoint),
            api_version: env_or_default("PRICING_API_VERSION", &defaults.api_version),
            currency_code: env_or_default("PRICING_CURRENCY", &defaults.currency_code)
                .to_uppercase(),
            timeout: Duration::from_secs(timeout_secs),
            max_pages,
        })
    }
}

impl FromEnv for ScoringWeights {
    /// Reads PRICING_SCORE_{BASE,EXACT_SKU,EXACT_METER,PATTERN,PREFER,AVOID},
    /// each defaulting to the built-in weight.
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            base: env_parse_or("PRICING_SCORE_BASE", defaults.base)?,
            exact_sku: env_parse_or("PRICING_SCORE_EXACT_SKU", defaults.exact_sku)?,
            exact_meter: env_parse_or("PRICING_SCORE_EXACT_METER", defaults.exact_meter)?,
            pattern: env_parse_or("PRICING_SCORE_PATTERN", defaults.pattern)?,
            prefer: env_parse_or("PRICING_SCORE_PREFER", defaults.prefer)?,
            avoid: env_parse_or("PRICING_SCORE_AVOID", defaults.avoid)?,
        })
    }
}
