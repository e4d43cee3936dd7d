//! Configuration for the cost estimator

use core_config::{Environment, FromEnv, env_or_default};
use domain_pricing::{CatalogConfig, ScoringWeights};
use eyre::Result;

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub catalog: CatalogConfig,
    pub scoring: ScoringWeights,
    /// Region used when a command or batch entry does not name one
    pub default_location: String,
}

fn default_location() -> String {
    "eastus".to_string()
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            environment: Environment::from_env(),
            catalog: <CatalogConfig as FromEnv>::from_env()?,
            scoring: <ScoringWeights as FromEnv>::from_env()?,
            default_location: env_or_default("PRICING_DEFAULT_LOCATION", &default_location()),
        })
    }

    /// Apply command-line overrides
    pub fn with_currency(mut self, currency: Option<&str>) -> Self {
        if let Some(currency) = currency.map(str::trim).filter(|c| !c.is_empty()) {
            self.catalog = self.catalog.with_currency(currency);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env_defaults() {
        temp_env::with_vars(
            [
                ("PRICING_DEFAULT_LOCATION", None::<&str>),
                ("PRICING_CURRENCY", None),
                ("PRICING_TIMEOUT_SECS", None),
                ("APP_ENV", None),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.default_location, "eastus");
                assert_eq!(config.catalog.currency_code, "USD");
                assert!(config.environment.is_development());
                assert_eq!(config.scoring, ScoringWeights::default());
            },
        );
    }

    #[test]
    fn test_currency_override() {
        temp_env::with_var("PRICING_CURRENCY", Some("GBP"), || {
            let config = Config::from_env().unwrap().with_currency(Some("eur"));
            assert_eq!(config.catalog.currency_code, "EUR");

            let untouched = Config::from_env().unwrap().with_currency(Some("  "));
            assert_eq!(untouched.catalog.currency_code, "GBP");
        });
    }

    #[test]
    fn test_scoring_weights_override() {
        temp_env::with_var("PRICING_SCORE_EXACT_METER", Some("75"), || {
            let config = Config::from_env().unwrap();
            assert_eq!(config.scoring.exact_meter, 75);
        });
    }

    #[test]
    fn test_invalid_catalog_env_is_an_error() {
        temp_env::with_var("PRICING_MAX_PAGES", Some("many"), || {
            assert!(Config::from_env().is_err());
        });
    }
}
