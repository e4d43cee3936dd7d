//! Static public IP estimation

use std::str::FromStr;
use strum::{Display, EnumString};
use tracing::warn;

use super::{CostEstimator, settle};
use crate::catalog::CatalogTransport;
use crate::filter::ODataFilter;
use crate::scorer::MatchCriteria;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum PublicIpSku {
    Basic,
    Standard,
    Global,
}

impl PublicIpSku {
    /// SKU from the resource's SKU name and tier. A missing SKU is Basic; the Global tier wins.
    pub fn resolve(sku: Option<&str>, tier: Option<&str>) -> Option<Self> {
        if tier.is_some_and(|t| t.trim().eq_ignore_ascii_case("global")) {
            return Some(PublicIpSku::Global);
        }
        match sku.map(str::trim).filter(|s| !s.is_empty()) {
            None => Some(PublicIpSku::Basic),
            Some(sku) => PublicIpSku::from_str(sku).ok(),
        }
    }
}

impl<T: CatalogTransport> CostEstimator<T> {
    /// Monthly cost of a static IPv4 public IP address.
    pub async fn public_ip_cost(
        &self,
        sku: Option<&str>,
        tier: Option<&str>,
        location: &str,
    ) -> f64 {
        let description = format!(
            "Public IP sku={} tier={} location={}",
            sku.unwrap_or("-"),
            tier.unwrap_or("-"),
            location
        );

        let amount = match PublicIpSku::resolve(sku, tier) {
            Some(ip_sku) => self.estimate_public_ip(ip_sku, location).await,
            None => {
                warn!(sku = ?sku, "Unrecognized public IP SKU");
                None
            }
        };
        settle("public_ip", &description, amount)
    }

    async fn estimate_public_ip(&self, sku: PublicIpSku, location: &str) -> Option<f64> {
        let region = self.resolve_region(location)?;

        let filter = ODataFilter::for_service(&region.arm_name, "Virtual Network")
            .contains("productName", "IP Addresses")
            .contains("skuName", sku.to_string())
            .contains("meterName", "IPv4");

        let criteria = MatchCriteria::new(format!(
            "{} static public IP in {}",
            sku, region.display_name
        ))
            .unit_exact("1 Hour")
            .sku_pattern(&format!("^{}$", sku))
            .meter_pattern(&format!(r"{}.*IPv4\s+Static", sku))
            .product_pattern("IP Addresses")
            .exact_sku(sku.to_string())
            .prefer(["Static"])
            .avoid(["Dynamic", "IPv6", "Prefix"]);

        self.lookup(&filter, &criteria).await.map(|monthly| monthly.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    fn ip_catalog() -> Vec<crate::models::PriceRecord> {
        vec![
            record("IP Addresses", "Basic", "Basic IPv4 Static Public IP", "1 Hour", 0.0036),
            record("IP Addresses", "Basic", "Basic IPv4 Dynamic Public IP", "1 Hour", 0.004),
            record("IP Addresses", "Standard", "Standard IPv4 Static Public IP", "1 Hour", 0.005),
            record("IP Addresses", "Global", "Global IPv4 Static Public IP", "1 Hour", 0.01),
        ]
    }

    #[test]
    fn test_resolve_sku() {
        assert_eq!(PublicIpSku::resolve(None, None), Some(PublicIpSku::Basic));
        assert_eq!(
            PublicIpSku::resolve(Some("standard"), Some("Regional")),
            Some(PublicIpSku::Standard)
        );
        assert_eq!(
            PublicIpSku::resolve(Some("Standard"), Some("Global")),
            Some(PublicIpSku::Global)
        );
        assert_eq!(PublicIpSku::resolve(Some("Premium"), None), None);
    }

    #[tokio::test]
    async fn test_standard_static_ip() {
        let estimator = estimator(vec![("Virtual Network", ip_catalog())]);
        let cost = estimator.public_ip_cost(Some("Standard"), Some("Regional"), "westus3").await;
        assert!(approx(cost, 3.65));
    }

    #[tokio::test]
    async fn test_missing_sku_defaults_to_basic_static() {
        let estimator = estimator(vec![("Virtual Network", ip_catalog())]);
        let cost = estimator.public_ip_cost(None, None, "westus3").await;
        assert!(approx(cost, 0.0036 * 730.0));
    }

    #[tokio::test]
    async fn test_global_tier() {
        let estimator = estimator(vec![("Virtual Network", ip_catalog())]);
        let cost = estimator.public_ip_cost(Some("Standard"), Some("Global"), "westus3").await;
        assert!(approx(cost, 7.3));
    }

    #[tokio::test]
    async fn test_query_is_narrowed_to_sku() {
        let estimator = estimator(vec![(
            "contains(skuName, 'Global')",
            vec![record("IP Addresses", "Global", "Global IPv4 Static Public IP", "1 Hour", 0.01)],
        )]);

        let global = estimator.public_ip_cost(None, Some("Global"), "westus3").await;
        assert!(approx(global, 7.3));
        assert_eq!(estimator.public_ip_cost(Some("Basic"), None, "westus3").await, 0.0);
    }

    #[tokio::test]
    async fn test_unknown_sku_is_zero() {
        let estimator = estimator(vec![("Virtual Network", ip_catalog())]);
        assert_eq!(estimator.public_ip_cost(Some("Premium"), None, "westus3").await, 0.0);
    }

    #[tokio::test]
    async fn test_monthly_unit_is_not_selected() {
        let estimator = estimator(vec![(
            "Virtual Network",
            vec![record(
                "IP Addresses",
                "Standard",
                "Standard IPv4 Static Public IP",
                "1/Month",
                3.0,
            )],
        )]);
        assert_eq!(estimator.public_ip_cost(Some("Standard"), None, "westus3").await, 0.0);
    }
}
