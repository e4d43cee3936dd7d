//! Application Gateway estimation
//!
//! v1 gateways bill per instance-hour of a sized instance. v2 gateways bill a
//! fixed hourly charge plus capacity-unit hours.

use strum::Display;
use tracing::{debug, warn};

use super::{CostEstimator, settle};
use crate::catalog::CatalogTransport;
use crate::filter::ODataFilter;
use crate::region::Region;
use crate::scorer::MatchCriteria;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum AppGatewayFamily {
    Standard,
    #[strum(serialize = "WAF")]
    Waf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum GatewaySize {
    Small,
    Medium,
    Large,
}

impl GatewaySize {
    fn from_sku(sku: &str) -> Option<Self> {
        let sku = sku.to_lowercase();
        if sku.contains("small") {
            Some(GatewaySize::Small)
        } else if sku.contains("medium") {
            Some(GatewaySize::Medium)
        } else if sku.contains("large") {
            Some(GatewaySize::Large)
        } else {
            None
        }
    }
}

/// (family, is v2) from the SKU name and tier, e.g. "WAF_v2" ⇒ (WAF, true)
fn classify(sku_name: &str, tier: &str) -> (AppGatewayFamily, bool) {
    let combined = format!("{} {}", sku_name, tier).to_lowercase();
    let family = if combined.contains("waf") {
        AppGatewayFamily::Waf
    } else {
        AppGatewayFamily::Standard
    };
    (family, combined.contains("v2"))
}

impl<T: CatalogTransport> CostEstimator<T> {
    /// Monthly cost of an Application Gateway.
    ///
    /// `capacity` is the instance count for v1 and the capacity-unit count for v2;
    /// both are floored at one.
    pub async fn app_gateway_cost(
        &self,
        sku_name: &str,
        tier: &str,
        capacity: Option<u32>,
        location: &str,
    ) -> f64 {
        let description = format!(
            "Application Gateway sku={} tier={} capacity={:?} location={}",
            sku_name, tier, capacity, location
        );
        let amount = self.estimate_app_gateway(sku_name, tier, capacity, location).await;
        settle("app_gateway", &description, amount)
    }

    async fn estimate_app_gateway(
        &self,
        sku_name: &str,
        tier: &str,
        capacity: Option<u32>,
        location: &str,
    ) -> Option<f64> {
        if sku_name.trim().is_empty() && tier.trim().is_empty() {
            warn!("Application Gateway SKU and tier are missing");
            return None;
        }

        let region = self.resolve_region(location)?;
        let (family, is_v2) = classify(sku_name, tier);
        let units = f64::from(capacity.unwrap_or(1).max(1));

        if is_v2 {
            self.app_gateway_v2(&region, family, units).await
        } else {
            let Some(size) = GatewaySize::from_sku(sku_name) else {
                warn!(sku = sku_name, "Unrecognized Application Gateway v1 size");
                return None;
            };
            self.app_gateway_v1(&region, family, size, units).await
        }
    }

    async fn app_gateway_v1(
        &self,
        region: &Region,
        family: AppGatewayFamily,
        size: GatewaySize,
        instances: f64,
    ) -> Option<f64> {
        let product = format!("Application Gateway {}", family);
        let meter = format!("{} Gateway", size);
        let filter = ODataFilter::for_service(&region.arm_name, "Application Gateway")
            .eq("productName", &product);

        let criteria = MatchCriteria::new(format!(
            "{} {} gateway in {}",
            family, size, region.display_name
        ))
            .unit_containing("hour")
            .exact_meter(&meter)
            .meter_pattern(&format!(r"^{}\s+Gateway", size))
            .product_pattern(&format!("^{}$", product))
            .avoid(["Data Processed", "Capacity Unit", "Fixed"]);

        let monthly = self.lookup(&filter, &criteria).await?;
        debug!(per_instance = monthly.amount, instances, "v1 gateway instances");
        Some(monthly.amount * instances)
    }

    async fn app_gateway_v2(
        &self,
        region: &Region,
        family: AppGatewayFamily,
        units: f64,
    ) -> Option<f64> {
        let product = format!("Application Gateway {} v2", family);
        let filter = ODataFilter::for_service(&region.arm_name, "Application Gateway")
            .eq("productName", &product);

        let fixed = MatchCriteria::new(format!(
            "{} v2 gateway fixed cost in {}",
            family, region.display_name
        ))
            .unit_containing("hour")
            .meter_pattern("Fixed Cost")
            .product_pattern(&format!("^{}$", product))
            .prefer(["Fixed"])
            .avoid(["Capacity Unit", "Data Processed"]);

        let capacity_unit = MatchCriteria::new(format!(
            "{} v2 gateway capacity units in {}",
            family, region.display_name
        ))
        .unit_containing("hour")
        .meter_pattern("Capacity Unit")
        .product_pattern(&format!("^{}$", product))
        .prefer(["Capacity Units"])
        .avoid(["Fixed", "Data Processed"]);

        let fixed_monthly = self.lookup(&filter, &fixed).await?.amount;
        let unit_monthly = match self.lookup(&filter, &capacity_unit).await {
            Some(monthly) => monthly.amount,
            None => {
                warn!(product = %product, "No capacity unit price; reporting fixed cost only");
                0.0
            }
        };

        debug!(fixed = fixed_monthly, per_unit = unit_monthly, units, "v2 gateway components");
        Some(fixed_monthly + unit_monthly * units)
    }
}
