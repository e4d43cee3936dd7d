//! App Service plan estimation

use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

use super::{CostEstimator, settle};
use crate::catalog::CatalogTransport;
use crate::filter::ODataFilter;
use crate::region::Region;
use crate::scorer::MatchCriteria;

/// "P1v2" / "P1V3" / "I2v2" → base and version
static VERSIONED_SKU: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^([a-z]+\d+)\s*v(\d+)$").unwrap());

/// "PremiumV2" → "Premium v2"
static VERSIONED_TIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^([a-z]+?)\s*v(\d+)$").unwrap());

/// Catalog spelling of a plan SKU: "P1v2" → "P1 v2", "B1" → "B1"
pub(crate) fn catalog_plan_sku(sku: &str) -> String {
    let sku = sku.trim();
    match VERSIONED_SKU.captures(sku) {
        Some(caps) => format!("{} v{}", caps[1].to_uppercase(), &caps[2]),
        None => sku.to_uppercase(),
    }
}

/// Catalog spelling of a plan tier: "PremiumV2" → "Premium v2"
pub(crate) fn catalog_plan_tier(tier: &str) -> String {
    let tier = tier.trim();
    match VERSIONED_TIER.captures(tier) {
        Some(caps) => format!("{} v{}", &caps[1], &caps[2]),
        None => tier.to_string(),
    }
}

fn is_free_tier(tier: &str) -> bool {
    tier.trim().eq_ignore_ascii_case("free")
}

impl<T: CatalogTransport> CostEstimator<T> {
    /// Monthly cost of an App Service plan instance.
    pub async fn app_service_plan_cost(&self, tier: &str, sku_name: &str, location: &str) -> f64 {
        let description = format!(
            "App Service plan tier={} sku={} location={}",
            tier, sku_name, location
        );

        if is_free_tier(tier) {
            info!(tier = tier, sku = sku_name, "Free App Service plan tier");
            return settle("app_service_plan", &description, Some(0.0));
        }

        let amount = self.estimate_app_service_plan(tier, sku_name, location).await;
        settle("app_service_plan", &description, amount)
    }

    async fn estimate_app_service_plan(
        &self,
        tier: &str,
        sku_name: &str,
        location: &str,
    ) -> Option<f64> {
        if tier.trim().is_empty() || sku_name.trim().is_empty() {
            warn!(tier = tier, sku = sku_name, "App Service plan tier or SKU is missing");
            return None;
        }

        let region = self.resolve_region(location)?;
        let catalog_sku = catalog_plan_sku(sku_name);
        let catalog_tier = catalog_plan_tier(tier);
        let criteria = plan_criteria(&catalog_tier, &catalog_sku, &region);

        let narrow = ODataFilter::for_service(&region.arm_name, "Azure App Service")
            .contains("productName", format!("{} Plan", catalog_tier))
            .eq("skuName", &catalog_sku);

        if let Some(monthly) = self.lookup(&narrow, &criteria).await {
            return Some(monthly.amount);
        }

        debug!(
            tier = %catalog_tier,
            sku = %catalog_sku,
            "No plan match, broadening product filter"
        );
        let broad = ODataFilter::for_service(&region.arm_name, "Azure App Service")
            .contains("productName", "Plan")
            .contains("skuName", &catalog_sku);

        self.lookup(&broad, &criteria).await.map(|monthly| monthly.amount)
    }
}

fn plan_criteria(tier: &str, sku: &str, region: &Region) -> MatchCriteria {
    let escaped_sku = regex::escape(sku);
    let mut avoid = vec!["Stamp", "Functions", "Reserved"];
    if !tier.to_lowercase().contains("isolated") {
        avoid.push("Isolated");
    }

    MatchCriteria::new(format!("{} {} App Service plan in {}", tier, sku, region.display_name))
        .unit_exact("1 Hour")
        .exact_sku(sku)
        .meter_pattern(&format!(r"^{}(\s|$)", escaped_sku))
        .product_pattern(&format!(r"{}\s+Plan", regex::escape(tier)))
        .sku_pattern(&format!("^{}$", escaped_sku))
        .prefer([sku])
        .avoid(avoid)
}
