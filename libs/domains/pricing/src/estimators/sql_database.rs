//! Azure SQL Database estimation (DTU and vCore purchasing models)

use strum::Display;
use tracing::{debug, warn};

use super::{CostEstimator, settle};
use crate::catalog::CatalogTransport;
use crate::filter::{Clause, ODataFilter};
use crate::models::PriceRecord;
use crate::scorer::MatchCriteria;

const SQL_AVOID: [&str; 5] = ["Serverless", "Data Stored", "Backup", "Failover", "Zone Redundancy"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DtuTier {
    Basic,
    Standard,
    Premium,
}

impl DtuTier {
    pub fn parse(tier: &str) -> Option<Self> {
        match tier.trim().to_lowercase().as_str() {
            "basic" => Some(DtuTier::Basic),
            "standard" => Some(DtuTier::Standard),
            "premium" => Some(DtuTier::Premium),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum VcoreTier {
    #[strum(serialize = "General Purpose")]
    GeneralPurpose,
    #[strum(serialize = "Business Critical")]
    BusinessCritical,
    #[strum(serialize = "Hyperscale")]
    Hyperscale,
}

impl VcoreTier {
    /// From a tier name ("GeneralPurpose", "Business Critical") or a SKU prefix ("GP_Gen5_4")
    pub fn parse(tier: Option<&str>, sku_name: Option<&str>) -> Option<Self> {
        let from_tier = tier.and_then(|t| {
            let compact: String = t
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
                .to_lowercase();
            match compact.as_str() {
                "generalpurpose" => Some(VcoreTier::GeneralPurpose),
                "businesscritical" => Some(VcoreTier::BusinessCritical),
                "hyperscale" => Some(VcoreTier::Hyperscale),
                _ => None,
            }
        });

        from_tier.or_else(|| {
            let prefix = sku_name?.split('_').next()?.to_uppercase();
            match prefix.as_str() {
                "GP" => Some(VcoreTier::GeneralPurpose),
                "BC" => Some(VcoreTier::BusinessCritical),
                "HS" => Some(VcoreTier::Hyperscale),
                _ => None,
            }
        })
    }
}

/// Purchasing model of a database
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlPricingModel {
    Dtu(DtuTier),
    Vcore(VcoreTier),
}

impl SqlPricingModel {
    pub fn detect(
        tier: Option<&str>,
        sku_name: Option<&str>,
        family: Option<&str>,
    ) -> Option<Self> {
        let mentions_vcore = [tier, family]
            .into_iter()
            .flatten()
            .any(|s| s.to_lowercase().contains("vcore"));

        if let Some(vcore) = VcoreTier::parse(tier, sku_name) {
            return Some(SqlPricingModel::Vcore(vcore));
        }
        if mentions_vcore {
            return Some(SqlPricingModel::Vcore(VcoreTier::GeneralPurpose));
        }

        tier.and_then(DtuTier::parse)
            .or_else(|| sku_name.and_then(DtuTier::parse))
            .or_else(|| {
                // S0..S12 / P1..P15 DTU service objectives
                let sku = sku_name?.trim().to_uppercase();
                let mut chars = sku.chars();
                let letter = chars.next()?;
                let digits = chars.as_str();
                if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                    return None;
                }
                match letter {
                    'S' => Some(DtuTier::Standard),
                    'P' => Some(DtuTier::Premium),
                    _ => None,
                }
            })
            .map(SqlPricingModel::Dtu)
    }
}

/// A per-DTU rate is multiplied by capacity; a DTU pack price is not.
pub fn is_per_dtu(record: &PriceRecord) -> bool {
    let meter = record.meter_name.trim().to_lowercase();
    record.unit_of_measure.to_lowercase().contains("dtu")
        || matches!(meter.as_str(), "dtu" | "1 dtu" | "dtus")
}

/// Hardware generation from "GP_Gen5_8" style SKUs
fn family_from_sku(sku_name: Option<&str>) -> Option<String> {
    sku_name?
        .split('_')
        .find(|part| part.to_lowercase().starts_with("gen") || part.eq_ignore_ascii_case("fsv2"))
        .map(str::to_string)
}

impl<T: CatalogTransport> CostEstimator<T> {
    /// Monthly cost of a single database, dispatching on its purchasing model.
    pub async fn sql_database_cost(
        &self,
        tier: Option<&str>,
        sku_name: Option<&str>,
        family: Option<&str>,
        capacity: Option<u32>,
        location: &str,
    ) -> f64 {
        match SqlPricingModel::detect(tier, sku_name, family) {
            Some(SqlPricingModel::Vcore(_)) => {
                self.sql_database_vcore_cost(tier, family, sku_name, capacity, location)
                    .await
            }
            Some(SqlPricingModel::Dtu(_)) => {
                self.sql_database_dtu_cost(tier, sku_name, capacity, location)
                    .await
            }
            None => {
                warn!(
                    tier = ?tier,
                    sku = ?sku_name,
                    family = ?family,
                    "Could not determine SQL pricing model"
                );
                let description = format!("SQL database tier={:?} sku={:?}", tier, sku_name);
                settle("sql_database", &description, None)
            }
        }
    }

    /// Monthly cost of a DTU-model database.
    pub async fn sql_database_dtu_cost(
        &self,
        tier: Option<&str>,
        sku_name: Option<&str>,
        capacity: Option<u32>,
        location: &str,
    ) -> f64 {
        let description = format!(
            "SQL database (DTU) tier={} sku={} capacity={:?} location={}",
            tier.unwrap_or("-"),
            sku_name.unwrap_or("-"),
            capacity,
            location
        );
        let amount = self.estimate_dtu(tier, sku_name, capacity, location).await;
        settle("sql_database_dtu", &description, amount)
    }

    async fn estimate_dtu(
        &self,
        tier: Option<&str>,
        sku_name: Option<&str>,
        capacity: Option<u32>,
        location: &str,
    ) -> Option<f64> {
        let Some(SqlPricingModel::Dtu(dtu_tier)) = SqlPricingModel::detect(tier, sku_name, None)
        else {
            warn!(tier = ?tier, sku = ?sku_name, "Not a DTU tier");
            return None;
        };
        let region = self.resolve_region(location)?;
        let sku = sku_name.map(str::trim).filter(|s| !s.is_empty()).unwrap_or("");

        let filter = ODataFilter::for_service(&region.arm_name, "SQL Database")
            .contains("productName", dtu_tier.to_string())
            .any_of(vec![
                Clause::contains("meterName", "DTU"),
                Clause::contains("productName", "DTU"),
            ]);

        let mut prefer: Vec<String> = Vec::new();
        let mut meter_alternatives: Vec<String> = Vec::new();
        if !sku.is_empty() {
            prefer.push(sku.to_string());
            meter_alternatives.push(regex::escape(sku));
        }
        if let Some(capacity) = capacity.filter(|c| *c > 0) {
            prefer.push(capacity.to_string());
            meter_alternatives.push(capacity.to_string());
        }

        let mut criteria = MatchCriteria::new(format!(
            "{} {} ({:?} DTUs) in {}",
            dtu_tier, sku, capacity, region.display_name
        ))
        .unit_containing("month")
        .product_pattern(&format!("DTU|{}", dtu_tier))
        .prefer(prefer)
        .avoid(SQL_AVOID.into_iter().chain(["vCore", "Hyperscale"]));
        if !sku.is_empty() {
            criteria = criteria.exact_sku(sku).sku_pattern(&format!("^{}$", regex::escape(sku)));
        }
        if !meter_alternatives.is_empty() {
            let pattern = format!(r"({})\s*DTU", meter_alternatives.join("|"));
            criteria = criteria.meter_pattern(&pattern);
        }

        let (best, monthly) = self.lookup_record(&filter, &criteria).await?;

        if is_per_dtu(&best) {
            match capacity.filter(|c| *c > 0) {
                Some(dtus) => {
                    debug!(rate = monthly.amount, dtus, "Scaling per-DTU rate");
                    Some(monthly.amount * f64::from(dtus))
                }
                None => {
                    warn!(meter = %best.meter_name, "Per-DTU price but DTU capacity is missing");
                    None
                }
            }
        } else {
            Some(monthly.amount)
        }
    }

    /// Monthly cost of a vCore-model database.
    pub async fn sql_database_vcore_cost(
        &self,
        tier: Option<&str>,
        family: Option<&str>,
        sku_name: Option<&str>,
        capacity: Option<u32>,
        location: &str,
    ) -> f64 {
        let description = format!(
            "SQL database (vCore) tier={} family={} sku={} capacity={:?} location={}",
            tier.unwrap_or("-"),
            family.unwrap_or("-"),
            sku_name.unwrap_or("-"),
            capacity,
            location
        );
        let amount = self.estimate_vcore(tier, family, sku_name, capacity, location).await;
        settle("sql_database_vcore", &description, amount)
    }

    async fn estimate_vcore(
        &self,
        tier: Option<&str>,
        family: Option<&str>,
        sku_name: Option<&str>,
        capacity: Option<u32>,
        location: &str,
    ) -> Option<f64> {
        let Some(vcores) = capacity.filter(|c| *c > 0) else {
            warn!(tier = ?tier, sku = ?sku_name, "vCore capacity is missing");
            return None;
        };
        let Some(SqlPricingModel::Vcore(vcore_tier)) =
            SqlPricingModel::detect(tier, sku_name, family)
        else {
            warn!(tier = ?tier, sku = ?sku_name, "Unrecognized vCore tier");
            return None;
        };
        let region = self.resolve_region(location)?;
        let family = family
            .filter(|f| !f.trim().is_empty() && !f.to_lowercase().contains("vcore"))
            .map(str::to_string)
            .or_else(|| family_from_sku(sku_name))
            .unwrap_or_else(|| "Gen5".to_string());

        let filter = ODataFilter::for_service(&region.arm_name, "SQL Database")
            .contains("productName", vcore_tier.to_string())
            .contains("productName", &family)
            .contains("meterName", "vCore");

        let mut avoid: Vec<&str> = SQL_AVOID.to_vec();
        avoid.push("DTU");
        if vcore_tier != VcoreTier::Hyperscale {
            avoid.push("Hyperscale");
        }

        let criteria = MatchCriteria::new(format!(
            "{} {} ({} vCores) in {}",
            vcore_tier, family, vcores, region.display_name
        ))
        .unit_exact("1 Hour")
        .meter_pattern("vCore")
        .product_pattern(&format!(r"{}.*{}", vcore_tier, regex::escape(&family)))
        .prefer(["vCore".to_string(), family.clone()])
        .avoid(avoid);

        let monthly = self.lookup(&filter, &criteria).await?;
        Some(monthly.amount * f64::from(vcores))
    }
}
