//! Virtual machine compute estimation

use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

use super::{CostEstimator, settle};
use crate::catalog::CatalogTransport;
use crate::filter::{Clause, ODataFilter};
use crate::models::OsType;
use crate::region::Region;
use crate::scorer::MatchCriteria;

/// "D2s", "E4-2ads", "NC24rs", "M416ms"
static SIZE_BODY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^([a-z]+)(\d+)(?:-(\d+))?([a-z]*)$").unwrap());

static VERSION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^v\d+$").unwrap());

/// A parsed VM size such as `Standard_D2s_v3`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmSize {
    /// "Standard" or "Basic"
    pub tier: String,
    /// Series letters, e.g. "D", "NC", "DC"
    pub series: String,
    /// vCPU count as written, e.g. "2"
    pub size: String,
    /// Active cores of a constrained-core size ("E4-2s" → 2)
    pub constrained_cores: Option<u32>,
    /// Lowercase feature flags, e.g. "s", "ads"
    pub features: String,
    /// Segments between the body and the version, e.g. "A10" in `NV36ads_A10_v5`
    pub extras: Vec<String>,
    /// Lowercase version, e.g. "v3"
    pub version: Option<String>,
    arm_name: String,
}

impl VmSize {
    pub fn parse(vm_size: &str) -> Option<Self> {
        let vm_size = vm_size.trim();
        let mut parts = vm_size.split('_').filter(|p| !p.is_empty());

        let first = parts.next()?;
        let (tier, body) = if first.eq_ignore_ascii_case("standard")
            || first.eq_ignore_ascii_case("basic")
        {
            (capitalize(first), parts.next()?)
        } else {
            ("Standard".to_string(), first)
        };

        let caps = SIZE_BODY.captures(body)?;
        let series = caps[1].to_uppercase();
        let size = caps[2].to_string();
        let constrained_cores = caps.get(3).and_then(|m| m.as_str().parse().ok());
        let features = caps[4].to_lowercase();

        let mut extras = Vec::new();
        let mut version = None;
        for part in parts {
            if VERSION.is_match(part) {
                version = Some(part.to_lowercase());
            } else {
                extras.push(part.to_string());
            }
        }

        Some(Self {
            tier,
            series,
            size,
            constrained_cores,
            features,
            extras,
            version,
            arm_name: vm_size.to_string(),
        })
    }

    /// `armSkuName` as given, e.g. "Standard_D2s_v3"
    pub fn arm_sku_name(&self) -> &str {
        &self.arm_name
    }

    /// Catalog `skuName`, e.g. "D2s v3" or "E4-2s v3"
    pub fn catalog_sku_name(&self) -> String {
        let mut name = format!("{}{}", self.series, self.size);
        if let Some(cores) = self.constrained_cores {
            name.push_str(&format!("-{}", cores));
        }
        name.push_str(&self.features);
        for extra in &self.extras {
            name.push(' ');
            name.push_str(extra);
        }
        if let Some(version) = &self.version {
            name.push(' ');
            name.push_str(version);
        }
        name
    }

    /// Product-name search terms, most specific first:
    /// "Dsv3 Series", "DSv3 Series", "Dv3 Series", "D Series"
    pub fn product_search_terms(&self) -> Vec<String> {
        let version = self.version.as_deref().unwrap_or("");
        let candidates = [
            format!("{}{}{} Series", self.series, self.features, version),
            format!("{}{}{} Series", self.series, self.features.to_uppercase(), version),
            format!("{}{} Series", self.series, version),
            format!("{} Series", self.series),
        ];

        let mut terms: Vec<String> = Vec::with_capacity(candidates.len());
        for term in candidates {
            if !terms.contains(&term) {
                terms.push(term);
            }
        }
        terms
    }
}

fn capitalize(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl<T: CatalogTransport> CostEstimator<T> {
    /// Monthly pay-as-you-go compute cost of a VM.
    pub async fn vm_compute_cost(&self, vm_size: &str, os: OsType, location: &str) -> f64 {
        let description = format!("VM size={} os={} location={}", vm_size, os, location);
        let amount = self.estimate_vm(vm_size, os, location).await;
        settle("vm", &description, amount)
    }

    async fn estimate_vm(&self, vm_size: &str, os: OsType, location: &str) -> Option<f64> {
        let Some(size) = VmSize::parse(vm_size) else {
            warn!(vm_size = vm_size, "Unrecognized VM size");
            return None;
        };
        let region = self.resolve_region(location)?;
        let criteria = vm_criteria(&size, os, &region);

        let by_arm_sku = ODataFilter::for_service(&region.arm_name, "Virtual Machines")
            .eq("armSkuName", size.arm_sku_name());
        if let Some(monthly) = self.lookup(&by_arm_sku, &criteria).await {
            return Some(monthly.amount);
        }

        debug!(vm_size = vm_size, "No armSkuName match, searching by product series");
        let by_series = ODataFilter::for_service(&region.arm_name, "Virtual Machines").any_of(
            size.product_search_terms()
                .into_iter()
                .map(|term| Clause::contains("productName", term))
                .collect(),
        );
        self.lookup(&by_series, &criteria).await.map(|monthly| monthly.amount)
    }
}

fn vm_criteria(size: &VmSize, os: OsType, region: &Region) -> MatchCriteria {
    let sku = size.catalog_sku_name();
    let product_pattern = match os {
        OsType::Windows => "Windows".to_string(),
        OsType::Linux => r"Series\s*$".to_string(),
    };

    MatchCriteria::new(format!("{} {} VM in {}", size.arm_sku_name(), os, region.display_name))
        .unit_exact("1 Hour")
        .exact_sku(&sku)
        .exact_meter(&sku)
        .sku_pattern(&format!("^{}$", regex::escape(&sku)))
        .product_pattern(&product_pattern)
        .avoid(["Spot", "Low Priority"])
}
