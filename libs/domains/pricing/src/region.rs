//! Region normalization
//!
//! Maps free-form location strings ("westus3", "West US 3", "west-us-3") to the
//! catalog's region identifiers.

use std::collections::HashMap;
use std::sync::{LazyLock, PoisonError, RwLock};
use tracing::warn;

/// Known regions as (armRegionName, display name)
const KNOWN_REGIONS: &[(&str, &str)] = &[
    ("eastus", "East US"),
    ("eastus2", "East US 2"),
    ("centralus", "Central US"),
    ("northcentralus", "North Central US"),
    ("southcentralus", "South Central US"),
    ("westcentralus", "West Central US"),
    ("westus", "West US"),
    ("westus2", "West US 2"),
    ("westus3", "West US 3"),
    ("canadacentral", "Canada Central"),
    ("canadaeast", "Canada East"),
    ("brazilsouth", "Brazil South"),
    ("brazilsoutheast", "Brazil Southeast"),
    ("mexicocentral", "Mexico Central"),
    ("northeurope", "North Europe"),
    ("westeurope", "West Europe"),
    ("uksouth", "UK South"),
    ("ukwest", "UK West"),
    ("francecentral", "France Central"),
    ("francesouth", "France South"),
    ("germanywestcentral", "Germany West Central"),
    ("germanynorth", "Germany North"),
    ("switzerlandnorth", "Switzerland North"),
    ("switzerlandwest", "Switzerland West"),
    ("norwayeast", "Norway East"),
    ("norwaywest", "Norway West"),
    ("swedencentral", "Sweden Central"),
    ("polandcentral", "Poland Central"),
    ("italynorth", "Italy North"),
    ("spaincentral", "Spain Central"),
    ("eastasia", "East Asia"),
    ("southeastasia", "Southeast Asia"),
    ("japaneast", "Japan East"),
    ("japanwest", "Japan West"),
    ("koreacentral", "Korea Central"),
    ("koreasouth", "Korea South"),
    ("australiaeast", "Australia East"),
    ("australiasoutheast", "Australia Southeast"),
    ("australiacentral", "Australia Central"),
    ("australiacentral2", "Australia Central 2"),
    ("centralindia", "Central India"),
    ("southindia", "South India"),
    ("westindia", "West India"),
    ("uaenorth", "UAE North"),
    ("uaecentral", "UAE Central"),
    ("qatarcentral", "Qatar Central"),
    ("israelcentral", "Israel Central"),
    ("southafricanorth", "South Africa North"),
    ("southafricawest", "South Africa West"),
];

/// Lookup table keyed by the compact form of both the arm name and the display name
static REGION_TABLE: LazyLock<HashMap<String, Region>> = LazyLock::new(|| {
    let mut table = HashMap::with_capacity(KNOWN_REGIONS.len() * 2);
    for (arm, display) in KNOWN_REGIONS {
        let region = Region {
            arm_name: (*arm).to_string(),
            display_name: (*display).to_string(),
        };
        table.insert(compact(arm), region.clone());
        table.insert(compact(display), region);
    }
    table
});

/// A resolved region in both of the catalog's spellings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    /// `armRegionName` form used in catalog filters, e.g. `westus3`
    pub arm_name: String,
    /// Canonical display form, e.g. `West US 3`
    pub display_name: String,
}

/// Region normalizer with a per-input memo.
#[derive(Debug, Default)]
pub struct RegionNormalizer {
    memo: RwLock<HashMap<String, Region>>,
}

impl RegionNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonical display name for a raw location. Never fails.
    pub fn normalize(&self, raw_location: &str) -> String {
        self.resolve(raw_location).display_name
    }

    /// Resolve a raw location into both region spellings.
    pub fn resolve(&self, raw_location: &str) -> Region {
        if let Some(hit) = self
            .memo
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(raw_location)
        {
            return hit.clone();
        }

        let region = resolve_uncached(raw_location);
        self.memo
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(raw_location.to_string(), region.clone());
        region
    }
}

fn resolve_uncached(raw_location: &str) -> Region {
    let key = compact(raw_location);
    if key.is_empty() {
        return Region {
            arm_name: String::new(),
            display_name: String::new(),
        };
    }

    if let Some(region) = REGION_TABLE.get(&key) {
        return region.clone();
    }

    let display_name = capitalize_words(raw_location);
    warn!(
        location = raw_location,
        fallback = %display_name,
        "Unknown region, using capitalized fallback; region table may need extending"
    );

    Region {
        arm_name: key,
        display_name,
    }
}

/// Lowercase with whitespace and hyphens removed
fn compact(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

fn capitalize_words(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_region_variants() {
        let normalizer = RegionNormalizer::new();
        assert_eq!(normalizer.normalize("westus3"), "West US 3");
        assert_eq!(normalizer.normalize("West US 3"), "West US 3");
        assert_eq!(normalizer.normalize("west-us-3"), "West US 3");
        assert_eq!(normalizer.normalize("WESTEUROPE"), "West Europe");
    }

    #[test]
    fn test_resolve_returns_arm_name() {
        let normalizer = RegionNormalizer::new();
        let region = normalizer.resolve("North Europe");
        assert_eq!(region.arm_name, "northeurope");
        assert_eq!(region.display_name, "North Europe");
    }

    #[test]
    fn test_unknown_region_capitalizes_words() {
        let normalizer = RegionNormalizer::new();
        let region = normalizer.resolve("atlantis deep south");
        assert_eq!(region.display_name, "Atlantis Deep South");
        assert_eq!(region.arm_name, "atlantisdeepsouth");
    }

    #[test]
    fn test_empty_input_yields_empty_string() {
        let normalizer = RegionNormalizer::new();
        assert_eq!(normalizer.normalize(""), "");
        assert_eq!(normalizer.normalize("   "), "");
    }

    #[test]
    fn test_memoized_result_is_stable() {
        let normalizer = RegionNormalizer::new();
        let first = normalizer.resolve("swedencentral");
        let second = normalizer.resolve("swedencentral");
        assert_eq!(first, second);
        assert_eq!(normalizer.memo.read().unwrap().len(), 1);
    }
}
