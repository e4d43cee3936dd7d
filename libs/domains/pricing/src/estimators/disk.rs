//! Managed disk estimation

use strum::Display;
use tracing::{debug, warn};

use super::{CostEstimator, settle};
use crate::catalog::CatalogTransport;
use crate::filter::ODataFilter;
use crate::models::Redundancy;
use crate::region::Region;
use crate::scorer::MatchCriteria;
use crate::units::PriceBasis;

/// Disk size (GB) → (Premium tier, Standard SSD tier). A size maps to the
/// smallest tier that can hold it.
const DISK_TIERS: &[(u32, &str, &str)] = &[
    (4, "P1", "E1"),
    (8, "P2", "E2"),
    (16, "P3", "E3"),
    (32, "P4", "E4"),
    (64, "P6", "E6"),
    (128, "P10", "E10"),
    (256, "P15", "E15"),
    (512, "P20", "E20"),
    (1024, "P30", "E30"),
    (2048, "P40", "E40"),
    (4096, "P50", "E50"),
    (8192, "P60", "E60"),
    (16384, "P70", "E70"),
    (32767, "P80", "E80"),
];

const DISK_AVOID: [&str; 4] = ["Snapshot", "Burst", "Transaction", "Mount"];

/// Performance tiers (Premium, Standard SSD) for a size, `None` above the largest tier
pub fn disk_tier(size_gb: u32) -> Option<(&'static str, &'static str)> {
    if size_gb == 0 {
        return None;
    }
    DISK_TIERS
        .iter()
        .find(|(capacity, _, _)| size_gb <= *capacity)
        .map(|(_, premium, standard_ssd)| (*premium, *standard_ssd))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DiskKind {
    #[strum(serialize = "Premium SSD")]
    PremiumSsd,
    #[strum(serialize = "Premium SSD v2")]
    PremiumSsdV2,
    #[strum(serialize = "Standard SSD")]
    StandardSsd,
    #[strum(serialize = "Standard HDD")]
    StandardHdd,
    #[strum(serialize = "Ultra Disk")]
    Ultra,
}

impl DiskKind {
    /// Classify an ARM disk SKU such as `Premium_LRS` or `StandardSSD_ZRS`
    pub fn from_sku(sku: &str) -> Option<Self> {
        let sku = sku.to_lowercase();
        if sku.contains("premiumv2") || sku.contains("premium_v2") {
            Some(DiskKind::PremiumSsdV2)
        } else if sku.contains("ultra") {
            Some(DiskKind::Ultra)
        } else if sku.contains("premium") {
            Some(DiskKind::PremiumSsd)
        } else if sku.contains("standardssd") {
            Some(DiskKind::StandardSsd)
        } else if sku.contains("standard") {
            Some(DiskKind::StandardHdd)
        } else {
            None
        }
    }

    /// Catalog product name for the disk family
    pub fn product_name(&self) -> &'static str {
        match self {
            DiskKind::PremiumSsd => "Premium SSD Managed Disks",
            DiskKind::PremiumSsdV2 => "Premium SSD v2 Managed Disks",
            DiskKind::StandardSsd => "Standard SSD Managed Disks",
            DiskKind::StandardHdd => "Standard HDD Managed Disks",
            DiskKind::Ultra => "Ultra Disks",
        }
    }
}

impl<T: CatalogTransport> CostEstimator<T> {
    /// Monthly cost of a managed disk.
    pub async fn disk_cost(&self, sku: &str, size_gb: u32, location: &str) -> f64 {
        let description = format!("Disk sku={} size={}GB location={}", sku, size_gb, location);
        let amount = self.estimate_disk(sku, size_gb, location).await;
        settle("disk", &description, amount)
    }

    async fn estimate_disk(&self, sku: &str, size_gb: u32, location: &str) -> Option<f64> {
        if sku.trim().is_empty() {
            warn!(location = location, "Disk SKU is missing");
            return None;
        }
        if size_gb == 0 {
            warn!(sku = sku, "Disk size must be positive");
            return None;
        }

        let Some(kind) = DiskKind::from_sku(sku) else {
            warn!(sku = sku, "Unrecognized disk SKU");
            return None;
        };
        let redundancy = Redundancy::from_sku(sku);
        let region = self.resolve_region(location)?;

        match kind {
            DiskKind::PremiumSsdV2 | DiskKind::Ultra => {
                warn!(
                    sku = sku,
                    kind = %kind,
                    "Disk is billed on provisioned IOPS and throughput; not estimated"
                );
                None
            }
            DiskKind::PremiumSsd => {
                let Some((tier, _)) = disk_tier(size_gb) else {
                    warn!(sku = sku, size_gb, "Disk size exceeds the largest Premium tier");
                    return None;
                };
                self.tiered_disk(&region, kind, tier, redundancy, size_gb).await
            }
            DiskKind::StandardSsd => {
                let Some((_, tier)) = disk_tier(size_gb) else {
                    warn!(sku = sku, size_gb, "Disk size exceeds the largest Standard SSD tier");
                    return None;
                };
                match self.tiered_disk(&region, kind, tier, redundancy, size_gb).await {
                    Some(cost) => Some(cost),
                    None => {
                        debug!(tier = tier, "No Standard SSD tier price, trying per-GB meter");
                        self.per_gb_disk(&region, kind, redundancy, size_gb).await
                    }
                }
            }
            DiskKind::StandardHdd => self.per_gb_disk(&region, kind, redundancy, size_gb).await,
        }
    }

    /// Fixed monthly price of a performance tier, e.g. `P10 LRS Disk`
    async fn tiered_disk(
        &self,
        region: &Region,
        kind: DiskKind,
        tier: &str,
        redundancy: Redundancy,
        size_gb: u32,
    ) -> Option<f64> {
        let meter = format!("{} {} Disk", tier, redundancy);
        let filter = ODataFilter::for_service(&region.arm_name, "Storage")
            .eq("productName", kind.product_name())
            .contains("skuName", format!("{} {}", tier, redundancy));

        let criteria = MatchCriteria::new(format!(
            "{} {} ({}GB) in {}",
            kind, meter, size_gb, region.display_name
        ))
        .unit_containing("month")
        .meter_pattern(&format!(r"^{}\s+{}\s+Disk$", tier, redundancy))
        .product_pattern(kind.product_name())
        .exact_meter(&meter)
        .exact_sku(format!("{} {}", tier, redundancy))
        .prefer([redundancy.to_string()])
        .avoid(DISK_AVOID);

        let monthly = self.lookup(&filter, &criteria).await?;
        if monthly.is_per_gb() {
            Some(monthly.amount * f64::from(size_gb))
        } else {
            Some(monthly.amount)
        }
    }

    /// Per-GB monthly rate scaled by size
    async fn per_gb_disk(
        &self,
        region: &Region,
        kind: DiskKind,
        redundancy: Redundancy,
        size_gb: u32,
    ) -> Option<f64> {
        let filter = ODataFilter::for_service(&region.arm_name, "Storage")
            .eq("productName", kind.product_name())
            .contains("meterName", redundancy.to_string());

        let criteria = MatchCriteria::new(format!(
            "{} {} per-GB disk ({}GB) in {}",
            kind, redundancy, size_gb, region.display_name
        ))
        .unit_containing("gb/month")
        .meter_pattern(&format!(r"{}.*Disk", redundancy))
        .product_pattern(kind.product_name())
        .prefer([redundancy.to_string()])
        .avoid(DISK_AVOID.into_iter().chain(["Data Stored"]));

        let monthly = self.lookup(&filter, &criteria).await?;
        match monthly.basis {
            PriceBasis::PerGbMonth => Some(monthly.amount * f64::from(size_gb)),
            _ => Some(monthly.amount),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn test_disk_tier_is_ceiling() {
        assert_eq!(disk_tier(4), Some(("P1", "E1")));
        assert_eq!(disk_tier(100), Some(("P10", "E10")));
        assert_eq!(disk_tier(128), Some(("P10", "E10")));
        assert_eq!(disk_tier(129), Some(("P15", "E15")));
        assert_eq!(disk_tier(32767), Some(("P80", "E80")));
        assert_eq!(disk_tier(40000), None);
        assert_eq!(disk_tier(0), None);
    }

    #[test]
    fn test_disk_kind_from_sku() {
        assert_eq!(DiskKind::from_sku("Premium_LRS"), Some(DiskKind::PremiumSsd));
        assert_eq!(DiskKind::from_sku("PremiumV2_LRS"), Some(DiskKind::PremiumSsdV2));
        assert_eq!(DiskKind::from_sku("StandardSSD_ZRS"), Some(DiskKind::StandardSsd));
        assert_eq!(DiskKind::from_sku("Standard_LRS"), Some(DiskKind::StandardHdd));
        assert_eq!(DiskKind::from_sku("UltraSSD_LRS"), Some(DiskKind::Ultra));
        assert_eq!(DiskKind::from_sku("Magnetic"), None);
    }

    #[tokio::test]
    async fn test_premium_disk_uses_fixed_tier_price() {
        let estimator = estimator(vec![(
            "Premium SSD Managed Disks",
            vec![
                record("Premium SSD Managed Disks", "P10 LRS", "P10 LRS Disk", "1/Month", 19.71),
                record(
                    "Premium SSD Managed Disks",
                    "P10 LRS",
                    "P10 LRS Disk Mount",
                    "1/Month",
                    1.5,
                ),
                record("Premium SSD Managed Disks", "P15 LRS", "P15 LRS Disk", "1/Month", 38.02),
            ],
        )]);

        let cost = estimator.disk_cost("Premium_LRS", 128, "westus3").await;
        assert!(approx(cost, 19.71));
    }

    #[tokio::test]
    async fn test_standard_hdd_scales_per_gb() {
        let estimator = estimator(vec![(
            "Standard HDD Managed Disks",
            vec![record(
                "Standard HDD Managed Disks",
                "Standard_LRS",
                "LRS Disk",
                "1 GB/Month",
                0.05,
            )],
        )]);

        let cost = estimator.disk_cost("Standard_LRS", 512, "West US 3").await;
        assert!(approx(cost, 25.60));
    }

    #[tokio::test]
    async fn test_standard_ssd_falls_back_to_per_gb() {
        let estimator = estimator(vec![(
            "meterName, 'LRS'",
            vec![record(
                "Standard SSD Managed Disks",
                "StandardSSD_LRS",
                "Standard SSD LRS Disk",
                "1 GB/Month",
                0.075,
            )],
        )]);

        let cost = estimator.disk_cost("StandardSSD_LRS", 100, "westus3").await;
        assert!(approx(cost, 7.5));
    }

    #[tokio::test]
    async fn test_standard_ssd_tier_price() {
        let estimator = estimator(vec![(
            "skuName, 'E10 ZRS'",
            vec![record("Standard SSD Managed Disks", "E10 ZRS", "E10 ZRS Disk", "1/Month", 11.52)],
        )]);

        let cost = estimator.disk_cost("StandardSSD_ZRS", 128, "westus3").await;
        assert!(approx(cost, 11.52));
    }

    #[tokio::test]
    async fn test_unpriced_disks_are_zero() {
        let estimator = estimator(vec![]);
        assert_eq!(estimator.disk_cost("UltraSSD_LRS", 256, "westus3").await, 0.0);
        assert_eq!(estimator.disk_cost("PremiumV2_LRS", 256, "westus3").await, 0.0);
        assert_eq!(estimator.disk_cost("", 256, "westus3").await, 0.0);
        assert_eq!(estimator.disk_cost("Premium_LRS", 0, "westus3").await, 0.0);
        assert_eq!(estimator.disk_cost("Premium_LRS", 65536, "westus3").await, 0.0);
        assert_eq!(estimator.disk_cost("Floppy", 1, "westus3").await, 0.0);
    }

    #[tokio::test]
    async fn test_no_match_is_zero() {
        let estimator = estimator(vec![]);
        assert_eq!(estimator.disk_cost("Premium_LRS", 128, "westus3").await, 0.0);
    }
}
