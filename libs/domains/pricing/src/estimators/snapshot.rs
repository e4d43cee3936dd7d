//! Managed disk snapshot estimation

use strum::Display;
use tracing::warn;

use super::{CostEstimator, settle};
use crate::catalog::CatalogTransport;
use crate::filter::ODataFilter;
use crate::models::Redundancy;
use crate::scorer::MatchCriteria;
use crate::units::PriceBasis;

/// Storage tier a snapshot is billed at, taken from its source disk SKU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SnapshotStorage {
    #[strum(serialize = "Standard HDD")]
    StandardHdd,
    #[strum(serialize = "Standard SSD")]
    StandardSsd,
    #[strum(serialize = "Premium SSD")]
    Premium,
}

impl SnapshotStorage {
    pub fn from_sku(sku: Option<&str>) -> Self {
        let sku = sku.unwrap_or_default().to_lowercase();
        if sku.contains("premium") {
            SnapshotStorage::Premium
        } else if sku.contains("standardssd") {
            SnapshotStorage::StandardSsd
        } else {
            SnapshotStorage::StandardHdd
        }
    }

    fn product_name(&self) -> &'static str {
        match self {
            SnapshotStorage::StandardHdd => "Standard HDD Managed Disks",
            SnapshotStorage::StandardSsd => "Standard SSD Managed Disks",
            SnapshotStorage::Premium => "Premium SSD Managed Disks",
        }
    }
}

impl<T: CatalogTransport> CostEstimator<T> {
    /// Monthly cost of a snapshot of `size_gb`.
    pub async fn snapshot_cost(
        &self,
        size_gb: u32,
        location: &str,
        source_sku: Option<&str>,
    ) -> f64 {
        let description = format!(
            "Snapshot size={}GB sku={} location={}",
            size_gb,
            source_sku.unwrap_or("-"),
            location
        );
        let amount = self.estimate_snapshot(size_gb, location, source_sku).await;
        settle("snapshot", &description, amount)
    }

    async fn estimate_snapshot(
        &self,
        size_gb: u32,
        location: &str,
        source_sku: Option<&str>,
    ) -> Option<f64> {
        if size_gb == 0 {
            warn!(sku = ?source_sku, "Snapshot size must be positive");
            return None;
        }

        let region = self.resolve_region(location)?;
        let storage = SnapshotStorage::from_sku(source_sku);
        let redundancy = Redundancy::from_sku(source_sku.unwrap_or_default());
        let other_redundancy = match redundancy {
            Redundancy::Lrs => Redundancy::Zrs,
            Redundancy::Zrs => Redundancy::Lrs,
        };

        let filter = ODataFilter::for_service(&region.arm_name, "Storage")
            .eq("productName", storage.product_name())
            .contains("meterName", "Snapshot");

        let criteria = MatchCriteria::new(format!(
            "{} {} snapshot ({}GB) in {}",
            storage, redundancy, size_gb, region.display_name
        ))
        .unit_containing("gb/month")
        .meter_pattern(&format!(r"{}.*Snapshot", redundancy))
        .product_pattern(storage.product_name())
        .prefer([redundancy.to_string()])
        .avoid([other_redundancy.to_string(), "Disk".to_string()]);

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

    fn snapshots(product: &str) -> Vec<crate::models::PriceRecord> {
        vec![
            record(product, "Snapshot", "LRS Snapshot", "1 GB/Month", 0.05),
            record(product, "Snapshot", "ZRS Snapshot", "1 GB/Month", 0.0625),
            record(product, "Snapshot", "LRS Snapshot Disk", "1 GB/Month", 0.01),
        ]
    }

    #[test]
    fn test_storage_from_sku() {
        assert_eq!(SnapshotStorage::from_sku(None), SnapshotStorage::StandardHdd);
        assert_eq!(SnapshotStorage::from_sku(Some("Premium_ZRS")), SnapshotStorage::Premium);
        assert_eq!(
            SnapshotStorage::from_sku(Some("StandardSSD_LRS")),
            SnapshotStorage::StandardSsd
        );
        assert_eq!(SnapshotStorage::from_sku(Some("Standard_LRS")), SnapshotStorage::StandardHdd);
    }

    #[tokio::test]
    async fn test_lrs_snapshot_scales_by_size() {
        let estimator = estimator(vec![(
            "Standard HDD Managed Disks",
            snapshots("Standard HDD Managed Disks"),
        )]);
        let cost = estimator.snapshot_cost(100, "westus3", Some("Standard_LRS")).await;
        assert!(approx(cost, 5.0));
    }

    #[tokio::test]
    async fn test_zrs_premium_snapshot() {
        let estimator = estimator(vec![(
            "Premium SSD Managed Disks",
            snapshots("Premium SSD Managed Disks"),
        )]);
        let cost = estimator.snapshot_cost(64, "westus3", Some("Premium_ZRS")).await;
        assert!(approx(cost, 4.0));
    }

    #[tokio::test]
    async fn test_zero_size_is_zero() {
        let estimator = estimator(vec![("Snapshot", snapshots("Standard HDD Managed Disks"))]);
        assert_eq!(estimator.snapshot_cost(0, "westus3", None).await, 0.0);
    }
}
