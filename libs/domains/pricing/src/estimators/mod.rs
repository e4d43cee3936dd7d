//! Resource estimators
//!
//! Each estimator resolves the region, builds a catalog filter and match
//! criteria for its resource, runs the catalog → scorer → unit pipeline and
//! applies the resource's scaling. Estimators never fail: anything they cannot
//! price is reported as `0.0` with a warning.

mod app_gateway;
mod app_service;
mod disk;
mod public_ip;
mod snapshot;
mod sql_database;
mod vm;

pub use app_gateway::{AppGatewayFamily, GatewaySize};
pub use disk::{DiskKind, disk_tier};
pub use public_ip::PublicIpSku;
pub use snapshot::SnapshotStorage;
pub use sql_database::{DtuTier, SqlPricingModel, VcoreTier, is_per_dtu};
pub use vm::VmSize;

use observability::CatalogMetrics;
use tracing::{info, warn};

use crate::catalog::{CatalogClient, CatalogTransport, HttpTransport};
use crate::config::CatalogConfig;
use crate::error::CatalogResult;
use crate::filter::ODataFilter;
use crate::models::PriceRecord;
use crate::region::{Region, RegionNormalizer};
use crate::scorer::{CandidateScorer, MatchCriteria};
use crate::units::{MonthlyPrice, to_monthly};

/// Monthly cost estimation for individual resources.
///
/// Holds the catalog client (and therefore the price cache), the region
/// normalizer and the scorer. Share one instance (e.g. behind an `Arc`) so
/// lookups for the same filter hit the network once.
pub struct CostEstimator<T: CatalogTransport> {
    catalog: CatalogClient<T>,
    regions: RegionNormalizer,
    scorer: CandidateScorer,
}

impl CostEstimator<HttpTransport> {
    pub fn from_config(config: CatalogConfig) -> CatalogResult<Self> {
        Ok(Self::new(CatalogClient::from_config(config)?))
    }
}

impl<T: CatalogTransport> CostEstimator<T> {
    pub fn new(catalog: CatalogClient<T>) -> Self {
        Self {
            catalog,
            regions: RegionNormalizer::new(),
            scorer: CandidateScorer::default(),
        }
    }

    pub fn with_scorer(mut self, scorer: CandidateScorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn catalog(&self) -> &CatalogClient<T> {
        &self.catalog
    }

    pub fn regions(&self) -> &RegionNormalizer {
        &self.regions
    }

    /// Currency the estimates are expressed in
    pub fn currency(&self) -> &str {
        &self.catalog.config().currency_code
    }

    pub(crate) fn resolve_region(&self, location: &str) -> Option<Region> {
        let region = self.regions.resolve(location);
        if region.arm_name.is_empty() {
            warn!(location = location, "Missing location, cannot query catalog");
            return None;
        }
        Some(region)
    }

    /// Fetch, select and normalize. `None` when nothing in the catalog matches.
    pub(crate) async fn lookup(
        &self,
        filter: &ODataFilter,
        criteria: &MatchCriteria,
    ) -> Option<MonthlyPrice> {
        self.lookup_record(filter, criteria)
            .await
            .map(|(_, monthly)| monthly)
    }

    /// Like [`Self::lookup`], also returning the selected record.
    pub(crate) async fn lookup_record(
        &self,
        filter: &ODataFilter,
        criteria: &MatchCriteria,
    ) -> Option<(PriceRecord, MonthlyPrice)> {
        let filter = filter.build();
        let records = self.catalog.fetch(&filter).await;
        let Some(best) = self.scorer.select_best(&records, criteria) else {
            warn!(
                resource = %criteria.description,
                filter = %filter,
                candidates = records.len(),
                "No price match"
            );
            return None;
        };

        let monthly = to_monthly(best)?;
        info!(
            resource = %criteria.description,
            meter = %best.meter_name,
            sku = %best.sku_name,
            amount = monthly.amount,
            unit = %monthly.display_unit,
            "Matched price"
        );
        Some((best.clone(), monthly))
    }
}

/// Log and record the outcome of one estimator call, mapping "unknown" to zero.
pub(crate) fn settle(resource: &'static str, description: &str, amount: Option<f64>) -> f64 {
    CatalogMetrics::record_estimation(resource, amount.is_some());
    match amount {
        Some(amount) => {
            info!(
                resource = resource,
                description = description,
                monthly = amount,
                "Estimated monthly cost"
            );
            amount
        }
        None => {
            warn!(
                resource = resource,
                description = description,
                "Could not estimate cost, reporting 0"
            );
            0.0
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::scorer::ScoringWeights;

    #[tokio::test]
    async fn test_lookup_returns_none_without_candidates() {
        let estimator = estimator(vec![]);
        let filter = ODataFilter::for_service("westus3", "Storage");
        let criteria = MatchCriteria::new("anything");
        assert!(estimator.lookup(&filter, &criteria).await.is_none());
    }

    #[tokio::test]
    async fn test_lookup_normalizes_selected_record() {
        let estimator = estimator(vec![(
            "Virtual Network",
            vec![record(
                "IP Addresses",
                "Standard",
                "Standard IPv4 Static Public IP",
                "1 Hour",
                0.005,
            )],
        )]);
        let filter = ODataFilter::for_service("westus3", "Virtual Network");
        let monthly = estimator
            .lookup(&filter, &MatchCriteria::new("ip").unit_exact("1 Hour"))
            .await
            .unwrap();
        assert!(approx(monthly.amount, 3.65));
    }

    #[tokio::test]
    async fn test_custom_weights_change_selection() {
        let routes = || {
            vec![(
                "Virtual Network",
                vec![
                    record("IP Addresses", "Standard", "Standard Static", "1 Hour", 0.01),
                    record("IP Addresses", "Standard", "Standard Dynamic", "1 Hour", 0.005),
                ],
            )]
        };
        let filter = ODataFilter::for_service("westus3", "Virtual Network");
        let criteria = MatchCriteria::new("ip").unit_exact("1 Hour").prefer(["Static"]);

        let default = estimator(routes()).lookup(&filter, &criteria).await.unwrap();
        assert!(approx(default.amount, 7.3));

        let no_prefer = ScoringWeights {
            prefer: 0,
            ..ScoringWeights::default()
        };
        let tuned = estimator(routes()).with_scorer(CandidateScorer::new(no_prefer));
        let cheapest = tuned.lookup(&filter, &criteria).await.unwrap();
        assert!(approx(cheapest.amount, 3.65));
    }

    #[test]
    fn test_missing_location_is_unresolved() {
        let estimator = estimator(vec![]);
        assert!(estimator.resolve_region("  ").is_none());
        assert_eq!(estimator.resolve_region("West US 3").unwrap().arm_name, "westus3");
    }

    #[test]
    fn test_settle_maps_unknown_to_zero() {
        assert_eq!(settle("disk", "test", None), 0.0);
        assert_eq!(settle("disk", "test", Some(4.2)), 4.2);
    }
}
