//! Retail price catalog client
//!
//! Fetches price records for an OData filter, follows `NextPageLink`
//! pagination and caches the combined result per filter string. Filters the
//! service rejects as invalid are remembered and never sent again.
//! https://learn.microsoft.com/en-us/rest/api/cost-management/retail-prices/azure-retail-prices

use async_trait::async_trait;
use observability::{CatalogMetrics, FetchTimer};
use reqwest::Client;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::config::CatalogConfig;
use crate::error::{CatalogError, CatalogResult};
use crate::models::{CatalogPage, PriceRecord};

/// Transport for a single catalog page.
///
/// Implementations classify non-success statuses with [`CatalogError::from_status`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogTransport: Send + Sync {
    async fn get_page(&self, url: &str) -> CatalogResult<CatalogPage>;
}

/// reqwest-backed transport
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &CatalogConfig) -> CatalogResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("cost-estimator/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl CatalogTransport for HttpTransport {
    async fn get_page(&self, url: &str) -> CatalogResult<CatalogPage> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message: String = body.chars().take(512).collect();
            return Err(CatalogError::from_status(status.as_u16(), message));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Process-lifetime cache of catalog responses keyed by the exact filter string.
///
/// Entries never expire. Concurrent inserts for the same filter resolve as last write wins.
#[derive(Debug, Default)]
pub struct PriceCache {
    entries: RwLock<HashMap<String, Arc<Vec<PriceRecord>>>>,
    failed: RwLock<HashSet<String>>,
}

impl PriceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, filter: &str) -> Option<Arc<Vec<PriceRecord>>> {
        self.entries.read().await.get(filter).cloned()
    }

    pub async fn insert(&self, filter: &str, records: Vec<PriceRecord>) -> Arc<Vec<PriceRecord>> {
        let records = Arc::new(records);
        self.entries
            .write()
            .await
            .insert(filter.to_string(), Arc::clone(&records));
        records
    }

    pub async fn is_failed(&self, filter: &str) -> bool {
        self.failed.read().await.contains(filter)
    }

    /// Remember a rejected filter and cache an empty result for it
    pub async fn mark_failed(&self, filter: &str) {
        self.failed.write().await.insert(filter.to_string());
        self.insert(filter, Vec::new()).await;
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn failed_count(&self) -> usize {
        self.failed.read().await.len()
    }
}

/// Catalog client: failed-filter check, cache lookup, then paginated fetch.
pub struct CatalogClient<T: CatalogTransport> {
    transport: T,
    cache: Arc<PriceCache>,
    config: CatalogConfig,
}

impl CatalogClient<HttpTransport> {
    /// Client over HTTP with a fresh cache
    pub fn from_config(config: CatalogConfig) -> CatalogResult<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::new(transport, config))
    }
}

impl<T: CatalogTransport> CatalogClient<T> {
    pub fn new(transport: T, config: CatalogConfig) -> Self {
        Self::with_cache(transport, config, Arc::new(PriceCache::new()))
    }

    /// Client sharing an existing cache (e.g. across estimators or tests)
    pub fn with_cache(transport: T, config: CatalogConfig, cache: Arc<PriceCache>) -> Self {
        Self {
            transport,
            cache,
            config,
        }
    }

    pub fn cache(&self) -> &Arc<PriceCache> {
        &self.cache
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// First-page URL for a filter
    pub fn query_url(&self, filter: &str) -> String {
        let mut url = format!(
            "{}?api-version={}&$filter={}",
            self.config.endpoint,
            urlencoding::encode(&self.config.api_version),
            urlencoding::encode(filter)
        );
        if let Some(currency) = self.config.requested_currency() {
            url.push_str("&currencyCode=");
            url.push_str(&urlencoding::encode(&format!("'{}'", currency)));
        }
        url
    }

    /// Fetch all records for a filter. Errors are logged and yield an empty list.
    pub async fn fetch(&self, filter: &str) -> Arc<Vec<PriceRecord>> {
        match self.try_fetch(filter).await {
            Ok(records) => records,
            Err(e) if e.is_permanent() => {
                warn!(
                    filter = filter,
                    error = %e,
                    "Catalog rejected filter; it will not be retried"
                );
                Arc::new(Vec::new())
            }
            Err(e) => {
                error!(filter = filter, error = %e, kind = e.kind(), "Catalog query failed");
                Arc::new(Vec::new())
            }
        }
    }

    /// Fetch all records for a filter, surfacing the error of an uncached fetch.
    ///
    /// A filter already known to be rejected returns an empty list without I/O.
    pub async fn try_fetch(&self, filter: &str) -> CatalogResult<Arc<Vec<PriceRecord>>> {
        if self.cache.is_failed(filter).await {
            debug!(filter = filter, "Skipping previously rejected filter");
            CatalogMetrics::record_failed_filter_skip();
            return Ok(Arc::new(Vec::new()));
        }

        if let Some(records) = self.cache.get(filter).await {
            debug!(filter = filter, count = records.len(), "Catalog cache hit");
            CatalogMetrics::record_cache_hit();
            return Ok(records);
        }

        CatalogMetrics::record_cache_miss();

        match self.fetch_all_pages(filter).await {
            Ok(items) => {
                info!(filter = filter, count = items.len(), "Catalog query complete");
                Ok(self.cache.insert(filter, items).await)
            }
            Err(e) => {
                CatalogMetrics::record_fetch_error(e.kind());
                if e.is_permanent() {
                    self.cache.mark_failed(filter).await;
                }
                Err(e)
            }
        }
    }

    async fn fetch_all_pages(&self, filter: &str) -> CatalogResult<Vec<PriceRecord>> {
        let mut timer = FetchTimer::start();
        let url = self.query_url(filter);
        info!(url = %url, "Querying retail price catalog");

        let first = self.transport.get_page(&url).await?;
        CatalogMetrics::record_page_fetched(first.items.len());

        let mut items = first.items;
        let mut next_link = first.next_page_link.filter(|link| !link.is_empty());
        let mut pages = 1usize;

        while let Some(link) = next_link {
            if pages >= self.config.max_pages {
                warn!(
                    filter = filter,
                    pages = pages,
                    count = items.len(),
                    "Page limit reached, keeping items fetched so far"
                );
                break;
            }

            debug!(next_page = %link, "Following NextPageLink");
            // The filter was already accepted, so a later client error is not the filter's fault.
            let page = self
                .transport
                .get_page(&link)
                .await
                .map_err(|e| match e {
                    CatalogError::FilterRejected { status, message } => {
                        CatalogError::Status { status, message }
                    }
                    other => other,
                })?;
            CatalogMetrics::record_page_fetched(page.items.len());

            items.extend(page.items);
            next_link = page.next_page_link.filter(|link| !link.is_empty());
            pages += 1;
        }

        let elapsed_ms = timer.stop();
        debug!(
            filter = filter,
            pages = pages,
            count = items.len(),
            elapsed_ms,
            "Fetched all pages"
        );
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::Sequence;

    fn record(meter: &str, price: f64) -> PriceRecord {
        PriceRecord {
            retail_price: price,
            price_type: "Consumption".to_string(),
            unit_of_measure: "1 Hour".to_string(),
            meter_name: meter.to_string(),
            currency_code: "USD".to_string(),
            ..Default::default()
        }
    }

    fn page(items: Vec<PriceRecord>, next: Option<&str>) -> CatalogPage {
        CatalogPage {
            items,
            next_page_link: next.map(str::to_string),
        }
    }

    const FILTER: &str = "armRegionName eq 'westus3' and serviceName eq 'Virtual Network'";

    #[tokio::test]
    async fn test_second_fetch_is_served_from_cache() {
        let mut transport = MockCatalogTransport::new();
        transport
            .expect_get_page()
            .times(1)
            .returning(|_| Ok(page(vec![record("Static IP", 0.005)], None)));

        let client = CatalogClient::new(transport, CatalogConfig::default());

        let first = client.fetch(FILTER).await;
        let second = client.fetch(FILTER).await;

        assert_eq!(first.len(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(client.cache().len().await, 1);
    }

    #[tokio::test]
    async fn test_rejected_filter_is_never_retried() {
        let mut transport = MockCatalogTransport::new();
        transport
            .expect_get_page()
            .times(1)
            .returning(|_| Err(CatalogError::from_status(400, "Invalid OData parameters")));

        let client = CatalogClient::new(transport, CatalogConfig::default());

        let err = client.try_fetch(FILTER).await.unwrap_err();
        assert!(err.is_permanent());
        assert!(client.cache().is_failed(FILTER).await);

        assert!(client.fetch(FILTER).await.is_empty());
        assert!(client.try_fetch(FILTER).await.unwrap().is_empty());
        assert_eq!(client.cache().failed_count().await, 1);
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried_on_next_call() {
        let mut seq = Sequence::new();
        let mut transport = MockCatalogTransport::new();
        transport
            .expect_get_page()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(CatalogError::from_status(503, "Service Unavailable")));
        transport
            .expect_get_page()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(page(vec![record("Static IP", 0.005)], None)));

        let client = CatalogClient::new(transport, CatalogConfig::default());

        assert!(client.fetch(FILTER).await.is_empty());
        assert!(!client.cache().is_failed(FILTER).await);
        assert!(client.cache().is_empty().await);

        assert_eq!(client.fetch(FILTER).await.len(), 1);
    }

    #[tokio::test]
    async fn test_parse_failure_is_not_memoized() {
        let mut transport = MockCatalogTransport::new();
        transport
            .expect_get_page()
            .times(2)
            .returning(|_| Err(CatalogError::Parse("expected value at line 1".to_string())));

        let client = CatalogClient::new(transport, CatalogConfig::default());

        assert!(client.fetch(FILTER).await.is_empty());
        assert!(client.fetch(FILTER).await.is_empty());
        assert_eq!(client.cache().failed_count().await, 0);
    }

    #[tokio::test]
    async fn test_pagination_accumulates_all_pages() {
        let mut transport = MockCatalogTransport::new();
        transport
            .expect_get_page()
            .withf(|url: &str| url.contains("%24filter") || url.contains("$filter"))
            .times(1)
            .returning(|_| {
                Ok(page(
                    vec![record("A", 1.0), record("B", 2.0)],
                    Some("https://prices.example/next?$skip=100"),
                ))
            });
        transport
            .expect_get_page()
            .withf(|url: &str| url.ends_with("$skip=100"))
            .times(1)
            .returning(|_| {
                Ok(page(
                    vec![record("C", 3.0)],
                    Some("https://prices.example/next?$skip=200"),
                ))
            });
        transport
            .expect_get_page()
            .withf(|url: &str| url.ends_with("$skip=200"))
            .times(1)
            .returning(|_| Ok(page(vec![record("D", 4.0)], None)));

        let client = CatalogClient::new(transport, CatalogConfig::default());
        let records = client.fetch(FILTER).await;

        let meters: Vec<&str> = records.iter().map(|r| r.meter_name.as_str()).collect();
        assert_eq!(meters, vec!["A", "B", "C", "D"]);
    }

    #[tokio::test]
    async fn test_failure_on_later_page_is_transient() {
        let mut transport = MockCatalogTransport::new();
        transport
            .expect_get_page()
            .withf(|url: &str| !url.contains("skip"))
            .times(2)
            .returning(|_| {
                Ok(page(
                    vec![record("A", 1.0)],
                    Some("https://prices.example/next?$skip=100"),
                ))
            });
        transport
            .expect_get_page()
            .withf(|url: &str| url.contains("skip"))
            .times(2)
            .returning(|_| Err(CatalogError::from_status(400, "expired link")));

        let client = CatalogClient::new(transport, CatalogConfig::default());

        let err = client.try_fetch(FILTER).await.unwrap_err();
        assert!(!err.is_permanent());
        assert!(!client.cache().is_failed(FILTER).await);
        assert!(client.fetch(FILTER).await.is_empty());
    }

    #[tokio::test]
    async fn test_page_limit_keeps_partial_results() {
        let mut transport = MockCatalogTransport::new();
        transport
            .expect_get_page()
            .times(2)
            .returning(|_| Ok(page(vec![record("A", 1.0)], Some("https://prices.example/next"))));

        let config = CatalogConfig {
            max_pages: 2,
            ..CatalogConfig::default()
        };
        let client = CatalogClient::new(transport, config);

        assert_eq!(client.fetch(FILTER).await.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_result_is_cached() {
        let mut transport = MockCatalogTransport::new();
        transport
            .expect_get_page()
            .times(1)
            .returning(|_| Ok(page(Vec::new(), None)));

        let client = CatalogClient::new(transport, CatalogConfig::default());

        assert!(client.fetch(FILTER).await.is_empty());
        assert!(client.fetch(FILTER).await.is_empty());
    }

    #[tokio::test]
    async fn test_shared_cache_between_clients() {
        let cache = Arc::new(PriceCache::new());

        let mut first_transport = MockCatalogTransport::new();
        first_transport
            .expect_get_page()
            .times(1)
            .returning(|_| Ok(page(vec![record("A", 1.0)], None)));
        let mut second_transport = MockCatalogTransport::new();
        second_transport.expect_get_page().never();

        let first = CatalogClient::with_cache(
            first_transport,
            CatalogConfig::default(),
            Arc::clone(&cache),
        );
        let second = CatalogClient::with_cache(second_transport, CatalogConfig::default(), cache);

        first.fetch(FILTER).await;
        assert_eq!(second.fetch(FILTER).await.len(), 1);
    }

    #[test]
    fn test_query_url_encodes_filter_and_currency() {
        let client = CatalogClient::new(
            MockCatalogTransport::new(),
            CatalogConfig::default().with_currency("eur"),
        );
        let url = client.query_url("serviceName eq 'Storage'");

        assert!(
            url.starts_with("https://prices.azure.com/api/retail/prices?api-version=2023-01-01-preview")
        );
        assert!(url.contains("&$filter=serviceName%20eq%20%27Storage%27"));
        assert!(url.ends_with("&currencyCode=%27EUR%27"));
    }

    #[test]
    fn test_query_url_omits_default_currency() {
        let client = CatalogClient::new(MockCatalogTransport::new(), CatalogConfig::default());
        assert!(!client.query_url("x eq 'y'").contains("currencyCode"));
    }
}
