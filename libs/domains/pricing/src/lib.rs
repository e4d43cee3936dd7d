//! Pricing Domain
//!
//! Monthly cost estimation for individual cloud resources, backed by the
//! public retail price catalog.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │  Estimators  │  ← Per-resource filters, criteria and scaling
//! └──────┬───────┘
//!        │
//! ┌──────▼───────┐
//! │   Catalog    │  ← Paginated fetch, per-filter cache, rejected-filter memo
//! └──────┬───────┘
//!        │
//! ┌──────▼───────┐
//! │ Scorer/Units │  ← Best-candidate selection, monthly normalization
//! └──────────────┘
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod estimators;
pub mod filter;
pub mod models;
pub mod region;
pub mod scorer;
pub mod units;

// Re-export commonly used types
pub use catalog::{CatalogClient, CatalogTransport, HttpTransport, PriceCache};
pub use config::CatalogConfig;
pub use error::{CatalogError, CatalogResult};
pub use estimators::{CostEstimator, DiskKind, PublicIpSku, SqlPricingModel, VmSize};
pub use filter::{Clause, ODataFilter};
pub use models::{CatalogPage, OsType, PriceRecord, PriceType, Redundancy};
pub use region::{Region, RegionNormalizer};
pub use scorer::{CandidateScorer, MatchCriteria, ScoredCandidate, ScoringWeights, select_best};
pub use units::{HOURS_PER_MONTH, MonthlyPrice, PriceBasis, to_monthly};
