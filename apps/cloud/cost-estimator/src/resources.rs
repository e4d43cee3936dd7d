//! Resource descriptions accepted by the CLI and batch files

use domain_pricing::{CatalogTransport, CostEstimator, OsType};
use serde::{Deserialize, Serialize};

/// One resource to price. Batch files hold a JSON array of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResourceSpec {
    Disk {
        sku: String,
        size_gb: u32,
        #[serde(default)]
        location: Option<String>,
    },
    PublicIp {
        #[serde(default)]
        sku: Option<String>,
        #[serde(default)]
        tier: Option<String>,
        #[serde(default)]
        location: Option<String>,
    },
    Snapshot {
        size_gb: u32,
        #[serde(default)]
        source_sku: Option<String>,
        #[serde(default)]
        location: Option<String>,
    },
    AppServicePlan {
        tier: String,
        sku: String,
        #[serde(default)]
        location: Option<String>,
    },
    SqlDatabase {
        #[serde(default)]
        tier: Option<String>,
        #[serde(default)]
        sku: Option<String>,
        #[serde(default)]
        family: Option<String>,
        #[serde(default)]
        capacity: Option<u32>,
        #[serde(default)]
        location: Option<String>,
    },
    Vm {
        size: String,
        #[serde(default)]
        os: Option<String>,
        #[serde(default)]
        location: Option<String>,
    },
    AppGateway {
        sku: String,
        #[serde(default)]
        tier: Option<String>,
        #[serde(default)]
        capacity: Option<u32>,
        #[serde(default)]
        location: Option<String>,
    },
}

impl ResourceSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            ResourceSpec::Disk { .. } => "disk",
            ResourceSpec::PublicIp { .. } => "public_ip",
            ResourceSpec::Snapshot { .. } => "snapshot",
            ResourceSpec::AppServicePlan { .. } => "app_service_plan",
            ResourceSpec::SqlDatabase { .. } => "sql_database",
            ResourceSpec::Vm { .. } => "vm",
            ResourceSpec::AppGateway { .. } => "app_gateway",
        }
    }

    pub fn location(&self) -> Option<&str> {
        match self {
            ResourceSpec::Disk { location, .. }
            | ResourceSpec::PublicIp { location, .. }
            | ResourceSpec::Snapshot { location, .. }
            | ResourceSpec::AppServicePlan { location, .. }
            | ResourceSpec::SqlDatabase { location, .. }
            | ResourceSpec::Vm { location, .. }
            | ResourceSpec::AppGateway { location, .. } => location.as_deref(),
        }
    }
}

/// Output row
#[derive(Debug, Clone, Serialize)]
pub struct Estimate {
    pub resource: ResourceSpec,
    pub location: String,
    pub region: String,
    pub monthly_cost: f64,
    pub currency: String,
}

/// Unparseable OS names price as Linux
fn parse_os(os: Option<&str>) -> OsType {
    os.and_then(|o| o.parse().ok()).unwrap_or_default()
}

pub async fn estimate<T: CatalogTransport>(
    estimator: &CostEstimator<T>,
    spec: ResourceSpec,
    default_location: &str,
) -> Estimate {
    let location = spec
        .location()
        .filter(|l| !l.trim().is_empty())
        .unwrap_or(default_location)
        .to_string();

    let monthly_cost = match &spec {
        ResourceSpec::Disk { sku, size_gb, .. } => {
            estimator.disk_cost(sku, *size_gb, &location).await
        }
        ResourceSpec::PublicIp { sku, tier, .. } => {
            estimator
                .public_ip_cost(sku.as_deref(), tier.as_deref(), &location)
                .await
        }
        ResourceSpec::Snapshot {
            size_gb, source_sku, ..
        } => {
            estimator
                .snapshot_cost(*size_gb, &location, source_sku.as_deref())
                .await
        }
        ResourceSpec::AppServicePlan { tier, sku, .. } => {
            estimator.app_service_plan_cost(tier, sku, &location).await
        }
        ResourceSpec::SqlDatabase {
            tier,
            sku,
            family,
            capacity,
            ..
        } => {
            estimator
                .sql_database_cost(
                    tier.as_deref(),
                    sku.as_deref(),
                    family.as_deref(),
                    *capacity,
                    &location,
                )
                .await
        }
        ResourceSpec::Vm { size, os, .. } => {
            estimator
                .vm_compute_cost(size, parse_os(os.as_deref()), &location)
                .await
        }
        ResourceSpec::AppGateway {
            sku,
            tier,
            capacity,
            ..
        } => {
            let tier = tier.as_deref().unwrap_or(sku);
            estimator.app_gateway_cost(sku, tier, *capacity, &location).await
        }
    };

    Estimate {
        region: estimator.regions().normalize(&location),
        location,
        resource: spec,
        monthly_cost,
        currency: estimator.currency().to_string(),
    }
}
