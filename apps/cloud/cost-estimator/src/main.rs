//! Cost Estimator
//!
//! Estimates the monthly cost of individual cloud resources (disks, IPs,
//! snapshots, App Service plans, SQL databases, VMs, Application Gateways)
//! from the public retail price catalog.

use clap::{Parser, Subcommand};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_pricing::{CandidateScorer, CostEstimator};
use eyre::{Result, WrapErr};
use std::path::PathBuf;
use tracing::info;

mod config;
mod resources;

use config::Config;
use resources::{Estimate, ResourceSpec, estimate};

#[derive(Parser)]
#[command(name = "cost-estimator")]
#[command(about = "Estimate monthly cloud resource costs from the retail price catalog")]
struct Cli {
    /// Currency for prices (overrides PRICING_CURRENCY)
    #[arg(short, long, global = true)]
    currency: Option<String>,

    /// Region for resources that don't specify one (overrides PRICING_DEFAULT_LOCATION)
    #[arg(short, long, global = true)]
    location: Option<String>,

    /// Print Prometheus metrics to stderr when done
    #[arg(long, global = true)]
    print_metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Managed disk
    Disk {
        /// Disk SKU, e.g. Premium_LRS, StandardSSD_ZRS, Standard_LRS
        #[arg(long)]
        sku: String,
        #[arg(long)]
        size_gb: u32,
    },

    /// Static public IP address
    PublicIp {
        /// Basic or Standard (default Basic)
        #[arg(long)]
        sku: Option<String>,
        /// Regional or Global
        #[arg(long)]
        tier: Option<String>,
    },

    /// Managed disk snapshot
    Snapshot {
        #[arg(long)]
        size_gb: u32,
        /// SKU of the source disk
        #[arg(long)]
        source_sku: Option<String>,
    },

    /// App Service plan
    AppServicePlan {
        /// e.g. Basic, PremiumV2
        #[arg(long)]
        tier: String,
        /// e.g. B1, P1v2
        #[arg(long)]
        sku: String,
    },

    /// Azure SQL database (DTU or vCore)
    SqlDatabase {
        #[arg(long)]
        tier: Option<String>,
        #[arg(long)]
        sku: Option<String>,
        /// Hardware generation for vCore databases, e.g. Gen5
        #[arg(long)]
        family: Option<String>,
        /// DTUs or vCores
        #[arg(long)]
        capacity: Option<u32>,
    },

    /// Virtual machine compute
    Vm {
        /// e.g. Standard_D2s_v3
        #[arg(long)]
        size: String,
        /// linux or windows
        #[arg(long)]
        os: Option<String>,
    },

    /// Application Gateway
    AppGateway {
        /// e.g. Standard_Medium, WAF_v2
        #[arg(long)]
        sku: String,
        #[arg(long)]
        tier: Option<String>,
        /// Instance count (v1) or capacity units (v2)
        #[arg(long)]
        capacity: Option<u32>,
    },

    /// Estimate every resource in a JSON file
    Batch {
        /// Path to a JSON array of resources
        file: PathBuf,
    },
}

impl Commands {
    fn into_specs(self) -> Result<Vec<ResourceSpec>> {
        let spec = match self {
            Commands::Disk { sku, size_gb } => ResourceSpec::Disk {
                sku,
                size_gb,
                location: None,
            },
            Commands::PublicIp { sku, tier } => ResourceSpec::PublicIp {
                sku,
                tier,
                location: None,
            },
            Commands::Snapshot {
                size_gb,
                source_sku,
            } => ResourceSpec::Snapshot {
                size_gb,
                source_sku,
                location: None,
            },
            Commands::AppServicePlan { tier, sku } => ResourceSpec::AppServicePlan {
                tier,
                sku,
                location: None,
            },
            Commands::SqlDatabase {
                tier,
                sku,
                family,
                capacity,
            } => ResourceSpec::SqlDatabase {
                tier,
                sku,
                family,
                capacity,
                location: None,
            },
            Commands::Vm { size, os } => ResourceSpec::Vm {
                size,
                os,
                location: None,
            },
            Commands::AppGateway {
                sku,
                tier,
                capacity,
            } => ResourceSpec::AppGateway {
                sku,
                tier,
                capacity,
                location: None,
            },
            Commands::Batch { file } => {
                let raw = std::fs::read_to_string(&file)
                    .wrap_err_with(|| format!("Failed to read {}", file.display()))?;
                return serde_json::from_str(&raw)
                    .wrap_err_with(|| format!("Invalid resource list in {}", file.display()));
            }
        };
        Ok(vec![spec])
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();

    let cli = Cli::parse();

    let config = Config::from_env()?.with_currency(cli.currency.as_deref());
    init_tracing(&config.environment);

    // Initialize metrics
    observability::init_metrics();

    let default_location = cli
        .location
        .clone()
        .unwrap_or_else(|| config.default_location.clone());

    let estimator = CostEstimator::from_config(config.catalog.clone())
        .wrap_err("Failed to build catalog client")?
        .with_scorer(CandidateScorer::new(config.scoring));

    let specs = cli.command.into_specs()?;
    info!(count = specs.len(), currency = %estimator.currency(), "Estimating resources");

    let mut estimates: Vec<Estimate> = Vec::with_capacity(specs.len());
    for spec in specs {
        estimates.push(estimate(&estimator, spec, &default_location).await);
    }

    let total: f64 = estimates.iter().map(|e| e.monthly_cost).sum();
    info!(
        resources = estimates.len(),
        total = total,
        cached_filters = estimator.catalog().cache().len().await,
        rejected_filters = estimator.catalog().cache().failed_count().await,
        "Estimation complete"
    );

    let output = serde_json::json!({
        "currency": estimator.currency(),
        "total_monthly_cost": total,
        "estimates": estimates,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    if cli.print_metrics {
        eprintln!("{}", observability::render_metrics());
    }

    Ok(())
}
