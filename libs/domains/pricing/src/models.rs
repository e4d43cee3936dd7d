use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Catalog price type
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default, Hash,
)]
#[strum(ascii_case_insensitive)]
pub enum PriceType {
    #[default]
    Consumption,
    Reservation,
    DevTestConsumption,
}

/// One entry of the retail price catalog.
///
/// Field names follow the catalog's JSON. Everything except the price is
/// free text and may be absent; absent strings deserialize as empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PriceRecord {
    pub retail_price: f64,
    /// The catalog calls this field `type`; some tooling exports it as `priceType`.
    #[serde(rename = "type", alias = "priceType")]
    pub price_type: String,
    pub unit_of_measure: String,
    pub meter_name: String,
    pub sku_name: String,
    pub product_name: String,
    pub arm_region_name: String,
    #[serde(default = "default_currency")]
    pub currency_code: String,
    pub service_name: String,
    pub arm_sku_name: Option<String>,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl PriceRecord {
    /// Short label for log lines
    pub fn label(&self) -> String {
        let arm_sku = self.arm_sku_name.as_deref().unwrap_or("-");
        format!(
            "{}/{} | {} | {} [{}] | {} ({} {} per {})",
            self.service_name,
            self.product_name,
            self.sku_name,
            arm_sku,
            self.arm_region_name,
            self.meter_name,
            self.retail_price,
            self.currency_code,
            self.unit_of_measure
        )
    }
}

/// One page of the catalog response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogPage {
    #[serde(rename = "Items", default)]
    pub items: Vec<PriceRecord>,
    #[serde(rename = "NextPageLink", default)]
    pub next_page_link: Option<String>,
}

/// Storage redundancy of a disk or snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Redundancy {
    Lrs,
    Zrs,
}

impl Redundancy {
    /// ZRS when the SKU string says so, LRS otherwise
    pub fn from_sku(sku: &str) -> Self {
        if sku.to_lowercase().contains("zrs") {
            Redundancy::Zrs
        } else {
            Redundancy::Lrs
        }
    }
}

/// Operating system a VM is billed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Default)]
#[strum(ascii_case_insensitive)]
pub enum OsType {
    #[default]
    Linux,
    Windows,
}
