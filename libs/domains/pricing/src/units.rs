//! Converts a catalog price into a monthly figure based on its unit of measure.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use strum::Display;
use tracing::{debug, warn};

use crate::models::PriceRecord;

/// Billing hours in a month
pub const HOURS_PER_MONTH: f64 = 730.0;

/// "10 Hours", "1 hour", "100 Hours"
static HOUR_MULTIPLIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+(?:\.\d+)?)\s*hours?").unwrap());

/// What the monthly amount is a price *of*
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PriceBasis {
    /// Hourly meter extrapolated to a month
    Hourly,
    /// Per GB per month; callers multiply by size
    PerGbMonth,
    /// Fixed price per month
    Monthly,
    /// Unit not understood; the raw price is passed through
    Raw,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyPrice {
    pub amount: f64,
    pub display_unit: String,
    pub basis: PriceBasis,
}

impl MonthlyPrice {
    pub fn is_per_gb(&self) -> bool {
        self.basis == PriceBasis::PerGbMonth
    }
}

/// Monthly amount for a record, or `None` for a non-positive price.
pub fn to_monthly(record: &PriceRecord) -> Option<MonthlyPrice> {
    let price = record.retail_price;
    if !(price > 0.0) {
        return None;
    }

    let currency = &record.currency_code;
    let unit = record.unit_of_measure.to_lowercase();
    let compact_unit: String = unit.chars().filter(|c| !c.is_whitespace()).collect();

    if unit.contains("hour") {
        let multiplier = HOUR_MULTIPLIER
            .captures(&unit)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .unwrap_or(1.0);

        if multiplier > 0.0 {
            let amount = price / multiplier * HOURS_PER_MONTH;
            debug!(
                meter = %record.meter_name,
                hourly = price / multiplier,
                monthly = amount,
                "Extrapolated hourly price"
            );
            return Some(MonthlyPrice {
                amount,
                display_unit: format!("{} / Month", currency),
                basis: PriceBasis::Hourly,
            });
        }

        warn!(
            meter = %record.meter_name,
            unit = %record.unit_of_measure,
            "Zero hour multiplier, reporting raw price"
        );
        return Some(raw(record));
    }

    if compact_unit.contains("gb/month") || unit.trim() == "1 gb" || unit.trim() == "gb" {
        return Some(MonthlyPrice {
            amount: price,
            display_unit: format!("{} / GB / Month", currency),
            basis: PriceBasis::PerGbMonth,
        });
    }

    if unit.contains("month") {
        return Some(MonthlyPrice {
            amount: price,
            display_unit: format!("{} / Month", currency),
            basis: PriceBasis::Monthly,
        });
    }

    warn!(
        meter = %record.meter_name,
        unit = %record.unit_of_measure,
        price,
        "Cannot convert unit to monthly, reporting raw price"
    );
    Some(raw(record))
}

fn raw(record: &PriceRecord) -> MonthlyPrice {
    MonthlyPrice {
        amount: record.retail_price,
        display_unit: format!("{} / {}", record.currency_code, record.unit_of_measure),
        basis: PriceBasis::Raw,
    }
}
