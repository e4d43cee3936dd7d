//! OData filter expressions for the retail price catalog.
//!
//! Filters are kept as data until they are rendered, so estimators can be tested
//! on the clauses they produce without any HTTP involved.

use std::fmt;

/// A single boolean clause over one catalog field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    /// `field eq 'value'`
    Eq { field: &'static str, value: String },
    /// `contains(field, 'value')`
    Contains { field: &'static str, value: String },
    /// `(a or b or ...)`
    AnyOf(Vec<Clause>),
}

impl Clause {
    pub fn eq(field: &'static str, value: impl Into<String>) -> Self {
        Clause::Eq {
            field,
            value: value.into(),
        }
    }

    pub fn contains(field: &'static str, value: impl Into<String>) -> Self {
        Clause::Contains {
            field,
            value: value.into(),
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Clause::Eq { field, value } => write!(f, "{} eq '{}'", field, escape(value)),
            Clause::Contains { field, value } => {
                write!(f, "contains({}, '{}')", field, escape(value))
            }
            Clause::AnyOf(clauses) => match clauses.as_slice() {
                [] => Ok(()),
                [single] => write!(f, "{}", single),
                many => {
                    let joined = many
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(" or ");
                    write!(f, "({})", joined)
                }
            },
        }
    }
}

/// Single quotes are doubled inside OData string literals
fn escape(value: &str) -> String {
    value.replace('\'', "''")
}

/// Conjunction of clauses; renders to the exact string used as the cache key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ODataFilter {
    clauses: Vec<Clause>,
}

impl ODataFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Standard prefix: region, service name and consumption pricing.
    pub fn for_service(arm_region: &str, service_name: &str) -> Self {
        Self::new()
            .eq("armRegionName", arm_region)
            .eq("serviceName", service_name)
            .eq("priceType", "Consumption")
    }

    pub fn eq(mut self, field: &'static str, value: impl Into<String>) -> Self {
        self.clauses.push(Clause::eq(field, value));
        self
    }

    pub fn contains(mut self, field: &'static str, value: impl Into<String>) -> Self {
        self.clauses.push(Clause::contains(field, value));
        self
    }

    /// Add a disjunction; an empty list adds nothing.
    pub fn any_of(mut self, clauses: Vec<Clause>) -> Self {
        if !clauses.is_empty() {
            self.clauses.push(Clause::AnyOf(clauses));
        }
        self
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn build(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ODataFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .clauses
            .iter()
            .map(ToString::to_string)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" and ");
        f.write_str(&rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_service_prefix() {
        let filter = ODataFilter::for_service("westus3", "Virtual Network");
        assert_eq!(
            filter.build(),
            "armRegionName eq 'westus3' and serviceName eq 'Virtual Network' and priceType eq 'Consumption'"
        );
    }

    #[test]
    fn test_contains_and_any_of() {
        let filter = ODataFilter::new()
            .contains("skuName", "Premium_LRS")
            .any_of(vec![
                Clause::contains("meterName", "DTU"),
                Clause::contains("productName", "DTU"),
            ]);
        assert_eq!(
            filter.build(),
            "contains(skuName, 'Premium_LRS') and (contains(meterName, 'DTU') or contains(productName, 'DTU'))"
        );
    }

    #[test]
    fn test_single_any_of_has_no_parentheses() {
        let filter = ODataFilter::new().any_of(vec![Clause::eq("skuName", "B1")]);
        assert_eq!(filter.build(), "skuName eq 'B1'");
    }

    #[test]
    fn test_empty_any_of_is_skipped() {
        let filter = ODataFilter::new().eq("serviceName", "Storage").any_of(Vec::new());
        assert_eq!(filter.clauses().len(), 1);
        assert_eq!(filter.build(), "serviceName eq 'Storage'");
    }

    #[test]
    fn test_quotes_are_escaped() {
        let filter = ODataFilter::new().eq("productName", "O'Brien's Disks");
        assert_eq!(filter.build(), "productName eq 'O''Brien''s Disks'");
    }
}
