use thiserror::Error;

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur while talking to the retail price catalog.
///
/// "No matching price" is not an error: the scorer returns `None`
/// and estimators surface it as an unknown (zero) cost.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The service rejected the filter expression itself (e.g. malformed OData).
    #[error("Catalog rejected filter (HTTP {status}): {message}")]
    FilterRejected { status: u16, message: String },

    /// Non-success status that may succeed on a later attempt (5xx, 408, 429).
    #[error("Catalog returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// Connection failure, timeout, or other transport problem
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not a valid catalog page
    #[error("Failed to parse catalog response: {0}")]
    Parse(String),
}

impl CatalogError {
    /// Whether the same filter should never be sent again in this process.
    pub fn is_permanent(&self) -> bool {
        matches!(self, CatalogError::FilterRejected { .. })
    }

    /// Stable label used for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            CatalogError::FilterRejected { .. } => "filter_rejected",
            CatalogError::Status { .. } => "status",
            CatalogError::Http(_) => "transport",
            CatalogError::Parse(_) => "parse",
        }
    }

    /// Classify a non-success HTTP status.
    ///
    /// Client errors mean the filter is bad, except request timeout and rate
    /// limiting which are transient.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            408 | 429 => CatalogError::Status { status, message },
            400..=499 => CatalogError::FilterRejected { status, message },
            _ => CatalogError::Status { status, message },
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_classification() {
        assert!(CatalogError::from_status(400, "bad filter").is_permanent());
        assert!(CatalogError::from_status(404, "nope").is_permanent());
        assert!(!CatalogError::from_status(408, "timeout").is_permanent());
        assert!(!CatalogError::from_status(429, "slow down").is_permanent());
        assert!(!CatalogError::from_status(500, "boom").is_permanent());
        assert!(!CatalogError::from_status(503, "unavailable").is_permanent());
    }

    #[test]
    fn test_parse_error_from_serde() {
        let err: CatalogError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), "parse");
        assert!(!err.is_permanent());
    }
}
