//! Sheets data source error types.

/// Errors loading or parsing the pricing spreadsheet.
#[derive(Debug, thiserror::Error)]
pub enum SheetsError {
    /// Neither a snapshot nor spreadsheet credentials were configured
    #[error("pricing source not configured: {0}")]
    NotConfigured(String),

    /// HTTP request failed (network error, timeout, etc.). Never carries the
    /// request URL, which holds the API key.
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    /// Sheets API returned an error status code
    #[error("Sheets API returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read pricing snapshot: {0}")]
    Io(#[from] std::io::Error),

    /// Rows that failed strict parsing, one message per problem
    #[error("invalid pricing data ({} problem(s))", .errors.len())]
    InvalidData { errors: Vec<String> },
}

impl From<reqwest::Error> for SheetsError {
    fn from(err: reqwest::Error) -> Self {
        SheetsError::Http(err.without_url())
    }
}

impl SheetsError {
    /// Stable identifier used in JSON error bodies.
    pub fn error_type(&self) -> &'static str {
        match self {
            SheetsError::NotConfigured(_) => "pricing_source_not_configured",
            SheetsError::Http(_) | SheetsError::Upstream { .. } => "pricing_source_unavailable",
            SheetsError::Json(_) | SheetsError::Io(_) => "pricing_source_unreadable",
            SheetsError::InvalidData { .. } => "invalid_pricing_data",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SheetsError::Upstream {
            status: 403,
            message: "API key not valid".to_string(),
        };
        assert_eq!(err.to_string(), "Sheets API returned 403: API key not valid");

        let err = SheetsError::InvalidData {
            errors: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(err.to_string(), "invalid pricing data (2 problem(s))");
        assert_eq!(err.error_type(), "invalid_pricing_data");
    }
}
