//! Error handling for the application

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use serde_json::json;

use crate::pricing::responses::PricingErrorResponse;
use crate::pricing::PricingError;
use crate::sheets::SheetsError;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    /// Body or query string that could not be deserialized
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Sheets(#[from] SheetsError),

    /// One failed load reported to every caller that waited on it
    #[error(transparent)]
    Shared(Arc<AppError>),
}

impl AppError {
    /// The underlying error, looking through `Shared`.
    pub fn root(&self) -> &AppError {
        match self {
            AppError::Shared(inner) => inner.root(),
            other => other,
        }
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self.root() {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Pricing(e) => match e {
                PricingError::RouteNotFound { .. } | PricingError::VehicleNotFound { .. } => {
                    StatusCode::NOT_FOUND
                }
                PricingError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
                PricingError::InvalidConfiguration { .. } | PricingError::Overflow { .. } => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            AppError::Sheets(e) => match e {
                SheetsError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
                SheetsError::Http(_) | SheetsError::Upstream { .. } => StatusCode::BAD_GATEWAY,
                SheetsError::Json(_) | SheetsError::Io(_) | SheetsError::InvalidData { .. } => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            AppError::Shared(inner) => inner.status(),
        }
    }

    fn error_type(&self) -> &'static str {
        match self.root() {
            AppError::NotFound => "not_found",
            AppError::BadRequest(_) => "invalid_request",
            AppError::Pricing(e) => e.error_type(),
            AppError::Sheets(e) => e.error_type(),
            AppError::Shared(inner) => inner.error_type(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Server-side failures are logged in full; clients get a generic message.
        let (message, details) = if status.is_server_error() {
            tracing::error!("{}: {}", self.error_type(), self);
            let message = match self.root() {
                AppError::Sheets(SheetsError::Http(_) | SheetsError::Upstream { .. }) => {
                    "Pricing data source unavailable"
                }
                AppError::Sheets(SheetsError::NotConfigured(_)) => "Pricing data source not configured",
                AppError::Pricing(PricingError::Overflow { .. }) => "Quote is out of range",
                _ => "Pricing data is invalid",
            };
            (message.to_string(), None)
        } else {
            let details = match self.root() {
                AppError::Pricing(PricingError::RouteNotFound {
                    origin,
                    destination,
                }) => Some(json!({ "origin": origin, "destination": destination })),
                AppError::Pricing(PricingError::VehicleNotFound { category }) => {
                    Some(json!({ "category": category }))
                }
                _ => None,
            };
            (self.to_string(), details)
        };

        let body = PricingErrorResponse {
            error_type: self.error_type().to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pricing_error_statuses() {
        let err: AppError = PricingError::RouteNotFound {
            origin: "Atlantis".to_string(),
            destination: "Bariloche".to_string(),
        }
        .into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Route not found: Atlantis → Bariloche");

        let err: AppError = PricingError::InvalidRequest {
            message: "bad".to_string(),
        }
        .into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err: AppError = PricingError::InvalidConfiguration {
            message: "bad".to_string(),
            errors: vec![],
        }
        .into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_sheets_error_statuses() {
        let err: AppError = SheetsError::Upstream {
            status: 500,
            message: "boom".to_string(),
        }
        .into();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);

        let err: AppError = SheetsError::NotConfigured("nothing".to_string()).into();
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);

        let err: AppError = SheetsError::InvalidData { errors: vec![] }.into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_into_response_status() {
        let response = AppError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = AppError::BadRequest("missing field".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let err: AppError = PricingError::Overflow {
            origin: "Buenos Aires".to_string(),
            destination: "Bariloche".to_string(),
        }
        .into();
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_shared_error_keeps_inner_status_and_body() {
        let inner: AppError = PricingError::Overflow {
            origin: "Buenos Aires".to_string(),
            destination: "Bariloche".to_string(),
        }
        .into();
        let err = AppError::Shared(Arc::new(inner));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_type(), "calculation_overflow");
        assert!(matches!(err.root(), AppError::Pricing(PricingError::Overflow { .. })));
    }
}
