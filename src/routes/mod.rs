//! HTTP router assembly

mod sheets;

use axum::{
    http::{header, Method},
    routing::get,
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::error::AppError;
use crate::pricing;
use crate::AppState;

/// Create the application router.
pub fn router(state: AppState) -> Router {
    // The website calls the quote API from the browser.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health))
        .route("/api/sheets", get(sheets::raw_values))
        .nest("/api/pricing", pricing::router())
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

async fn not_found() -> AppError {
    AppError::NotFound
}
