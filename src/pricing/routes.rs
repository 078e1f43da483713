//! Pricing API route handlers

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::error::Result;
use crate::extract::{ApiJson, ApiQuery};
use crate::AppState;

use super::models::VehicleLine;
use super::requests::{DestinationsQuery, MultiVehicleQuoteRequest, QuoteRequest};
use super::responses::{
    DestinationsResponse, OriginsResponse, PricingMetaResponse, QuoteResponse, VehiclesResponse,
};

/// Pricing routes, mounted under `/api/pricing`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/origins", get(origins))
        .route("/destinations", get(destinations))
        .route("/vehicles", get(vehicles))
        .route("/meta", get(meta))
        .route("/quote", post(quote))
        .route("/quote/multi", post(quote_multiple_vehicles))
}

/// Every city with at least one route
async fn origins(State(state): State<AppState>) -> Result<Json<OriginsResponse>> {
    let pricing = state.pricing().await?;
    Ok(Json(OriginsResponse {
        origins: pricing.calculator.origins(),
    }))
}

/// Cities reachable from `?origin=`
async fn destinations(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<DestinationsQuery>,
) -> Result<Json<DestinationsResponse>> {
    let pricing = state.pricing().await?;
    let destinations = pricing.calculator.destinations_for_origin(&query.origin);
    Ok(Json(DestinationsResponse {
        origin: query.origin.trim().to_string(),
        destinations,
    }))
}

async fn vehicles(State(state): State<AppState>) -> Result<Json<VehiclesResponse>> {
    let pricing = state.pricing().await?;
    Ok(Json(VehiclesResponse {
        categories: pricing.calculator.vehicle_categories(),
    }))
}

/// Last-updated stamp and size of the loaded tables
async fn meta(State(state): State<AppState>) -> Result<Json<PricingMetaResponse>> {
    let pricing = state.pricing().await?;
    let calculator = &pricing.calculator;
    Ok(Json(PricingMetaResponse {
        last_updated: calculator.last_updated().to_string(),
        loaded_at: pricing.loaded_at,
        route_count: calculator.routes().len(),
        vehicle_count: calculator.vehicles().len(),
        currency: state.config.currency.clone(),
        cache: state.cache.stats(),
    }))
}

/// Quote a single vehicle category
async fn quote(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<QuoteRequest>,
) -> Result<Json<QuoteResponse>> {
    let pricing = state.pricing().await?;
    let result = pricing.calculator.calculate_quote(
        &req.origin,
        &req.destination,
        &req.vehicle_category,
        req.quantity,
        req.waiting_days,
        req.include_insurance,
    )?;
    Ok(Json(QuoteResponse::from_result(&result, &state.config.currency)))
}

/// Quote several vehicle categories on one trip
async fn quote_multiple_vehicles(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<MultiVehicleQuoteRequest>,
) -> Result<Json<QuoteResponse>> {
    let pricing = state.pricing().await?;
    let lines: Vec<VehicleLine> = req.vehicles.into_iter().map(Into::into).collect();
    let result = pricing.calculator.calculate_quote_multiple_vehicles(
        &req.origin,
        &req.destination,
        &lines,
        req.waiting_days,
        req.include_insurance,
    )?;
    Ok(Json(QuoteResponse::from_result(&result, &state.config.currency)))
}
