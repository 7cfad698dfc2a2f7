//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use converter_types::dto::{CacheStatus, ConversionResponse, RatesResponse};
use converter_types::{CurrencyCatalog, CurrencyCode};
use utoipa::OpenApi;

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

/// List supported currencies
#[utoipa::path(
    get,
    path = "/api/currencies",
    tag = "currencies",
    responses(
        (status = 200, description = "Currency code to display name", body = CurrencyCatalog),
        (status = 502, description = "Remote rate service failed")
    )
)]
async fn list_currencies() {}

/// Convert an amount into every known currency
#[utoipa::path(
    get,
    path = "/api/convert",
    tag = "conversion",
    params(
        ("from" = String, Query, description = "Source currency code", example = "EUR"),
        ("amount" = Option<String>, Query, description = "Amount to convert, spaces ignored (default 1)", example = "1 000")
    ),
    responses(
        (status = 200, description = "Converted amounts", body = ConversionResponse),
        (status = 400, description = "Invalid currency code or amount"),
        (status = 404, description = "No rate for the source currency"),
        (status = 502, description = "Remote rate service failed")
    )
)]
async fn convert() {}

/// Cross rates from one source currency
#[utoipa::path(
    get,
    path = "/api/rates",
    tag = "conversion",
    params(
        ("from" = String, Query, description = "Source currency code", example = "GBP")
    ),
    responses(
        (status = 200, description = "Unscaled cross rates", body = RatesResponse),
        (status = 404, description = "No rate for the source currency"),
        (status = 502, description = "Remote rate service failed")
    )
)]
async fn rates() {}

/// Cached pivot table status
#[utoipa::path(
    get,
    path = "/api/cache",
    tag = "cache",
    responses(
        (status = 200, description = "Cache status", body = CacheStatus)
    )
)]
async fn cache_status() {}

/// OpenAPI documentation for the Converter API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Currency Converter API",
        version = "1.0.0",
        description = "Converts an amount from one currency into every other known currency.\n\nRates are fetched for a single pivot currency, cached for a fixed freshness window, and cross rates are derived from that one table.",
        license(name = "MIT"),
    ),
    paths(health, list_currencies, convert, rates, cache_status),
    components(
        schemas(
            CurrencyCode,
            CurrencyCatalog,
            ConversionResponse,
            RatesResponse,
            CacheStatus,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "currencies", description = "Supported currency list"),
        (name = "conversion", description = "Conversion and cross rates"),
        (name = "cache", description = "Rate cache diagnostics"),
    )
)]
pub struct ApiDoc;
