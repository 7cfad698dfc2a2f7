//! Data Transfer Objects (DTOs) for requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use exchange_rates::CurrencyCode;

use crate::domain::ConversionResult;

// ─────────────────────────────────────────────────────────────────────────────
// Conversion DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Query for converting an amount from one currency into all others.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConvertQuery {
    /// Source currency
    #[serde(default = "default_source")]
    pub from: CurrencyCode,
    /// Amount to convert; spaces are ignored. Defaults to 1.
    #[schema(example = "1 000")]
    pub amount: Option<String>,
}

/// Query for unscaled cross rates.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RatesQuery {
    #[serde(default = "default_source")]
    pub from: CurrencyCode,
}

fn default_source() -> CurrencyCode {
    CurrencyCode::usd()
}

/// Converted amounts for every known currency.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConversionResponse {
    pub source: CurrencyCode,
    #[schema(example = 10.0)]
    pub amount: f64,
    /// Pivot the underlying rate table is quoted against
    pub base: CurrencyCode,
    /// Amount per target currency, ordered by code
    #[schema(value_type = std::collections::BTreeMap<String, f64>)]
    pub amounts: ConversionResult,
}

/// Cross rates from one source currency.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RatesResponse {
    pub source: CurrencyCode,
    pub base: CurrencyCode,
    #[schema(value_type = std::collections::BTreeMap<String, f64>)]
    pub rates: ConversionResult,
}

// ─────────────────────────────────────────────────────────────────────────────
// Cache DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Snapshot of the cached table for one base.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CacheStatus {
    pub base: CurrencyCode,
    /// When the cached table was fetched, if any
    pub fetched_at: Option<DateTime<Utc>>,
    pub fresh: bool,
    /// Number of rates in the cached table
    pub rates: usize,
}
