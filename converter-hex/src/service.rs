//! Converter Application Service
//!
//! Orchestrates rate acquisition and cross-rate derivation through the ports.
//! Contains NO infrastructure logic - pure orchestration.

use chrono::{DateTime, Duration, Utc};
use tokio::sync::OnceCell;

use converter_types::domain::cache::default_window;
use converter_types::{
    AppError, CacheStatus, CatalogSource, ConversionResponse, CurrencyCatalog, CurrencyCode,
    KeyValueStore, RateSource, RateTable, RatesResponse,
};

use crate::cache::RateCache;
use crate::provider::RateProvider;

/// Pivot and freshness policy.
#[derive(Debug, Clone)]
pub struct ConverterConfig {
    /// Currency every fetched table is quoted against
    pub pivot: CurrencyCode,
    /// Maximum age of a cached table
    pub freshness_window: Duration,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            pivot: CurrencyCode::usd(),
            freshness_window: default_window(),
        }
    }
}

/// Parses user-typed amounts. Spaces are ignored (`"1 000"` is 1000).
pub fn parse_amount(input: &str) -> Result<f64, AppError> {
    let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return Err(AppError::BadRequest("Amount is required".into()));
    }

    match cleaned.parse::<f64>() {
        Ok(amount) if amount.is_finite() => Ok(amount),
        _ => Err(AppError::BadRequest(format!("Invalid amount: {}", input))),
    }
}

/// Application service for currency conversion.
///
/// Generic over the store, rate source and catalog source - adapters are
/// injected at compile time. Every table is fetched for the pivot and cached
/// under it, so switching source currency never costs a network call while
/// the cached table is fresh.
pub struct ConverterService<S, R, C>
where
    S: KeyValueStore,
    R: RateSource,
    C: CatalogSource,
{
    provider: RateProvider<S, R>,
    catalog: C,
    pivot: CurrencyCode,
    targets_primed: OnceCell<()>,
}

impl<S, R, C> ConverterService<S, R, C>
where
    S: KeyValueStore,
    R: RateSource,
    C: CatalogSource,
{
    /// Creates a new service from its adapters.
    pub fn new(store: S, rates: R, catalog: C, config: ConverterConfig) -> Self {
        Self {
            provider: RateProvider::new(RateCache::new(store), rates, config.freshness_window),
            catalog,
            pivot: config.pivot,
            targets_primed: OnceCell::new(),
        }
    }

    pub fn provider(&self) -> &RateProvider<S, R> {
        &self.provider
    }

    pub fn catalog_source(&self) -> &C {
        &self.catalog
    }

    pub fn pivot(&self) -> &CurrencyCode {
        &self.pivot
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Catalog
    // ─────────────────────────────────────────────────────────────────────────────

    /// Supported currencies. Always a fresh remote call; the result also
    /// becomes the target set for later rate fetches.
    #[tracing::instrument(skip(self))]
    pub async fn list_currencies(&self) -> Result<CurrencyCatalog, AppError> {
        let catalog = self.catalog.list_currencies().await?;
        self.provider.set_known_targets(catalog.codes()).await;
        Ok(catalog)
    }

    /// Loads the target set once. A failed load is logged and retried on
    /// the next request; the fetch then proceeds with an empty set.
    async fn prime_targets(&self) {
        let primed = self
            .targets_primed
            .get_or_try_init(|| async { self.list_currencies().await.map(|_| ()) })
            .await;

        if let Err(e) = primed {
            tracing::warn!("Currency list unavailable, requesting all rates: {}", e);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Rates & Conversion
    // ─────────────────────────────────────────────────────────────────────────────

    /// Pivot rate table as of `now`. The catalog is only consulted when the
    /// cached table is stale, so a fresh cache never touches the network.
    pub async fn base_rates_at(&self, now: DateTime<Utc>) -> Result<RateTable, AppError> {
        let fresh = self
            .provider
            .cache()
            .is_fresh(&self.pivot, now, self.provider.window())
            .await?;
        if !fresh {
            self.prime_targets().await;
        }

        self.provider
            .get_base_rates(&self.pivot, now)
            .await
            .map_err(Into::into)
    }

    /// Unscaled `source → t` rates for every known currency.
    #[tracing::instrument(skip(self, source), fields(source = %source))]
    pub async fn rates_for(&self, source: &CurrencyCode) -> Result<RatesResponse, AppError> {
        let table = self.base_rates_at(Utc::now()).await?;
        let rates = exchange_rates::convert(&table, source)?;

        Ok(RatesResponse {
            source: source.clone(),
            base: table.base().clone(),
            rates,
        })
    }

    /// `amount` of `source` expressed in every known currency.
    #[tracing::instrument(skip(self, source), fields(source = %source))]
    pub async fn get_converted_amounts(
        &self,
        source: &CurrencyCode,
        amount: f64,
    ) -> Result<ConversionResponse, AppError> {
        if !amount.is_finite() {
            return Err(AppError::BadRequest(format!("Invalid amount: {}", amount)));
        }

        let table = self.base_rates_at(Utc::now()).await?;
        let amounts = exchange_rates::convert_amount(&table, source, amount)?;

        Ok(ConversionResponse {
            source: source.clone(),
            amount,
            base: table.base().clone(),
            amounts,
        })
    }

    /// Same as [`Self::get_converted_amounts`], taking the amount as typed.
    pub async fn convert_input(
        &self,
        source: &CurrencyCode,
        amount: &str,
    ) -> Result<ConversionResponse, AppError> {
        let amount = parse_amount(amount)?;
        self.get_converted_amounts(source, amount).await
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Cache Maintenance
    // ─────────────────────────────────────────────────────────────────────────────

    /// Cached table status for the pivot.
    pub async fn cache_status(&self) -> Result<CacheStatus, AppError> {
        self.provider
            .cache()
            .status(&self.pivot, Utc::now(), self.provider.window())
            .await
            .map_err(Into::into)
    }

    /// Drops the cached pivot table so the next request refetches.
    pub async fn clear_cache(&self) -> Result<(), AppError> {
        self.provider
            .cache()
            .clear(&self.pivot)
            .await
            .map_err(Into::into)
    }
}
