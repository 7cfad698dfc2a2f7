//! Remote rate service ports.
//!
//! Implementations can be HTTP clients, canned fixtures, etc.

use std::collections::BTreeSet;
use std::sync::Arc;

use exchange_rates::{CurrencyCode, RateTable};

use crate::domain::CurrencyCatalog;
use crate::error::RateError;

/// Port for fetching live rate tables.
#[async_trait::async_trait]
pub trait RateSource: Send + Sync + 'static {
    /// Fetches live rates for `base`, restricted to `targets`.
    ///
    /// An empty `targets` set asks for every currency the service knows.
    /// A single attempt is made; failures are returned as-is.
    async fn fetch(
        &self,
        base: &CurrencyCode,
        targets: &BTreeSet<CurrencyCode>,
    ) -> Result<RateTable, RateError>;
}

/// Port for the supported-currency list.
#[async_trait::async_trait]
pub trait CatalogSource: Send + Sync + 'static {
    async fn list_currencies(&self) -> Result<CurrencyCatalog, RateError>;
}

#[async_trait::async_trait]
impl<T: RateSource + ?Sized> RateSource for Arc<T> {
    async fn fetch(
        &self,
        base: &CurrencyCode,
        targets: &BTreeSet<CurrencyCode>,
    ) -> Result<RateTable, RateError> {
        (**self).fetch(base, targets).await
    }
}

#[async_trait::async_trait]
impl<T: CatalogSource + ?Sized> CatalogSource for Arc<T> {
    async fn list_currencies(&self) -> Result<CurrencyCatalog, RateError> {
        (**self).list_currencies().await
    }
}
