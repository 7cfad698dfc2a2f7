//! Domain models for the currency converter.

pub mod cache;
pub mod catalog;

use std::collections::BTreeMap;

use exchange_rates::CurrencyCode;

pub use cache::CacheEntry;
pub use catalog::CurrencyCatalog;

/// One converted amount per target currency, ordered by code.
///
/// Computed fresh for every request and never persisted.
pub type ConversionResult = BTreeMap<CurrencyCode, f64>;
