//! Cached rate table with its fetch timestamp.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use exchange_rates::{CurrencyCode, RateTable};

/// Freshness window used when nothing else is configured.
pub const DEFAULT_FRESHNESS_WINDOW_SECS: i64 = 30 * 60;

/// Last-fetched table for one base currency.
///
/// Entries are replaced wholesale on refetch, never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub base: CurrencyCode,
    pub table: RateTable,
    pub fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(table: RateTable, fetched_at: DateTime<Utc>) -> Self {
        Self {
            base: table.base().clone(),
            table,
            fetched_at,
        }
    }

    /// Time elapsed since the fetch.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.fetched_at)
    }

    /// `now - fetched_at < window`.
    pub fn is_fresh(&self, now: DateTime<Utc>, window: Duration) -> bool {
        is_within_window(self.fetched_at, now, window)
    }
}

/// Freshness rule shared by the cache and its entries.
pub fn is_within_window(fetched_at: DateTime<Utc>, now: DateTime<Utc>, window: Duration) -> bool {
    now.signed_duration_since(fetched_at) < window
}

pub fn default_window() -> Duration {
    Duration::seconds(DEFAULT_FRESHNESS_WINDOW_SECS)
}
