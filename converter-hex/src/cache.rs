//! Durable rate cache.
//!
//! Each base currency owns two keys in the backing store: the serialized
//! rate table and its fetch timestamp. They are written separately, table
//! first, so an interrupted write leaves the entry looking stale rather than
//! pairing an old table with a new timestamp.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use converter_types::domain::cache::is_within_window;
use converter_types::{CacheEntry, CacheStatus, CurrencyCode, KeyValueStore, RateError, RateTable};

const RATES_KEY_PREFIX: &str = "exchange_rates:";
const FETCHED_AT_KEY_PREFIX: &str = "fetched_at:";

fn rates_key(base: &CurrencyCode) -> String {
    format!("{}{}", RATES_KEY_PREFIX, base)
}

fn fetched_at_key(base: &CurrencyCode) -> String {
    format!("{}{}", FETCHED_AT_KEY_PREFIX, base)
}

/// Last-fetched rate table per base currency, on top of a key-value store.
///
/// Staleness is checked lazily at read time; nothing is evicted except by
/// overwrite or an explicit [`RateCache::clear`].
pub struct RateCache<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> RateCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fetch time of the cached table. An unreadable timestamp counts as
    /// absent.
    pub async fn fetched_at(&self, base: &CurrencyCode) -> Result<Option<DateTime<Utc>>, RateError> {
        let Some(raw) = self.store.get(&fetched_at_key(base)).await? else {
            return Ok(None);
        };

        match DateTime::parse_from_rfc3339(&raw) {
            Ok(ts) => Ok(Some(ts.with_timezone(&Utc))),
            Err(e) => {
                warn!(base = %base, "Ignoring unreadable cache timestamp {:?}: {}", raw, e);
                Ok(None)
            }
        }
    }

    /// True iff an entry exists for `base` and `now - fetched_at < window`.
    pub async fn is_fresh(
        &self,
        base: &CurrencyCode,
        now: DateTime<Utc>,
        window: Duration,
    ) -> Result<bool, RateError> {
        Ok(self
            .fetched_at(base)
            .await?
            .is_some_and(|fetched_at| is_within_window(fetched_at, now, window)))
    }

    /// Cached table for `base`, regardless of freshness.
    pub async fn get(&self, base: &CurrencyCode) -> Result<Option<RateTable>, RateError> {
        let Some(raw) = self.store.get(&rates_key(base)).await? else {
            debug!(base = %base, "No cached rates");
            return Ok(None);
        };

        let table: RateTable =
            serde_json::from_str(&raw).map_err(|e| RateError::CacheDecode(e.to_string()))?;

        if table.base() != base {
            return Err(RateError::CacheDecode(format!(
                "entry for {} holds rates quoted against {}",
                base,
                table.base()
            )));
        }

        Ok(Some(table))
    }

    /// Table and timestamp together, when both are present.
    pub async fn entry(&self, base: &CurrencyCode) -> Result<Option<CacheEntry>, RateError> {
        let Some(fetched_at) = self.fetched_at(base).await? else {
            return Ok(None);
        };
        Ok(self
            .get(base)
            .await?
            .map(|table| CacheEntry::new(table, fetched_at)))
    }

    /// Replaces any entry for `base`.
    pub async fn put(
        &self,
        base: &CurrencyCode,
        table: &RateTable,
        fetched_at: DateTime<Utc>,
    ) -> Result<(), RateError> {
        let json = serde_json::to_string(table).map_err(|e| RateError::CacheDecode(e.to_string()))?;

        self.store.set(&rates_key(base), &json).await?;
        self.store
            .set(&fetched_at_key(base), &fetched_at.to_rfc3339())
            .await?;

        debug!(base = %base, rates = table.len(), "Cached rates");
        Ok(())
    }

    /// Removes the entry for `base`, timestamp first.
    pub async fn clear(&self, base: &CurrencyCode) -> Result<(), RateError> {
        self.store.remove(&fetched_at_key(base)).await?;
        self.store.remove(&rates_key(base)).await?;
        Ok(())
    }

    /// Snapshot for diagnostics. An unreadable table is reported as holding
    /// no rates.
    pub async fn status(
        &self,
        base: &CurrencyCode,
        now: DateTime<Utc>,
        window: Duration,
    ) -> Result<CacheStatus, RateError> {
        let fetched_at = self.fetched_at(base).await?;
        let rates = match self.get(base).await {
            Ok(table) => table.map(|t| t.len()).unwrap_or(0),
            Err(RateError::CacheDecode(reason)) => {
                warn!(base = %base, "Cached rates are unreadable: {}", reason);
                0
            }
            Err(e) => return Err(e),
        };

        Ok(CacheStatus {
            base: base.clone(),
            fetched_at,
            fresh: fetched_at.is_some_and(|ts| is_within_window(ts, now, window)),
            rates,
        })
    }
}
