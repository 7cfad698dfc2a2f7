//! Rate Provider
//!
//! Serves base-currency rate tables from the cache while they are fresh and
//! from the remote source otherwise.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use converter_types::{CurrencyCode, KeyValueStore, RateError, RateSource, RateTable};

use crate::cache::RateCache;

/// Cache-first access to base-currency rate tables.
///
/// Overlapping requests for the same stale base are not coalesced: each may
/// hit the remote source and the last cache write wins.
pub struct RateProvider<S: KeyValueStore, R: RateSource> {
    cache: RateCache<S>,
    source: R,
    window: Duration,
    known_targets: RwLock<BTreeSet<CurrencyCode>>,
}

impl<S: KeyValueStore, R: RateSource> RateProvider<S, R> {
    pub fn new(cache: RateCache<S>, source: R, window: Duration) -> Self {
        Self {
            cache,
            source,
            window,
            known_targets: RwLock::new(BTreeSet::new()),
        }
    }

    pub fn cache(&self) -> &RateCache<S> {
        &self.cache
    }

    pub fn source(&self) -> &R {
        &self.source
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Currencies requested from the remote source. Empty means "all".
    pub async fn set_known_targets(&self, targets: BTreeSet<CurrencyCode>) {
        *self.known_targets.write().await = targets;
    }

    pub async fn known_targets(&self) -> BTreeSet<CurrencyCode> {
        self.known_targets.read().await.clone()
    }

    /// Rate table for `base` as of `now`.
    ///
    /// A fresh, readable cache entry is returned without touching the
    /// remote source. Otherwise exactly one fetch is issued; on success the
    /// cache is overwritten, on failure the error is returned and the cache
    /// is left as it was. A corrupt cached table is logged and refetched. A
    /// failed cache write fails the request with [`RateError::Storage`].
    #[tracing::instrument(skip(self, base), fields(base = %base))]
    pub async fn get_base_rates(
        &self,
        base: &CurrencyCode,
        now: DateTime<Utc>,
    ) -> Result<RateTable, RateError> {
        if self.cache.is_fresh(base, now, self.window).await? {
            match self.cache.get(base).await {
                Ok(Some(table)) => {
                    debug!("Cache hit");
                    return Ok(table);
                }
                Ok(None) => debug!("Timestamp present without a cached table"),
                Err(RateError::CacheDecode(reason)) => {
                    warn!("Discarding unreadable cached rates: {}", reason);
                }
                Err(e) => return Err(e),
            }
        } else {
            debug!("Cache miss or stale entry");
        }

        let targets = self.known_targets().await;
        let table = self.source.fetch(base, &targets).await?;

        self.cache.put(base, &table, now).await?;
        info!(rates = table.len(), "Stored fresh rates");

        Ok(table)
    }
}
