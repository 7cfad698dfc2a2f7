//! Configuration loading from environment.

use std::env;

use chrono::Duration;
use converter_client::CurrencyLayerConfig;
use converter_hex::ConverterConfig;
use converter_types::CurrencyCode;
use converter_types::domain::cache::DEFAULT_FRESHNESS_WINDOW_SECS;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/rates.db?mode=rwc";

/// Application configuration.
#[derive(Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub access_key: String,
    pub base_url: String,
    pub pivot: CurrencyCode,
    pub window: Duration,
    pub otel_enabled: bool,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()?;

        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let access_key = lookup("CURRENCYLAYER_ACCESS_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!("CURRENCYLAYER_ACCESS_KEY environment variable is required")
            })?;

        let base_url = lookup("CURRENCYLAYER_BASE_URL")
            .unwrap_or_else(|| CurrencyLayerConfig::DEFAULT_BASE_URL.to_string());

        let pivot = match lookup("PIVOT_CURRENCY") {
            Some(code) => code
                .parse()
                .map_err(|e| anyhow::anyhow!("PIVOT_CURRENCY: {}", e))?,
            None => CurrencyCode::usd(),
        };

        let window_secs: i64 = match lookup("CACHE_WINDOW_SECS") {
            Some(secs) => secs.parse()?,
            None => DEFAULT_FRESHNESS_WINDOW_SECS,
        };
        if window_secs < 0 {
            anyhow::bail!("CACHE_WINDOW_SECS must not be negative");
        }
        let window = Duration::try_seconds(window_secs)
            .ok_or_else(|| anyhow::anyhow!("CACHE_WINDOW_SECS is out of range: {}", window_secs))?;

        let otel_enabled = lookup("OTEL_ENABLED")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            port,
            database_url,
            access_key,
            base_url,
            pivot,
            window,
            otel_enabled,
        })
    }

    pub fn currency_layer(&self) -> CurrencyLayerConfig {
        CurrencyLayerConfig::new(self.access_key.clone()).with_base_url(self.base_url.clone())
    }

    pub fn converter(&self) -> ConverterConfig {
        ConverterConfig {
            pivot: self.pivot.clone(),
            freshness_window: self.window,
        }
    }
}
