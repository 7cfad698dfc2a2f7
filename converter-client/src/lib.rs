//! # Live Rate Client
//!
//! A typed Rust client for the currencylayer-style live rate API.
//!
//! Two endpoints are consumed:
//! - `GET /list?access_key=..` - supported currencies and display names
//! - `GET /live?access_key=..&currencies=..&source=..&format=1` - live quotes
//!   keyed by pair code (`"USDEUR"`)

use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use converter_types::{
    CatalogSource, CurrencyCatalog, CurrencyCode, RateError, RateSource, RateTable,
};

/// Connection settings for the remote rate service.
#[derive(Debug, Clone)]
pub struct CurrencyLayerConfig {
    pub base_url: String,
    pub access_key: String,
}

impl CurrencyLayerConfig {
    pub const DEFAULT_BASE_URL: &'static str = "http://api.currencylayer.com";

    pub fn new(access_key: impl Into<String>) -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            access_key: access_key.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire Format
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<i64>,
    info: String,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    success: bool,
    #[serde(default)]
    currencies: Option<HashMap<String, String>>,
    #[serde(default)]
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct LiveResponse {
    success: bool,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    quotes: Option<HashMap<String, f64>>,
    #[serde(default)]
    error: Option<ErrorBody>,
}

fn api_failure(error: Option<ErrorBody>) -> RateError {
    match error {
        Some(body) => {
            tracing::warn!(code = ?body.code, "Rate service rejected request: {}", body.info);
            RateError::Api(body.info)
        }
        None => RateError::Api("The rate service reported an unsuccessful request".into()),
    }
}

/// Decodes a `/live` payload into a table quoted against `base`.
pub fn parse_live_response(base: &CurrencyCode, body: &str) -> Result<RateTable, RateError> {
    let resp: LiveResponse =
        serde_json::from_str(body).map_err(|e| RateError::Decode(e.to_string()))?;

    if resp.error.is_some() || !resp.success {
        return Err(api_failure(resp.error));
    }

    if let Some(source) = &resp.source {
        if source != base.as_str() {
            return Err(RateError::Decode(format!(
                "quotes are for {}, expected {}",
                source, base
            )));
        }
    }

    let quotes = resp
        .quotes
        .ok_or_else(|| RateError::Decode("missing field `quotes`".into()))?;

    RateTable::from_quotes(base.clone(), quotes).map_err(|e| RateError::Decode(e.to_string()))
}

/// Decodes a `/list` payload. Entries whose key is not a currency code are
/// skipped.
pub fn parse_list_response(body: &str) -> Result<CurrencyCatalog, RateError> {
    let resp: ListResponse =
        serde_json::from_str(body).map_err(|e| RateError::Decode(e.to_string()))?;

    if resp.error.is_some() || !resp.success {
        return Err(api_failure(resp.error));
    }

    let currencies = resp
        .currencies
        .ok_or_else(|| RateError::Decode("missing field `currencies`".into()))?;

    let mut catalog = BTreeMap::new();
    for (code, name) in currencies {
        match code.parse::<CurrencyCode>() {
            Ok(code) => {
                catalog.insert(code, name);
            }
            Err(_) => tracing::warn!("Skipping unrecognised currency code {:?}", code),
        }
    }

    Ok(CurrencyCatalog::new(catalog))
}

// ─────────────────────────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────────────────────────

/// Live rate API client.
pub struct CurrencyLayerClient {
    base_url: String,
    access_key: String,
    http: Client,
}

impl CurrencyLayerClient {
    /// Creates a new client.
    pub fn new(config: CurrencyLayerConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_key: config.access_key,
            http: Client::new(),
        }
    }

    /// Builds `<base_url>/<path>?access_key=..` plus `params`.
    fn url(&self, path: &str, params: &[(&str, String)]) -> Result<Url, RateError> {
        let mut url = Url::parse(&format!("{}/{}", self.base_url, path))
            .map_err(|e| RateError::Network(format!("invalid endpoint: {}", e)))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("access_key", &self.access_key);
            for (name, value) in params {
                query.append_pair(name, value);
            }
        }
        Ok(url)
    }

    fn live_url(
        &self,
        base: &CurrencyCode,
        targets: &BTreeSet<CurrencyCode>,
    ) -> Result<Url, RateError> {
        let mut params = Vec::with_capacity(3);
        if !targets.is_empty() {
            let currencies = targets
                .iter()
                .map(CurrencyCode::as_str)
                .collect::<Vec<_>>()
                .join(",");
            params.push(("currencies", currencies));
        }
        params.push(("source", base.to_string()));
        params.push(("format", "1".to_string()));
        self.url("live", &params)
    }

    async fn get_text(&self, url: Url) -> Result<String, RateError> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| RateError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RateError::Api(format!("HTTP {}", status)));
        }

        resp.text()
            .await
            .map_err(|e| RateError::Network(e.to_string()))
    }
}

#[async_trait]
impl RateSource for CurrencyLayerClient {
    #[tracing::instrument(skip(self, targets), fields(targets = targets.len()))]
    async fn fetch(
        &self,
        base: &CurrencyCode,
        targets: &BTreeSet<CurrencyCode>,
    ) -> Result<RateTable, RateError> {
        let url = self.live_url(base, targets)?;
        tracing::info!("Fetching live rates for {}", base);

        let body = self.get_text(url).await?;
        let table = parse_live_response(base, &body)?;

        tracing::debug!(rates = table.len(), "Live rates decoded");
        Ok(table)
    }
}

#[async_trait]
impl CatalogSource for CurrencyLayerClient {
    #[tracing::instrument(skip(self))]
    async fn list_currencies(&self) -> Result<CurrencyCatalog, RateError> {
        let body = self.get_text(self.url("list", &[])?).await?;
        parse_list_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> CurrencyCode {
        s.parse().unwrap()
    }

    fn client() -> CurrencyLayerClient {
        CurrencyLayerClient::new(CurrencyLayerConfig::new("test-key"))
    }

    #[test]
    fn test_client_creation() {
        let client = client();
        assert_eq!(client.base_url, "http://api.currencylayer.com");
        assert_eq!(client.access_key, "test-key");
    }

    #[test]
    fn test_client_with_trailing_slash() {
        let client = CurrencyLayerClient::new(
            CurrencyLayerConfig::new("k").with_base_url("http://localhost:3000/"),
        );
        assert_eq!(client.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_list_url() {
        let url = client().url("list", &[]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://api.currencylayer.com/list?access_key=test-key"
        );
    }

    #[test]
    fn test_live_url_with_targets() {
        let targets = BTreeSet::from([code("GBP"), code("EUR")]);
        let url = client().live_url(&code("USD"), &targets).unwrap();
        assert_eq!(
            url.as_str(),
            "http://api.currencylayer.com/live?access_key=test-key&currencies=EUR%2CGBP&source=USD&format=1"
        );
    }

    #[test]
    fn test_live_url_without_targets() {
        let url = client().live_url(&code("USD"), &BTreeSet::new()).unwrap();
        assert_eq!(url.query(), Some("access_key=test-key&source=USD&format=1"));
    }

    #[test]
    fn test_parse_live_response() {
        let body = r#"{
            "success": true,
            "terms": "https://currencylayer.com/terms",
            "privacy": "https://currencylayer.com/privacy",
            "timestamp": 1597090000,
            "source": "USD",
            "quotes": {"USDUSD": 1.0, "USDEUR": 0.85, "USDGBP": 0.76}
        }"#;

        let table = parse_live_response(&code("USD"), body).unwrap();
        assert_eq!(table.base(), &code("USD"));
        assert_eq!(table.rate(&code("EUR")), Some(0.85));
        assert_eq!(table.pair_rate("USDGBP"), Some(0.76));
    }

    #[test]
    fn test_parse_live_error_payload() {
        let body = r#"{
            "success": false,
            "error": {"code": 101, "type": "invalid_access_key",
                      "info": "You have not supplied a valid API Access Key."}
        }"#;

        let err = parse_live_response(&code("USD"), body).unwrap_err();
        assert!(
            matches!(err, RateError::Api(msg) if msg == "You have not supplied a valid API Access Key.")
        );
    }

    #[test]
    fn test_parse_live_unsuccessful_without_error() {
        let err = parse_live_response(&code("USD"), r#"{"success": false}"#).unwrap_err();
        assert!(matches!(err, RateError::Api(_)));
    }

    #[test]
    fn test_parse_live_malformed() {
        let err = parse_live_response(&code("USD"), "<html>").unwrap_err();
        assert!(matches!(err, RateError::Decode(_)));

        let err = parse_live_response(&code("USD"), r#"{"success": true}"#).unwrap_err();
        assert!(matches!(err, RateError::Decode(_)));

        let err =
            parse_live_response(&code("USD"), r#"{"success": true, "quotes": {"USDEUR": "x"}}"#)
                .unwrap_err();
        assert!(matches!(err, RateError::Decode(_)));
    }

    #[test]
    fn test_parse_live_rejects_other_source() {
        let body = r#"{"success": true, "source": "EUR", "quotes": {"EURGBP": 0.9}}"#;
        let err = parse_live_response(&code("USD"), body).unwrap_err();
        assert!(matches!(err, RateError::Decode(_)));
    }

    #[test]
    fn test_parse_live_rejects_zero_rate() {
        let body = r#"{"success": true, "quotes": {"USDEUR": 0.0}}"#;
        let err = parse_live_response(&code("USD"), body).unwrap_err();
        assert!(matches!(err, RateError::Decode(_)));
    }

    #[test]
    fn test_parse_list_response() {
        let body = r#"{
            "success": true,
            "currencies": {"EUR": "Euro", "GBP": "British Pound Sterling", "??": "Bogus"}
        }"#;

        let catalog = parse_list_response(body).unwrap();
        assert_eq!(catalog.name(&code("EUR")), Some("Euro"));
        assert_eq!(catalog.name(&code("USD")), Some("US Dollar"));
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn test_parse_list_error_payload() {
        let body = r#"{"success": false, "error": {"code": 104, "info": "Usage limit reached."}}"#;
        let err = parse_list_response(body).unwrap_err();
        assert!(matches!(err, RateError::Api(msg) if msg == "Usage limit reached."));
    }
}
