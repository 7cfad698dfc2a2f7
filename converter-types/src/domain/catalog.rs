//! Supported currencies and their display names.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use exchange_rates::CurrencyCode;

/// Display name used when the remote catalog omits the pivot.
pub const USD_DISPLAY_NAME: &str = "US Dollar";

/// Mapping of currency code to display name.
///
/// Always contains `USD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(
    from = "BTreeMap<CurrencyCode, String>",
    into = "BTreeMap<CurrencyCode, String>"
)]
#[schema(value_type = BTreeMap<String, String>)]
pub struct CurrencyCatalog(BTreeMap<CurrencyCode, String>);

impl CurrencyCatalog {
    pub fn new(mut currencies: BTreeMap<CurrencyCode, String>) -> Self {
        currencies
            .entry(CurrencyCode::usd())
            .or_insert_with(|| USD_DISPLAY_NAME.to_string());
        Self(currencies)
    }

    pub fn name(&self, code: &CurrencyCode) -> Option<&str> {
        self.0.get(code).map(String::as_str)
    }

    pub fn contains(&self, code: &CurrencyCode) -> bool {
        self.0.contains_key(code)
    }

    pub fn codes(&self) -> BTreeSet<CurrencyCode> {
        self.0.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CurrencyCode, &String)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<CurrencyCode, String>> for CurrencyCatalog {
    fn from(currencies: BTreeMap<CurrencyCode, String>) -> Self {
        Self::new(currencies)
    }
}

impl From<CurrencyCatalog> for BTreeMap<CurrencyCode, String> {
    fn from(catalog: CurrencyCatalog) -> Self {
        catalog.0
    }
}

impl Default for CurrencyCatalog {
    fn default() -> Self {
        Self::new(BTreeMap::new())
    }
}
