//! Pivot Rate Tables and Cross-Rate Derivation
//!
//! A remote rate service quotes every currency against a single pivot
//! (the *base*). This library holds such a table and derives the rates for
//! any other source currency from it, so one fetched table serves every
//! possible conversion.
//!
//! # Example
//! ```
//! use std::collections::BTreeMap;
//! use exchange_rates::{CurrencyCode, RateTable};
//!
//! let usd: CurrencyCode = "USD".parse().unwrap();
//! let eur: CurrencyCode = "EUR".parse().unwrap();
//! let gbp: CurrencyCode = "GBP".parse().unwrap();
//!
//! let table = RateTable::from_quotes(
//!     usd,
//!     [("USDEUR".to_string(), 0.9), ("USDGBP".to_string(), 0.8)],
//! )
//! .unwrap();
//!
//! let rates = exchange_rates::convert(&table, &eur).unwrap();
//! assert!((rates[&gbp] - 0.8889).abs() < 1e-4);
//!
//! let amounts = exchange_rates::scale(&rates, 10.0).unwrap();
//! assert!((amounts[&gbp] - 8.889).abs() < 1e-3);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Errors raised while building rate tables or deriving cross rates.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    #[error("Invalid currency code: {0}")]
    InvalidCode(String),

    #[error("Invalid rate {rate} for {code}")]
    InvalidRate { code: String, rate: f64 },

    #[error("No rate available for {0}")]
    MissingRate(CurrencyCode),

    #[error("Amount must be a finite number, got {0}")]
    InvalidAmount(f64),
}

// ─────────────────────────────────────────────────────────────────────────────
// Currency Code
// ─────────────────────────────────────────────────────────────────────────────

/// Three-letter ISO-style currency code, always upper-case.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "EUR")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub const LEN: usize = 3;

    /// The pivot every observed rate table is quoted against.
    pub fn usd() -> Self {
        Self("USD".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Pair key used by the remote service, e.g. `USD` + `EUR` = `USDEUR`.
    pub fn pair_key(&self, target: &CurrencyCode) -> String {
        format!("{}{}", self.0, target.0)
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CurrencyCode {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        if code.len() != Self::LEN || !code.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(ConversionError::InvalidCode(s.to_string()));
        }
        Ok(Self(code))
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = ConversionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rate Table
// ─────────────────────────────────────────────────────────────────────────────

/// Rates for every known currency, quoted against `base`.
///
/// Rates are keyed by plain target code. Every stored rate is finite and
/// strictly positive; the base itself is always `1.0` unless the payload
/// supplied its own self pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RateTableRepr")]
pub struct RateTable {
    base: CurrencyCode,
    rates: BTreeMap<CurrencyCode, f64>,
}

#[derive(Deserialize)]
struct RateTableRepr {
    base: CurrencyCode,
    rates: BTreeMap<CurrencyCode, f64>,
}

impl TryFrom<RateTableRepr> for RateTable {
    type Error = ConversionError;

    fn try_from(repr: RateTableRepr) -> Result<Self, Self::Error> {
        RateTable::new(repr.base, repr.rates)
    }
}

impl RateTable {
    /// Builds a table from plain-code rates.
    pub fn new(
        base: CurrencyCode,
        rates: BTreeMap<CurrencyCode, f64>,
    ) -> Result<Self, ConversionError> {
        for (code, rate) in &rates {
            validate_rate(code.as_str(), *rate)?;
        }
        Ok(Self { base, rates })
    }

    /// Builds a table from pair-keyed quotes such as `"USDEUR" => 0.9`.
    ///
    /// Every key must start with the base code and end in a valid code.
    pub fn from_quotes<I>(base: CurrencyCode, quotes: I) -> Result<Self, ConversionError>
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        let mut rates = BTreeMap::new();
        for (pair, rate) in quotes {
            let target = pair
                .strip_prefix(base.as_str())
                .ok_or_else(|| ConversionError::InvalidCode(pair.clone()))?
                .parse::<CurrencyCode>()
                .map_err(|_| ConversionError::InvalidCode(pair.clone()))?;
            validate_rate(&pair, rate)?;
            rates.insert(target, rate);
        }
        Ok(Self { base, rates })
    }

    pub fn base(&self) -> &CurrencyCode {
        &self.base
    }

    /// Rates exactly as supplied, without the implicit base entry.
    pub fn rates(&self) -> &BTreeMap<CurrencyCode, f64> {
        &self.rates
    }

    /// Rate for `code` against the base. The base itself is `1.0` by
    /// convention when the payload carried no self pair.
    pub fn rate(&self, code: &CurrencyCode) -> Option<f64> {
        match self.rates.get(code) {
            Some(rate) => Some(*rate),
            None if *code == self.base => Some(1.0),
            None => None,
        }
    }

    /// Rate looked up by remote pair key (`"USDEUR"`).
    pub fn pair_rate(&self, pair: &str) -> Option<f64> {
        let target: CurrencyCode = pair.strip_prefix(self.base.as_str())?.parse().ok()?;
        self.rate(&target)
    }

    /// All rates including the base entry.
    pub fn entries(&self) -> BTreeMap<CurrencyCode, f64> {
        let mut entries = self.rates.clone();
        entries.entry(self.base.clone()).or_insert(1.0);
        entries
    }

    /// Known codes, including the base.
    pub fn codes(&self) -> Vec<CurrencyCode> {
        self.entries().into_keys().collect()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

fn validate_rate(code: &str, rate: f64) -> Result<(), ConversionError> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(ConversionError::InvalidRate {
            code: code.to_string(),
            rate,
        });
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Conversion Engine
// ─────────────────────────────────────────────────────────────────────────────

/// Rate from `source` to `target`, derived through the table's base:
/// `(1 / base→source) * base→target`.
pub fn cross_rate(
    table: &RateTable,
    source: &CurrencyCode,
    target: &CurrencyCode,
) -> Result<f64, ConversionError> {
    let source_rate = table
        .rate(source)
        .ok_or_else(|| ConversionError::MissingRate(source.clone()))?;
    if source == target {
        return Ok(1.0);
    }
    let target_rate = table
        .rate(target)
        .ok_or_else(|| ConversionError::MissingRate(target.clone()))?;
    Ok((1.0 / source_rate) * target_rate)
}

/// Derives `source → t` for every currency `t` in the table.
///
/// Fails with [`ConversionError::MissingRate`] when the table has no rate for
/// `source`; never returns a partial mapping.
pub fn convert(
    table: &RateTable,
    source: &CurrencyCode,
) -> Result<BTreeMap<CurrencyCode, f64>, ConversionError> {
    let source_rate = table
        .rate(source)
        .ok_or_else(|| ConversionError::MissingRate(source.clone()))?;
    let inverse = 1.0 / source_rate;

    Ok(table
        .entries()
        .into_iter()
        .map(|(code, rate)| {
            let derived = if code == *source { 1.0 } else { inverse * rate };
            (code, derived)
        })
        .collect())
}

/// Multiplies every rate by `amount`. Zero and negative amounts scale
/// linearly; only non-finite amounts are rejected.
pub fn scale(
    rates: &BTreeMap<CurrencyCode, f64>,
    amount: f64,
) -> Result<BTreeMap<CurrencyCode, f64>, ConversionError> {
    if !amount.is_finite() {
        return Err(ConversionError::InvalidAmount(amount));
    }
    Ok(rates
        .iter()
        .map(|(code, rate)| (code.clone(), rate * amount))
        .collect())
}

/// [`convert`] followed by [`scale`].
pub fn convert_amount(
    table: &RateTable,
    source: &CurrencyCode,
    amount: f64,
) -> Result<BTreeMap<CurrencyCode, f64>, ConversionError> {
    let rates = convert(table, source)?;
    scale(&rates, amount)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> CurrencyCode {
        s.parse().unwrap()
    }

    fn usd_table() -> RateTable {
        RateTable::from_quotes(
            code("USD"),
            [
                ("USDUSD".to_string(), 1.0),
                ("USDEUR".to_string(), 0.9),
                ("USDGBP".to_string(), 0.8),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_currency_code_parse() {
        assert_eq!(code("usd"), CurrencyCode::usd());
        assert_eq!(code(" eur ").as_str(), "EUR");
        assert!("EURO".parse::<CurrencyCode>().is_err());
        assert!("E1R".parse::<CurrencyCode>().is_err());
        assert!("".parse::<CurrencyCode>().is_err());
    }

    #[test]
    fn test_currency_code_serde() {
        let json = serde_json::to_string(&code("GBP")).unwrap();
        assert_eq!(json, "\"GBP\"");
        assert!(serde_json::from_str::<CurrencyCode>("\"GBPX\"").is_err());
    }

    #[test]
    fn test_pair_key() {
        assert_eq!(CurrencyCode::usd().pair_key(&code("EUR")), "USDEUR");
    }

    #[test]
    fn test_from_quotes_strips_base_prefix() {
        let table = usd_table();
        assert_eq!(table.rate(&code("EUR")), Some(0.9));
        assert_eq!(table.pair_rate("USDGBP"), Some(0.8));
        assert_eq!(table.pair_rate("EURGBP"), None);
    }

    #[test]
    fn test_from_quotes_rejects_foreign_pair() {
        let err = RateTable::from_quotes(code("USD"), [("EURGBP".to_string(), 0.8)]).unwrap_err();
        assert_eq!(err, ConversionError::InvalidCode("EURGBP".into()));
    }

    #[test]
    fn test_rejects_non_positive_rates() {
        let err = RateTable::from_quotes(code("USD"), [("USDEUR".to_string(), 0.0)]).unwrap_err();
        assert!(matches!(err, ConversionError::InvalidRate { .. }));

        let rates = BTreeMap::from([(code("EUR"), f64::NAN)]);
        assert!(RateTable::new(code("USD"), rates).is_err());
    }

    #[test]
    fn test_base_rate_implicit() {
        let table = RateTable::from_quotes(code("USD"), [("USDEUR".to_string(), 0.9)]).unwrap();
        assert_eq!(table.rate(&code("USD")), Some(1.0));
        assert_eq!(table.entries().len(), 2);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_cross_rate_identity() {
        let rates = convert(&usd_table(), &code("EUR")).unwrap();
        assert!((rates[&code("GBP")] - 0.8889).abs() < 1e-4);
        assert_eq!(rates[&code("EUR")], 1.0);
        assert!((rates[&code("USD")] - 1.0 / 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_convert_from_base() {
        let rates = convert(&usd_table(), &code("USD")).unwrap();
        assert_eq!(rates[&code("USD")], 1.0);
        assert_eq!(rates[&code("EUR")], 0.9);
        assert_eq!(rates[&code("GBP")], 0.8);
    }

    #[test]
    fn test_convert_is_pure() {
        let table = usd_table();
        let first = convert(&table, &code("GBP")).unwrap();
        let second = convert(&table, &code("GBP")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_convert_missing_source() {
        let err = convert(&usd_table(), &code("JPY")).unwrap_err();
        assert_eq!(err, ConversionError::MissingRate(code("JPY")));
    }

    #[test]
    fn test_cross_rate_single_pair() {
        let table = usd_table();
        let rate = cross_rate(&table, &code("GBP"), &code("EUR")).unwrap();
        assert!((rate - 1.125).abs() < 1e-12);
        assert!(cross_rate(&table, &code("EUR"), &code("JPY")).is_err());
    }

    #[test]
    fn test_scale() {
        let rates = BTreeMap::from([(code("EUR"), 2.0), (code("GBP"), 1.5)]);

        let scaled = scale(&rates, 10.0).unwrap();
        assert_eq!(scaled[&code("EUR")], 20.0);
        assert_eq!(scaled[&code("GBP")], 15.0);

        let zeroed = scale(&rates, 0.0).unwrap();
        assert_eq!(zeroed[&code("EUR")], 0.0);
        assert_eq!(zeroed[&code("GBP")], 0.0);

        let negative = scale(&rates, -2.0).unwrap();
        assert_eq!(negative[&code("EUR")], -4.0);
    }

    #[test]
    fn test_scale_rejects_non_finite() {
        let rates = BTreeMap::from([(code("EUR"), 2.0)]);
        assert!(matches!(
            scale(&rates, f64::INFINITY),
            Err(ConversionError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_rate_table_json_round_trip() {
        let table = usd_table();
        let json = serde_json::to_string(&table).unwrap();
        let decoded: RateTable = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, table);
    }

    #[test]
    fn test_rate_table_json_rejects_invalid_rate() {
        let json = r#"{"base":"USD","rates":{"EUR":-1.0}}"#;
        assert!(serde_json::from_str::<RateTable>(json).is_err());
    }
}
