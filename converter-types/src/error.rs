//! Error types for the currency converter.

use exchange_rates::{ConversionError, CurrencyCode};

/// Storage-level errors (key-value backend failures).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Rate acquisition and derivation errors.
///
/// Every variant is terminal for the request that produced it; nothing is
/// retried.
#[derive(Debug, thiserror::Error)]
pub enum RateError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("{0}")]
    Api(String),

    #[error("Unexpected response payload: {0}")]
    Decode(String),

    #[error("No rate available for {0}")]
    MissingRate(CurrencyCode),

    #[error("Couldn't read the cached exchange rates: {0}")]
    CacheDecode(String),

    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error(transparent)]
    Conversion(ConversionError),
}

impl From<ConversionError> for RateError {
    fn from(err: ConversionError) -> Self {
        match err {
            ConversionError::MissingRate(code) => RateError::MissingRate(code),
            other => RateError::Conversion(other),
        }
    }
}

/// Application-level errors (for HTTP responses).
///
/// Maps cleanly to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Message shown to the user, without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Upstream(msg)
            | AppError::Internal(msg) => msg,
        }
    }
}

impl From<RateError> for AppError {
    fn from(err: RateError) -> Self {
        match err {
            RateError::Network(_) | RateError::Api(_) | RateError::Decode(_) => {
                AppError::Upstream(err.to_string())
            }
            RateError::MissingRate(_) => AppError::NotFound(err.to_string()),
            RateError::Conversion(e) => AppError::BadRequest(e.to_string()),
            RateError::CacheDecode(_) | RateError::Storage(_) => AppError::Internal(err.to_string()),
        }
    }
}

impl From<ConversionError> for AppError {
    fn from(err: ConversionError) -> Self {
        RateError::from(err).into()
    }
}
