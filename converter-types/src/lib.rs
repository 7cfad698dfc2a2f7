//! # Converter Types
//!
//! Domain types and port traits for the currency converter.
//! This crate has ZERO external IO dependencies - only data structures,
//! freshness rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (catalog, cache entries, conversion results)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for API boundaries
//! - `error/` - Rate acquisition and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{CacheEntry, ConversionResult, CurrencyCatalog};
pub use dto::*;
pub use error::{AppError, RateError, StoreError};
pub use exchange_rates::{ConversionError, CurrencyCode, RateTable};
pub use ports::{CatalogSource, KeyValueStore, RateSource};
