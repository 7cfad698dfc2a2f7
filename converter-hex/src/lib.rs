//! # Converter Hex
//!
//! Application layer and HTTP adapter for the currency converter.
//!
//! ## Architecture
//!
//! - `cache/` - Durable rate cache over the `KeyValueStore` port
//! - `provider/` - Cache-first rate acquisition over the `RateSource` port
//! - `service/` - Application service (catalog, conversion, cache maintenance)
//! - `inbound/` - HTTP adapter (Axum server)
//!
//! The service is generic over its store, rate source and catalog source,
//! allowing different adapters to be injected.

pub mod cache;
pub mod inbound;
pub mod openapi;
pub mod provider;
pub mod service;


pub use cache::RateCache;
pub use provider::RateProvider;
pub use service::{ConverterConfig, ConverterService, parse_amount};
