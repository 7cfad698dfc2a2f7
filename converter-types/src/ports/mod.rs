//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The application layer depends on these traits, not concrete implementations.

mod rate_source;
mod store;

pub use rate_source::{CatalogSource, RateSource};
pub use store::KeyValueStore;
