//! # UPS API client
//!
//! OAuth2 client-credentials token acquisition with TTL caching,
//! and shipment tracking lookups authorized with those tokens.
//!
//! Modules:
//! - `config` — client configuration and YAML loading
//! - `cache` — token type, TTL token cache, in-flight request guards
//! - `sources` — token exchange and tracking lookup calls
//! - `client` — `UpsClient`, wiring the pieces together

pub mod cache;
pub mod client;
pub mod config;
pub mod errors;
pub mod helpers;
pub mod observability;
pub mod sources;
pub mod utils;

#[cfg(test)]
pub mod tests;

pub use crate::cache::token::CachedToken;
pub use crate::cache::token_cache::{TokenCache, TokenStore};
pub use crate::client::{UpsClient, UpsClientBuilder};
pub use crate::config::settings::{ClientConfig, Environment};
pub use crate::errors::{Error, Result};
pub use crate::sources::tracking::{TrackingOptions, TrackingResult};
pub use crate::sources::RequestOptions;
