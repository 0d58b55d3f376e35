//! search-rs: Plan-gated metered search proxy
//!
//! A web search gateway: accounts sign up, pick a subscription plan, and run
//! quota-metered queries that are proxied to an upstream search API,
//! paginated, trimmed to the plan's result cap, and logged.
//!
//! # Features
//!
//! - **Plan Registry**: fixed subscription tiers plus a parametric
//!   enterprise tier, resolved by a pure lookup
//! - **Metered Search**: bounded pagination against the upstream provider
//!   with an atomic one-query charge per request
//! - **Accounts**: SQLite-backed account store with Argon2 credentials
//! - **REST API**: JWT-authenticated endpoints with per-IP rate limiting
//!
//! # Example
//!
//! ```no_run
//! use search_rs::accounts::AccountStore;
//! use search_rs::api::auth::JwtConfig;
//! use search_rs::api::ApiServer;
//! use search_rs::config::Config;
//! use search_rs::search::GoogleSearchProvider;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let store = AccountStore::connect(&config.storage.database_url).await?;
//!     let provider = Arc::new(GoogleSearchProvider::new(
//!         config.upstream.api_key.clone(),
//!         config.upstream.engine_id.clone(),
//!         Duration::from_secs(config.upstream.timeout_seconds),
//!     )?);
//!
//!     let server = ApiServer::new(
//!         store,
//!         provider,
//!         JwtConfig::new(config.auth.jwt_secret.clone(), config.auth.token_expiration_hours),
//!         config.server.listen_addr.clone(),
//!     );
//!     server.run().await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration management
//! - [`error`]: Error types and handling
//! - [`plans`]: Subscription plan registry
//! - [`accounts`]: Account and usage storage
//! - [`search`]: Upstream provider and the metered pagination loop
//! - [`api`]: REST API
//! - [`security`]: Credential hashing

pub mod accounts;
pub mod api;
pub mod config;
pub mod error;
pub mod plans;
pub mod search;
pub mod security;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, SearchError};
