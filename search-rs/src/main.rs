//! search-rs: Plan-gated metered search proxy server

use search_rs::accounts::AccountStore;
use search_rs::api::auth::JwtConfig;
use search_rs::api::ApiServer;
use search_rs::config::Config;
use search_rs::search::GoogleSearchProvider;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let mut config = if let Some(config_path) = std::env::args().nth(1) {
        Config::from_file(&config_path)?
    } else if std::path::Path::new("config.toml").exists() {
        Config::from_file("config.toml")?
    } else {
        Config::development()
    };

    // Secrets can be supplied through the environment
    if let Ok(api_key) = std::env::var("GOOGLE_API_KEY") {
        config.upstream.api_key = api_key;
    }
    if let Ok(engine_id) = std::env::var("GOOGLE_CX") {
        config.upstream.engine_id = engine_id;
    }
    if let Ok(secret) = std::env::var("JWT_SECRET") {
        config.auth.jwt_secret = secret;
    }

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("search_rs={},tower_http=info", config.logging.level).into()
    });
    if config.logging.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }

    info!("Starting search-rs v{}", env!("CARGO_PKG_VERSION"));
    info!("  Listening on: {}", config.server.listen_addr);
    info!("  Database: {}", config.storage.database_url);
    info!("  Upstream: {}", config.upstream.base_url);

    if config.upstream.api_key.is_empty() {
        warn!("No upstream API key configured; searches will fail until GOOGLE_API_KEY is set");
    }

    // Initialize storage
    let store = AccountStore::connect(&config.storage.database_url).await?;

    // Initialize the upstream search provider
    let provider = Arc::new(
        GoogleSearchProvider::new(
            config.upstream.api_key.clone(),
            config.upstream.engine_id.clone(),
            Duration::from_secs(config.upstream.timeout_seconds),
        )?
        .with_base_url(config.upstream.base_url.clone()),
    );

    // Start the API server
    let server = ApiServer::new(
        store,
        provider,
        JwtConfig::new(
            config.auth.jwt_secret.clone(),
            config.auth.token_expiration_hours,
        ),
        config.server.listen_addr.clone(),
    );

    server.run().await?;

    Ok(())
}
