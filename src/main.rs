use std::sync::Arc;

use anyhow::Context;

use cinema_api::{
    api::{create_router, AppState},
    config::Config,
    data::Dataset,
    init_tracing,
    services::OmdbProvider,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env()?;

    // Without a matrix there is nothing to serve
    let dataset = match Dataset::load(&config) {
        Ok(dataset) => Arc::new(dataset),
        Err(e) => {
            tracing::error!(error = %e, data_dir = %config.data_dir.display(), "Failed to load dataset");
            return Err(e).context("dataset initialization failed");
        }
    };

    let provider =
        OmdbProvider::from_config(&config).context("failed to build metadata HTTP client")?;
    if config.omdb_api_key.is_none() {
        tracing::warn!("OMDB_API_KEY not set, title details will use fallback records");
    }

    let state = AppState::new(
        dataset,
        Arc::new(provider),
        config.default_k,
        config.max_concurrent_lookups,
    );
    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;
    tracing::info!(address = %address, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
