use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use listenstats::api;
use listenstats::config::Config;
use listenstats::logging::init_logging;
use listenstats::report::StatsService;
use listenstats::source::ListenBrainzClient;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging("info");

    // Load configuration
    let config = Config::from_env()?;
    info!("Loaded configuration");

    // Initialize the ListenBrainz client
    let client = ListenBrainzClient::from_config(&config.listenbrainz)?;
    info!(
        "🎧 Reading listens for '{}' from {}",
        client.user(),
        config.listenbrainz.base_url
    );

    let stats = StatsService::from_config(Arc::new(client), &config);
    let router = api::create_api_router(stats);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🚀 Server listening on http://{}", addr);
    info!("   - Weekly report at http://{}/listenerStats", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
