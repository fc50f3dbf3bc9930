use anyhow::Result;
use compress_server::{AppState, ServerConfig, router};
use tokio::net::TcpListener;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let config = ServerConfig::from_env().map_err(anyhow::Error::msg)?;
    tracing::info!(
        bind_addr = %config.bind_addr,
        max_dimension = config.max_dimension,
        max_upload_bytes = config.max_upload_bytes,
        max_concurrent_encodes = config.max_concurrent_encodes,
        "compress-server v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let listener = TcpListener::bind(config.bind_addr).await?;
    let app = router(AppState::new(config));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("compress-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
