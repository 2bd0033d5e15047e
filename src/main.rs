use anyhow::{Context, Result};
use multilingual_summarizer::{config::Config, web};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (absent in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("multilingual_summarizer=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    info!("Starting multilingual summarizer");

    let config = Config::from_env()?;
    info!(
        "Models: summarization='{}', translation='{}' (timeout {}s, {} attempt(s))",
        config.summarization_model,
        config.translation_model,
        config.request_timeout_secs,
        config.gateway_max_attempts
    );

    let state = web::AppState::from_config(&config).await?;
    let app = web::build_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
