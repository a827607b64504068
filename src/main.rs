use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use slash_bot::config::{BotConfig, github_token_from_env};
use slash_bot::github::StaticTokenFactory;
use slash_bot::server::{AppState, build_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "slash_bot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = BotConfig::from_env().context("loading configuration")?;
    let token = github_token_from_env()?;
    let clients = StaticTokenFactory::from_token(token).context("building GitHub client")?;

    let addr = config.listen_addr;
    let app = build_router(AppState::new(config, clients));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!("listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutting down");
}
