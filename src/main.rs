use std::env;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use rehber_backend::config::AppConfig;
use rehber_backend::{logging, server, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load_default().context("Failed to load configuration")?;
    logging::init(&config.server.log_dir);

    let state = AppState::initialize(config).context("Failed to initialize application state")?;

    // Build the corpus index up front so the first question does not pay
    // for it; the cell keeps it for the rest of the process.
    let index = state
        .index()
        .await
        .context("Failed to build the corpus index")?;
    tracing::info!(entries = index.len(), "corpus index built");

    let port = env::var("PORT")
        .ok()
        .and_then(|val| val.parse::<u16>().ok())
        .unwrap_or(0);
    let bind_addr = format!("127.0.0.1:{}", port);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;

    println!("REHBER_PORT={}", addr.port());
    tracing::info!("Listening on {}", addr);

    let app: Router = server::router::router(state);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
