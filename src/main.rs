use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

use churn_api::config::ServerArgs;
use churn_api::{app, model, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    let args = ServerArgs::parse();

    let state = AppState::new(model::load_default_model());
    if !state.model_loaded() {
        warn!("Starting without a model; /predict will answer with an error message");
    }

    let addr = args.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr.as_str())
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Churn prediction API {} starting on http://{}", env!("CARGO_PKG_VERSION"), addr);
    info!("Available endpoints:");
    info!("  - GET  /              - Welcome message");
    info!("  - POST /predict       - Churn probability for one customer");
    info!("  - GET  /docs          - Interactive API documentation");
    info!("  - GET  /openapi.json  - OpenAPI description");

    axum::serve(listener, app(state))
        .await
        .context("Server failed")?;

    Ok(())
}
