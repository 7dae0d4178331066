//! GridBNB Web Server
//!
//! Serves the GridBNB API surface and frontend with placeholder collaborators.

use gridbnb_server::api::create_router;
use gridbnb_server::config::Config;
use gridbnb_server::frontend::FrontendBuild;
use gridbnb_server::lifecycle::{LoggingHooks, serve, shutdown_signal};
use gridbnb_server::placeholder;
use gridbnb_server::state::AppState;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    let mut config = Config::load_or_default(&config_path)?;
    if let Ok(host) = std::env::var("HOST") {
        config.server.host = host;
    }
    if let Ok(port) = std::env::var("PORT") {
        config.server.port = port
            .parse()
            .map_err(|e| anyhow::anyhow!("PORT must be a valid number: {}", e))?;
    }

    // Create application state
    let state = AppState::new().into_shared();

    // Inspect the frontend build once
    let dist_dir = config.frontend.resolve_dist_dir(&application_dir());
    let frontend = FrontendBuild::inspect(dist_dir);

    // Build the router
    let app = create_router(state, placeholder::collaborators(), &frontend, &config)?;

    let addr = config.server.bind_addr();
    info!("Starting GridBNB web server on {}", addr);
    if config.docs.enabled {
        info!("API docs available at http://{}/docs", addr);
    }

    // Start the server
    let listener = TcpListener::bind(&addr).await?;
    serve(listener, app.router, &LoggingHooks, shutdown_signal()).await?;

    Ok(())
}

/// Directory containing the executable, or the working directory.
fn application_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(PathBuf::from))
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}
