//! Main entry point for the image generation studio

use imagegen_studio::{
    api,
    config::Settings,
    provider::{GenerationBackend, ProviderAdapter},
    SessionManager,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Load configuration; an explicit path may be given as the first argument
    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load_from_path(path)?,
        None => Settings::load()?,
    };

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));

    if settings.logging.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }

    info!("Starting image generation studio");
    info!(
        "Loaded configuration: server={}:{}, seed profiles={}",
        settings.server.host,
        settings.server.port,
        settings.seed_profiles().len()
    );

    let settings = Arc::new(settings);
    let backend: Arc<dyn GenerationBackend> = Arc::new(ProviderAdapter::new(settings.http.clone())?);
    let manager = Arc::new(SessionManager::new(settings.clone(), backend));

    let app = api::create_router(manager);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
