use dotenvy::dotenv;
use ladder_backend::config::settings::AppConfig;
use ladder_backend::infrastructure::engine::{ProcessEngine, TranscodeEngine};
use ladder_backend::modules::jobs::repository::InMemoryJobRegistry;
use ladder_backend::state::AppState;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ladder_backend=info,tower_http=info")),
        )
        .init();

    info!("Starting server...");

    let config = AppConfig::new();
    tokio::fs::create_dir_all(&config.upload_dir).await?;

    let engine = ProcessEngine::new(config.engine_bin.clone());
    // Checked again on every start; a missing engine only fails jobs.
    if let Err(e) = engine.locate() {
        warn!("Transcoding engine not available yet: {}", e);
    }

    let bind_addr = config.bind_addr();
    let state = AppState::new(config, Arc::new(InMemoryJobRegistry::new()), Arc::new(engine));
    let app = ladder_backend::app::create_app(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Server running on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
