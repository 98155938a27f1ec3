use composer::{BrandAssets, ComposeError};
use server::{AppState, routes};
use services::services::{
    BatchPipeline, Collaborators,
    categories::default_categories,
    config::{ConfigError, PipelineConfig},
};
use thiserror::Error;
use tracing_subscriber::{EnvFilter, prelude::*};
use utils::assets::asset_dir;

const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Error)]
pub enum NewsframeError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Assets(#[from] ComposeError),
    #[error("Brand asset directory could not be determined; set NEWSFRAME_ASSET_DIR")]
    NoAssetDir,
}

#[tokio::main]
async fn main() -> Result<(), NewsframeError> {
    // Load environment variables from `.env` if present so local development picks up API keys
    dotenv::dotenv().ok();

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let filter_string = format!(
        "warn,server={level},services={level},composer={level},utils={level}",
        level = log_level
    );
    let env_filter = EnvFilter::try_new(filter_string).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(env_filter))
        .init();

    let config = PipelineConfig::from_env()?;

    // Every asset must resolve before the first request can draw anything
    let dir = asset_dir().ok_or(NewsframeError::NoAssetDir)?;
    let assets = BrandAssets::load(&dir, config.brand_text.clone())?;
    tracing::info!("Brand assets loaded from {}", dir.display());

    let collaborators = Collaborators::from_config(&config, assets);
    let pipeline = BatchPipeline::new(collaborators, config.batch.clone());
    let app_router = routes::router(AppState::new(pipeline, default_categories()));

    let port = std::env::var("PORT")
        .ok()
        .and_then(|s| s.trim().parse::<u16>().ok())
        .unwrap_or_else(|| {
            tracing::info!("No PORT environment variable set, using {}", DEFAULT_PORT);
            DEFAULT_PORT
        });
    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let listener = tokio::net::TcpListener::bind(format!("{host}:{port}")).await?;
    let actual_port = listener.local_addr()?.port();

    tracing::info!(
        "Server running on http://{host}:{actual_port} (gather delay {:?})",
        config.batch.gather_delay
    );

    axum::serve(listener, app_router).await?;
    Ok(())
}
