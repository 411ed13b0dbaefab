use std::sync::Arc;

use folio_api::routes::build_router;
use folio_api::services::MediaAssetService;
use folio_api::state::AppState;
use folio_core::{Config, FileValidator};
use folio_db::{PgAssetRepository, PgParentSource};
use folio_storage::HttpMediaStore;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("../../migrations").run(&pool).await?;

    let store = HttpMediaStore::new(
        config.media_store_base_url.clone(),
        config.media_store_api_key.clone(),
    )?;
    let validator = FileValidator::new(
        config.image_max_file_size_bytes,
        config.image_allowed_content_types.clone(),
    );
    let assets = MediaAssetService::new(
        Arc::new(PgAssetRepository::new(pool.clone())),
        Arc::new(PgParentSource::new(pool)),
        Arc::new(store),
        validator,
        config.max_assets_per_parent,
        config.media_store_root_folder.clone(),
    );

    let state = Arc::new(AppState::new(config.clone(), assets));
    let app = build_router(&config, state)?;

    let addr = format!("0.0.0.0:{}", config.server_port);
    tracing::info!(addr = %addr, environment = %config.environment, "Starting server");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Listens for Ctrl+C (SIGINT) and SIGTERM to initiate graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
