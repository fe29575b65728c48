//! Neonecy - content backend for the Neonecy agency site

use anyhow::Result;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use neonecy::{
    api::{self, AppState},
    config::Config,
    db,
    services::generate_secret,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "neonecy=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Neonecy content backend...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    if !config.admin.has_credentials() {
        tracing::warn!("No admin credentials configured; admin login is disabled");
    }

    let session_secret = match config.admin.session_secret.as_deref() {
        Some(secret) if !secret.is_empty() => secret.to_string(),
        _ => {
            tracing::warn!("No session secret configured; generated one for this run, sessions will not survive a restart");
            generate_secret()
        }
    };

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {}", config.database.url);

    // Run migrations
    let applied = db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed ({} applied)", applied);

    tokio::fs::create_dir_all(config.upload.uploads_dir()).await?;

    // Build application state
    let state = AppState::new(pool, &config, &session_secret)?;

    // Build router
    let app = api::build_router(state, &config.server.cors_origin)?;

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
