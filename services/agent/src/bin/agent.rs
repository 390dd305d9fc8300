//! services/agent/src/bin/agent.rs

use agent_lib::{
    adapters::{FirebaseStore, GeminiAdapter, SqliteCache},
    config::Config,
    error::AppError,
    web::{self, state::AppState},
};
use axum::http::{
    header::{ACCEPT, CONTENT_TYPE},
    Method,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use velotrivia_core::SyncController;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting agent...");

    // --- 2. Open the Local Cache & Run Migrations ---
    info!("Opening local cache at {}", config.local_cache_url);
    let cache = SqliteCache::connect(&config.local_cache_url).await?;
    cache.run_migrations().await?;

    // --- 3. Initialize Service Adapters ---
    let http_client = reqwest::Client::builder()
        .user_agent(concat!("velotrivia-agent/", env!("CARGO_PKG_VERSION")))
        .build()?;

    if config.firebase_db_url.is_none() {
        warn!("FIREBASE_DB_URL is not set. Running with the local cache only.");
    }
    let remote = Arc::new(FirebaseStore::new(
        http_client.clone(),
        config.firebase_db_url.clone(),
    ));
    let generator = Arc::new(GeminiAdapter::new(
        http_client,
        config.gemini_api_base.clone(),
        config.gemini_api_key.clone(),
        config.trivia_model.clone(),
        config.image_model.clone(),
    ));

    // --- 4. Hydrate State Before Serving ---
    let controller = SyncController::new(remote, Arc::new(cache), generator);
    info!("Syncing with the cloud database...");
    controller.hydrate().await;

    let app_state = Arc::new(AppState {
        controller: controller.clone(),
        config: config.clone(),
    });

    // --- 5. Create the Web Router ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);
    let app = web::router(app_state).layer(cors);

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // A change made less than one debounce period ago is not flushed.
    controller.shutdown().await;
    info!("Agent stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for the shutdown signal: {}", e);
    }
    info!("Shutdown signal received.");
}
