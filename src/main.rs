// SPDX-License-Identifier: MIT

//! Spurt API Server
//!
//! Backend for social fitness challenges: group progress aggregation,
//! Strava activity import, and motivational messages.

use spurt_api::{
    config::Config,
    db::SupabaseDb,
    services::{MotivationService, StravaService},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Spurt API");

    // Initialize Supabase client
    let db = SupabaseDb::new(&config).expect("Failed to initialize Supabase client");

    // Per-user refresh locks, shared across all requests in this instance
    let refresh_locks = Arc::new(dashmap::DashMap::new());

    // Initialize Strava token broker
    let strava_service = StravaService::new(
        config.strava_client_id.clone(),
        config.strava_client_secret.clone(),
        config.http_timeout_secs,
        db.clone(),
        refresh_locks,
    )
    .expect("Failed to initialize Strava service");

    // Motivational messages (disabled when no API key is configured)
    let motivation_service =
        MotivationService::new(config.gemini_api_key.clone(), config.http_timeout_secs);
    if config.gemini_api_key.is_none() {
        tracing::info!("GEMINI_API_KEY not set, motivational messages disabled");
    }

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        strava_service,
        motivation_service,
    });

    // Build router
    let app = spurt_api::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("spurt_api=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
