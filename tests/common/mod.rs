// SPDX-License-Identifier: MIT

use spurt_api::config::Config;
use spurt_api::db::SupabaseDb;
use spurt_api::routes::create_router;
use spurt_api::services::{MotivationService, StravaService};
use spurt_api::AppState;
use std::sync::Arc;

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> SupabaseDb {
    SupabaseDb::new_mock()
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::default();
    let db = test_db_offline();
    let refresh_locks = Arc::new(dashmap::DashMap::new());

    let strava_service = StravaService::new(
        config.strava_client_id.clone(),
        config.strava_client_secret.clone(),
        config.http_timeout_secs,
        db.clone(),
        refresh_locks,
    )
    .expect("Failed to build Strava service");

    let motivation_service = MotivationService::new(None, config.http_timeout_secs);

    let state = Arc::new(AppState {
        config,
        db,
        strava_service,
        motivation_service,
    });

    (create_router(state.clone()), state)
}
