// SPDX-License-Identifier: MIT

//! Strava integration endpoints.
//!
//! These mirror the two serverless functions the web client calls:
//! - `POST /exchange` - one-shot authorization-code exchange
//! - `POST /activities` - list recent activities, refreshing the stored
//!   credential transparently when it is near expiry

use crate::error::{AppError, Result};
use crate::models::StravaCredential;
use crate::services::StravaActivity;
use crate::AppState;
use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use std::sync::Arc;

/// Strava glue routes (no session required; the client supplies the user ID).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/exchange", post(exchange))
        .route("/activities", post(activities))
}

// ─── Token Exchange ──────────────────────────────────────────

/// Exchange request body, matching the web client's JSON field names.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExchangeRequest {
    code: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
}

/// Exchange an authorization code for a credential triple.
///
/// The triple is returned to the client, which persists it to the user's
/// own profile row; this endpoint performs no storage.
async fn exchange(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ExchangeRequest>,
) -> Result<Json<StravaCredential>> {
    let (Some(code), Some(client_id), Some(client_secret)) =
        (body.code, body.client_id, body.client_secret)
    else {
        return Err(AppError::BadRequest("Missing parameters".to_string()));
    };

    let credential = state
        .strava_service
        .exchange_authorization_code(&code, &client_id, &client_secret)
        .await?;

    tracing::info!("Authorization code exchanged");
    Ok(Json(credential))
}

// ─── Activity Listing ────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActivitiesRequest {
    user_id: Option<String>,
}

/// List the user's recent Strava activities (30-day window).
async fn activities(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ActivitiesRequest>,
) -> Result<Json<Vec<StravaActivity>>> {
    let user_id = body
        .user_id
        .ok_or_else(|| AppError::BadRequest("Missing userId".to_string()))?;

    let activities = state.strava_service.list_recent_activities(&user_id).await?;

    tracing::debug!(count = activities.len(), "Fetched Strava activities");
    Ok(Json(activities))
}
