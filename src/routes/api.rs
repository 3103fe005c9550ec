// SPDX-License-Identifier: MIT

//! Challenge API routes: listing, creation, aggregated progress and
//! progress logging.

use crate::error::{AppError, Result};
use crate::models::{Challenge, Contribution, NewChallenge, NewContribution};
use crate::services::progress;
use crate::services::ChallengeProgress;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Challenge routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/challenges", get(list_challenges).post(create_challenge))
        .route("/api/challenges/{id}", delete(delete_challenge))
        .route("/api/challenges/{id}/progress", get(get_progress))
        .route("/api/challenges/{id}/logs", post(log_progress))
}

// ─── Challenge Listing & Creation ────────────────────────────

/// List all challenges, newest first (dashboard view).
async fn list_challenges(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Challenge>>> {
    let challenges = state.db.list_challenges().await?;
    Ok(Json(challenges))
}

#[derive(Deserialize)]
struct CreateChallengeRequest {
    title: String,
    description: Option<String>,
    goal: f64,
    unit: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    creator_id: String,
    creator_name: Option<String>,
}

/// Create a challenge. The creator becomes the first participant.
///
/// `end_date >= start_date` is deliberately not enforced: a degenerate
/// window is allowed and simply paces at zero.
async fn create_challenge(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateChallengeRequest>,
) -> Result<Json<Challenge>> {
    if body.title.trim().is_empty() {
        return Err(AppError::BadRequest("Title must not be empty".to_string()));
    }
    if !(body.goal.is_finite() && body.goal > 0.0) {
        return Err(AppError::BadRequest(
            "Goal must be a positive number".to_string(),
        ));
    }

    // A missing or blank description gets a generated one (canned
    // fallback when Gemini is not configured)
    let description = match body.description {
        Some(d) if !d.trim().is_empty() => d,
        _ => {
            state
                .motivation_service
                .describe_challenge(body.title.trim())
                .await
        }
    };

    let new = NewChallenge {
        title: body.title.trim().to_string(),
        description: Some(description),
        goal: body.goal,
        unit: body.unit,
        start_date: body.start_date,
        end_date: body.end_date,
        creator_id: body.creator_id.clone(),
        creator_name: body.creator_name,
        participants: vec![body.creator_id],
    };

    let challenge = state.db.insert_challenge(&new).await?;

    tracing::info!(challenge_id = %challenge.id, "Challenge created");
    Ok(Json(challenge))
}

#[derive(Deserialize)]
struct DeleteChallengeRequest {
    user_id: String,
}

/// Delete a challenge along with its progress logs. Creator only.
///
/// No foreign-key cascade exists in the schema, so the logs go first and
/// the challenge row second; a failure in between leaves an emptied
/// challenge rather than orphaned logs.
async fn delete_challenge(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<DeleteChallengeRequest>,
) -> Result<StatusCode> {
    let challenge = state
        .db
        .get_challenge(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Challenge {}", id)))?;

    if challenge.creator_id != body.user_id {
        return Err(AppError::Forbidden(
            "Only the creator can delete a challenge".to_string(),
        ));
    }

    state.db.delete_contributions(&challenge.id).await?;
    state.db.delete_challenge(&challenge.id).await?;

    tracing::info!(challenge_id = %challenge.id, "Challenge deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ─── Aggregated Progress ─────────────────────────────────────

/// Get the derived progress view for a challenge: group total, group
/// goal, expected (pacing) total and the leaderboard.
async fn get_progress(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ChallengeProgress>> {
    let challenge = state
        .db
        .get_challenge(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Challenge {}", id)))?;

    let progress = aggregate_challenge(&state, &challenge).await?;
    Ok(Json(progress))
}

/// Fetch contributions and contributor profiles, then aggregate.
async fn aggregate_challenge(
    state: &AppState,
    challenge: &Challenge,
) -> Result<ChallengeProgress> {
    let contributions = state.db.list_contributions(&challenge.id).await?;

    let user_ids = distinct_user_ids(&contributions);
    let profiles = state.db.get_profiles(&user_ids).await?;

    Ok(progress::aggregate(
        challenge,
        &contributions,
        &profiles,
        Utc::now(),
    ))
}

/// Distinct user IDs in first-contribution order.
fn distinct_user_ids(contributions: &[Contribution]) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for log in contributions {
        if !ids.contains(&log.user_id) {
            ids.push(log.user_id.clone());
        }
    }
    ids
}

// ─── Progress Logging ────────────────────────────────────────

#[derive(Deserialize)]
struct LogRequest {
    user_id: String,
    user_name: Option<String>,
    amount: f64,
}

#[derive(Serialize)]
struct LogResponse {
    motivation: String,
    progress: ChallengeProgress,
}

/// Log a contribution toward a challenge.
///
/// Adds the user to the participant list on their first log, then
/// returns the fresh aggregate plus a motivational message.
async fn log_progress(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<LogRequest>,
) -> Result<Json<LogResponse>> {
    if !(body.amount.is_finite() && body.amount > 0.0) {
        return Err(AppError::BadRequest(
            "Amount must be a positive number".to_string(),
        ));
    }

    let challenge = state
        .db
        .get_challenge(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Challenge {}", id)))?;

    let new = NewContribution {
        challenge_id: challenge.id.clone(),
        user_id: body.user_id.clone(),
        user_name: body.user_name,
        amount: body.amount,
    };
    state.db.insert_contribution(&new).await?;

    // First log from this user joins them to the challenge
    if !challenge.participant_ids().contains(&body.user_id) {
        let mut participants = challenge.participant_ids().to_vec();
        participants.push(body.user_id.clone());
        state.db.set_participants(&challenge.id, &participants).await?;
    }

    tracing::info!(
        challenge_id = %challenge.id,
        amount = body.amount,
        "Progress logged"
    );

    let motivation = state
        .motivation_service
        .motivate_log(body.amount, &challenge.unit, &challenge.title)
        .await;

    let progress = aggregate_challenge(&state, &challenge).await?;

    Ok(Json(LogResponse {
        motivation,
        progress,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_user_ids_keeps_first_seen_order() {
        let logs = vec![
            Contribution {
                user_id: "b".to_string(),
                user_name: None,
                amount: 1.0,
            },
            Contribution {
                user_id: "a".to_string(),
                user_name: None,
                amount: 1.0,
            },
            Contribution {
                user_id: "b".to_string(),
                user_name: None,
                amount: 1.0,
            },
        ];

        assert_eq!(distinct_user_ids(&logs), vec!["b", "a"]);
    }
}
