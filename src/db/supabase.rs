// SPDX-License-Identifier: MIT

//! Supabase (PostgREST) client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Profiles (display names, avatars, Strava credentials)
//! - Challenges (group goals and participant lists)
//! - Progress logs (contributions toward a challenge)
//!
//! PostgREST is strongly consistent per key, so a credential written by
//! the token broker is visible to the next read for the same user.

use crate::config::Config;
use crate::db::tables;
use crate::error::AppError;
use crate::models::{Challenge, Contribution, NewChallenge, NewContribution, Profile};
use crate::models::StravaCredential;
use serde::Deserialize;
use std::time::Duration;

/// Supabase database client.
#[derive(Clone)]
pub struct SupabaseDb {
    http: Option<reqwest::Client>,
    base_url: String,
    service_key: String,
}

impl SupabaseDb {
    /// Create a new PostgREST client from the app configuration.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| AppError::Database(format!("Failed to build HTTP client: {}", e)))?;

        tracing::info!(url = %config.supabase_url, "Supabase client initialized");

        Ok(Self {
            http: Some(http),
            base_url: format!("{}/rest/v1", config.supabase_url),
            service_key: config.supabase_service_key.clone(),
        })
    }

    /// Create a mock client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self {
            http: None,
            base_url: "http://offline.invalid/rest/v1".to_string(),
            service_key: String::new(),
        }
    }

    /// Helper to get the client or return an error if offline.
    fn get_http(&self) -> Result<&reqwest::Client, AppError> {
        self.http
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Profile Operations ──────────────────────────────────────

    /// Get profiles (name + avatar) for a set of user IDs.
    pub async fn get_profiles(&self, user_ids: &[String]) -> Result<Vec<Profile>, AppError> {
        if user_ids.is_empty() {
            return Ok(vec![]);
        }

        let id_list = user_ids
            .iter()
            .map(|id| urlencoding::encode(id).into_owned())
            .collect::<Vec<_>>()
            .join(",");
        let url = format!(
            "{}/{}?select=id,full_name,avatar_url&id=in.({})",
            self.base_url,
            tables::PROFILES,
            id_list
        );

        self.get_json(&url).await
    }

    // ─── Credential Operations ───────────────────────────────────

    /// Get the stored Strava credential for a user, if connected.
    pub async fn get_credential(
        &self,
        user_id: &str,
    ) -> Result<Option<StravaCredential>, AppError> {
        let url = format!(
            "{}/{}?select=strava_access_token,strava_refresh_token,strava_expires_at&id=eq.{}",
            self.base_url,
            tables::PROFILES,
            urlencoding::encode(user_id)
        );

        let mut rows: Vec<CredentialColumns> = self.get_json(&url).await?;
        let Some(row) = rows.pop() else {
            return Ok(None);
        };

        // A profile without an access token is simply not connected.
        // Missing expiry is treated as already expired so the broker
        // always refreshes before first use.
        Ok(row.strava_access_token.map(|access_token| StravaCredential {
            access_token,
            refresh_token: row.strava_refresh_token.unwrap_or_default(),
            expires_at: row.strava_expires_at.unwrap_or(0),
        }))
    }

    /// Store a Strava credential on the user's profile row.
    ///
    /// All three columns are written in one PATCH so a refreshed access
    /// token is never persisted without its rotated refresh token.
    pub async fn set_credential(
        &self,
        user_id: &str,
        credential: &StravaCredential,
    ) -> Result<(), AppError> {
        let url = format!(
            "{}/{}?id=eq.{}",
            self.base_url,
            tables::PROFILES,
            urlencoding::encode(user_id)
        );
        let body = serde_json::json!({
            "strava_access_token": credential.access_token,
            "strava_refresh_token": credential.refresh_token,
            "strava_expires_at": credential.expires_at,
        });

        let response = self
            .get_http()?
            .patch(&url)
            .headers(self.auth_headers())
            .header("Prefer", "return=minimal")
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        self.check_response(response).await
    }

    // ─── Challenge Operations ────────────────────────────────────

    /// Get a challenge by ID.
    pub async fn get_challenge(&self, challenge_id: &str) -> Result<Option<Challenge>, AppError> {
        let url = format!(
            "{}/{}?select=*&id=eq.{}",
            self.base_url,
            tables::CHALLENGES,
            urlencoding::encode(challenge_id)
        );

        let mut rows: Vec<Challenge> = self.get_json(&url).await?;
        Ok(rows.pop())
    }

    /// List all challenges, newest start date first (dashboard view).
    pub async fn list_challenges(&self) -> Result<Vec<Challenge>, AppError> {
        let url = format!(
            "{}/{}?select=*&order=start_date.desc",
            self.base_url,
            tables::CHALLENGES
        );
        self.get_json(&url).await
    }

    /// Create a challenge and return the stored row (with its new ID).
    pub async fn insert_challenge(&self, new: &NewChallenge) -> Result<Challenge, AppError> {
        let url = format!("{}/{}", self.base_url, tables::CHALLENGES);

        let response = self
            .get_http()?
            .post(&url)
            .headers(self.auth_headers())
            .header("Prefer", "return=representation")
            .json(new)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let mut rows: Vec<Challenge> = self.check_response_json(response).await?;
        rows.pop()
            .ok_or_else(|| AppError::Database("Insert returned no row".to_string()))
    }

    /// Replace a challenge's participant list.
    pub async fn set_participants(
        &self,
        challenge_id: &str,
        participants: &[String],
    ) -> Result<(), AppError> {
        let url = format!(
            "{}/{}?id=eq.{}",
            self.base_url,
            tables::CHALLENGES,
            urlencoding::encode(challenge_id)
        );
        let body = serde_json::json!({ "participants": participants });

        let response = self
            .get_http()?
            .patch(&url)
            .headers(self.auth_headers())
            .header("Prefer", "return=minimal")
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        self.check_response(response).await
    }

    /// Delete a challenge row.
    ///
    /// There is no foreign-key cascade; callers must remove the
    /// challenge's progress logs first (`delete_contributions`).
    pub async fn delete_challenge(&self, challenge_id: &str) -> Result<(), AppError> {
        let url = format!(
            "{}/{}?id=eq.{}",
            self.base_url,
            tables::CHALLENGES,
            urlencoding::encode(challenge_id)
        );
        self.delete(&url).await
    }

    // ─── Progress Log Operations ─────────────────────────────────

    /// List contributions for a challenge in insertion order.
    pub async fn list_contributions(
        &self,
        challenge_id: &str,
    ) -> Result<Vec<Contribution>, AppError> {
        let url = format!(
            "{}/{}?select=user_id,user_name,amount&challenge_id=eq.{}&order=created_at.asc",
            self.base_url,
            tables::PROGRESS_LOGS,
            urlencoding::encode(challenge_id)
        );
        self.get_json(&url).await
    }

    /// Append a contribution.
    pub async fn insert_contribution(&self, new: &NewContribution) -> Result<(), AppError> {
        let url = format!("{}/{}", self.base_url, tables::PROGRESS_LOGS);

        let response = self
            .get_http()?
            .post(&url)
            .headers(self.auth_headers())
            .header("Prefer", "return=minimal")
            .json(new)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        self.check_response(response).await
    }

    /// Delete all contributions logged against a challenge.
    pub async fn delete_contributions(&self, challenge_id: &str) -> Result<(), AppError> {
        let url = format!(
            "{}/{}?challenge_id=eq.{}",
            self.base_url,
            tables::PROGRESS_LOGS,
            urlencoding::encode(challenge_id)
        );
        self.delete(&url).await
    }

    // ─── Request Helpers ─────────────────────────────────────────

    fn auth_headers(&self) -> reqwest::header::HeaderMap {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Ok(value) = reqwest::header::HeaderValue::from_str(&self.service_key) {
            headers.insert("apikey", value);
        }
        if let Ok(value) =
            reqwest::header::HeaderValue::from_str(&format!("Bearer {}", self.service_key))
        {
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }
        headers
    }

    fn transport_error(&self, err: &reqwest::Error) -> AppError {
        if err.is_timeout() {
            return AppError::Timeout;
        }
        AppError::Database(format!("Request failed: {}", err))
    }

    /// Generic GET request with JSON response.
    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T, AppError> {
        let response = self
            .get_http()?
            .get(url)
            .headers(self.auth_headers())
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        self.check_response_json(response).await
    }

    /// Generic DELETE request against a filtered PostgREST URL.
    async fn delete(&self, url: &str) -> Result<(), AppError> {
        let response = self
            .get_http()?
            .delete(url)
            .headers(self.auth_headers())
            .header("Prefer", "return=minimal")
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        self.check_response(response).await
    }

    /// Check response status and return error if not successful.
    async fn check_response(&self, response: reqwest::Response) -> Result<(), AppError> {
        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(AppError::Database(format!("HTTP {}: {}", status, body)))
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Database(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Database(format!("JSON parse error: {}", e)))
    }
}

/// Nullable Strava credential columns on the profile row.
#[derive(Deserialize)]
struct CredentialColumns {
    strava_access_token: Option<String>,
    strava_refresh_token: Option<String>,
    strava_expires_at: Option<i64>,
}
