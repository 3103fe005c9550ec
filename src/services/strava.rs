// SPDX-License-Identifier: MIT

//! Strava API client and token broker.
//!
//! Handles:
//! - Authorization-code exchange for the initial credential
//! - Access token refresh with a safety margin before expiry
//! - Activity listing for the import flow

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::db::SupabaseDb;
use crate::models::StravaCredential;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Margin before token expiration when we proactively refresh (5 minutes).
///
/// Avoids racing a token's real expiry against the network latency of the
/// API call made right after the freshness check.
const TOKEN_REFRESH_MARGIN_SECS: i64 = 5 * 60;

/// How far back the activity import looks.
const ACTIVITY_WINDOW_DAYS: i64 = 30;

/// Page size cap for the activity listing.
const ACTIVITY_PAGE_SIZE: u32 = 30;

/// Strava API client.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    base_url: String,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl StravaClient {
    /// Create a new Strava client with OAuth credentials.
    pub fn new(
        client_id: String,
        client_secret: String,
        timeout_secs: u64,
    ) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AppError::StravaApi(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: "https://www.strava.com/api/v3".to_string(),
            token_url: "https://www.strava.com/oauth/token".to_string(),
            client_id,
            client_secret,
        })
    }

    /// Exchange an authorization code for an initial credential.
    ///
    /// The client ID and secret come from the caller, not our config: the
    /// exchange endpoint serves whichever app registration the frontend
    /// initiated the OAuth flow with.
    pub async fn exchange_code(
        &self,
        code: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<StravaCredential, AppError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("code", code),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Timeout
                } else {
                    AppError::ExchangeFailed(format!("Request failed: {}", e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "Strava token exchange rejected");
            return Err(AppError::ExchangeFailed(format!("HTTP {}: {}", status, body)));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::ExchangeFailed(format!("JSON parse error: {}", e)))?;

        parse_token_payload(&payload)
            .ok_or_else(|| AppError::ExchangeFailed("Response missing access token".to_string()))
    }

    /// Refresh an expired access token.
    pub async fn refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<StravaCredential, AppError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Timeout
                } else {
                    AppError::RefreshFailed(format!("Request failed: {}", e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::RefreshFailed(format!("HTTP {}: {}", status, body)));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::RefreshFailed(format!("JSON parse error: {}", e)))?;

        parse_token_payload(&payload)
            .ok_or_else(|| AppError::RefreshFailed("Response missing access token".to_string()))
    }

    /// List the athlete's activities after a lower-bound timestamp.
    pub async fn list_activities(
        &self,
        access_token: &str,
        after: i64, // Unix timestamp
        per_page: u32,
    ) -> Result<Vec<StravaActivity>, AppError> {
        let url = format!("{}/athlete/activities", self.base_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("after", after.to_string()),
                ("per_page", per_page.to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::from_reqwest(&e, "Activity listing failed"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::StravaApi(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::StravaApi(format!("JSON parse error: {}", e)))
    }
}

/// Extract the credential triple from a token endpoint response.
///
/// Strava signals failure with an error payload instead of an HTTP error
/// in some flows, so presence of `access_token` is the success criterion
/// regardless of shape.
fn parse_token_payload(payload: &serde_json::Value) -> Option<StravaCredential> {
    let access_token = payload.get("access_token")?.as_str()?.to_string();
    let refresh_token = payload
        .get("refresh_token")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    let expires_at = payload
        .get("expires_at")
        .and_then(serde_json::Value::as_i64)
        .unwrap_or(0);

    Some(StravaCredential {
        access_token,
        refresh_token,
        expires_at,
    })
}

/// Check whether an access token is still usable at `now_secs`.
///
/// A token inside the refresh margin counts as stale even though Strava
/// would still accept it.
fn is_fresh(expires_at: i64, now_secs: i64) -> bool {
    now_secs <= expires_at - TOKEN_REFRESH_MARGIN_SECS
}

/// Activity summary from the Strava list endpoint.
///
/// Transient: consumed by the client to build a contribution via unit
/// conversion, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StravaActivity {
    pub id: u64,
    pub name: String,
    pub sport_type: Option<String>,
    pub start_date: String,
    /// Distance in meters
    pub distance: f64,
    /// Moving time in seconds
    pub moving_time: i64,
}

// ─────────────────────────────────────────────────────────────────────────────
// StravaService - token broker with per-user refresh locking
// ─────────────────────────────────────────────────────────────────────────────

/// Shared refresh locks type for use in AppState.
pub type RefreshLocks = Arc<DashMap<String, Arc<Mutex<()>>>>;

/// High-level Strava service that manages the credential lifecycle.
///
/// This service encapsulates:
/// - Credential retrieval from the profile row
/// - Automatic token refresh when expiring (with 5-minute margin)
/// - Persisting refreshed credentials in a single update
/// - Per-user locking so concurrent requests perform at most one refresh
#[derive(Clone)]
pub struct StravaService {
    client: StravaClient,
    db: SupabaseDb,
    /// Per-user mutex to serialize token refresh operations.
    refresh_locks: RefreshLocks,
}

impl StravaService {
    /// Create a new Strava service with shared refresh locks.
    pub fn new(
        client_id: String,
        client_secret: String,
        timeout_secs: u64,
        db: SupabaseDb,
        refresh_locks: RefreshLocks,
    ) -> Result<Self, AppError> {
        Ok(Self {
            client: StravaClient::new(client_id, client_secret, timeout_secs)?,
            db,
            refresh_locks,
        })
    }

    // ─── Token Management ────────────────────────────────────────

    /// Get a valid (non-expired) credential for the given user.
    ///
    /// Fast path: the stored credential is outside the refresh margin and
    /// is returned as-is. Otherwise a per-user lock is taken, the
    /// credential is re-read (another request may have refreshed while we
    /// waited), and only then is a refresh performed and persisted.
    ///
    /// A failed refresh leaves the stored credential untouched and is
    /// fatal for the current request; the user must re-authorize.
    pub async fn get_valid_token(&self, user_id: &str) -> Result<StravaCredential, AppError> {
        let credential = self
            .db
            .get_credential(user_id)
            .await?
            .ok_or(AppError::NotConnected)?;

        if is_fresh(credential.expires_at, Utc::now().timestamp()) {
            return Ok(credential);
        }

        // Serialize refreshes for this user. Strava rotates the refresh
        // token, so two concurrent refreshes would invalidate each other.
        let lock = self
            .refresh_locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let _guard = lock.lock().await;

        // Re-check after acquiring the lock: the request that held it
        // before us may already have refreshed and persisted.
        let credential = self
            .db
            .get_credential(user_id)
            .await?
            .ok_or(AppError::NotConnected)?;

        if is_fresh(credential.expires_at, Utc::now().timestamp()) {
            return Ok(credential);
        }

        tracing::info!(user_id, "Access token expired, refreshing");

        let refreshed = self.client.refresh_token(&credential.refresh_token).await?;

        // Single update: access token, rotated refresh token and expiry
        // land together before anyone can read the new credential.
        self.db.set_credential(user_id, &refreshed).await?;

        tracing::info!(user_id, "Token refreshed and stored");
        Ok(refreshed)
    }

    /// One-shot exchange of an authorization code for an initial credential.
    ///
    /// Performs no storage; the caller persists the triple (the web client
    /// saves it to the user's own profile row under RLS).
    pub async fn exchange_authorization_code(
        &self,
        code: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<StravaCredential, AppError> {
        self.client
            .exchange_code(code, client_id, client_secret)
            .await
    }

    // ─── API Wrappers ────────────────────────────────────────────

    /// List the user's recent activities (30-day window), transparently
    /// refreshing the credential first if needed.
    pub async fn list_recent_activities(
        &self,
        user_id: &str,
    ) -> Result<Vec<StravaActivity>, AppError> {
        let credential = self.get_valid_token(user_id).await?;

        let after = (Utc::now() - chrono::Duration::days(ACTIVITY_WINDOW_DAYS)).timestamp();
        self.client
            .list_activities(&credential.access_token, after, ACTIVITY_PAGE_SIZE)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_within_margin_is_stale() {
        let now = 1_700_000_000;
        // Expires in 100 seconds: inside the 5-minute margin, needs refresh
        assert!(!is_fresh(now + 100, now));
    }

    #[test]
    fn test_token_outside_margin_is_fresh() {
        let now = 1_700_000_000;
        assert!(is_fresh(now + 3600, now));
    }

    #[test]
    fn test_expired_token_is_stale() {
        let now = 1_700_000_000;
        assert!(!is_fresh(now - 1, now));
        assert!(!is_fresh(0, now));
    }

    #[test]
    fn test_margin_boundary() {
        let now = 1_700_000_000;
        assert!(is_fresh(now + TOKEN_REFRESH_MARGIN_SECS, now));
        assert!(!is_fresh(now + TOKEN_REFRESH_MARGIN_SECS - 1, now));
    }

    #[test]
    fn test_parse_token_payload_full_triple() {
        let payload = serde_json::json!({
            "access_token": "abc",
            "refresh_token": "def",
            "expires_at": 1_700_003_600,
        });

        let credential = parse_token_payload(&payload).expect("should parse");
        assert_eq!(credential.access_token, "abc");
        assert_eq!(credential.refresh_token, "def");
        assert_eq!(credential.expires_at, 1_700_003_600);
    }

    #[test]
    fn test_parse_token_payload_missing_access_token() {
        // Strava error payloads carry no access_token
        let payload = serde_json::json!({
            "message": "Bad Request",
            "errors": [{"resource": "RefreshToken", "code": "invalid"}],
        });

        assert!(parse_token_payload(&payload).is_none());
    }

    #[test]
    fn test_parse_token_payload_exchange_output_is_fresh() {
        // An exchange result with a future expiry passes the freshness
        // check immediately once persisted.
        let now = 1_700_000_000;
        let payload = serde_json::json!({
            "access_token": "abc",
            "refresh_token": "def",
            "expires_at": now + 6 * 3600,
        });

        let credential = parse_token_payload(&payload).expect("should parse");
        assert!(is_fresh(credential.expires_at, now));
    }
}
