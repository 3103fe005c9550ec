// SPDX-License-Identifier: MIT

//! User profile model and Strava credential columns.

use serde::{Deserialize, Serialize};

/// User profile stored in the `profiles` table (one row per auth user).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Auth user UUID (also the row ID)
    pub id: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Strava OAuth credential, stored as columns on the user's profile row.
///
/// Mutated only by the token broker's refresh path. Callers must never
/// use the access token past `expires_at` minus the refresh margin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StravaCredential {
    pub access_token: String,
    pub refresh_token: String,
    /// Expiry as epoch seconds, as returned by Strava
    pub expires_at: i64,
}
