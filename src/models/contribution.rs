// SPDX-License-Identifier: MIT

//! Progress log entries ("contributions") toward a challenge.

use serde::{Deserialize, Serialize};

/// One logged amount toward a challenge, from the `progress_logs` table.
///
/// Append-only; a user may have any number of contributions to the same
/// challenge. Queries return them ordered by `created_at` ascending so
/// aggregation sees them in insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contribution {
    pub user_id: String,
    /// Display name recorded at log time (fallback when no profile name)
    pub user_name: Option<String>,
    pub amount: f64,
}

/// Insert payload for a new progress log.
#[derive(Debug, Clone, Serialize)]
pub struct NewContribution {
    pub challenge_id: String,
    pub user_id: String,
    pub user_name: Option<String>,
    pub amount: f64,
}
