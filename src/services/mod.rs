// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod motivation;
pub mod progress;
pub mod strava;

pub use motivation::MotivationService;
pub use progress::{ChallengeProgress, LeaderboardEntry};
pub use strava::{RefreshLocks, StravaActivity, StravaService};
