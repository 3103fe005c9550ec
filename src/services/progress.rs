// SPDX-License-Identifier: MIT

//! Progress aggregation for challenges.
//!
//! Pure computation over in-memory contributions: group totals, the
//! leaderboard, percentage-of-goal and linear time-expected progress.
//! No I/O, deterministic, and it never fails - missing inputs are
//! defensively defaulted instead.

use crate::models::{Challenge, Contribution, Profile};
use crate::services::strava::StravaActivity;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Display name when neither a profile name nor a log name is available.
const UNKNOWN_NAME: &str = "Ukjent";

/// One row of the derived leaderboard. Recomputed on every aggregation
/// call, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub name: String,
    pub total: f64,
    pub avatar_url: Option<String>,
}

/// Derived metrics for a challenge.
#[derive(Debug, Clone, Serialize)]
pub struct ChallengeProgress {
    /// Sum of all contribution amounts
    pub group_total: f64,
    /// Per-participant goal scaled by the number of distinct contributors
    pub group_goal: f64,
    /// Where the group "should" be now under a linear pacing model
    pub expected_total: f64,
    /// Group total as a percentage of the group goal, capped at 100
    pub percent_complete: f64,
    pub participant_count: u32,
    /// Unordered; entries appear in contribution insertion order so a
    /// descending sort by total breaks ties deterministically.
    pub leaderboard: Vec<LeaderboardEntry>,
}

/// Aggregate contributions into the derived challenge metrics.
///
/// The stored goal is a per-participant target: the group goal scales
/// with how many distinct users have contributed so far, not with the
/// challenge's nominal participant list. New contributors therefore
/// raise the group goal retroactively. That is deliberate, documented
/// policy, not an artifact of deduplication.
pub fn aggregate(
    challenge: &Challenge,
    contributions: &[Contribution],
    profiles: &[Profile],
    now: DateTime<Utc>,
) -> ChallengeProgress {
    let profile_by_id: HashMap<&str, &Profile> =
        profiles.iter().map(|p| (p.id.as_str(), p)).collect();

    let mut leaderboard: Vec<LeaderboardEntry> = Vec::new();
    let mut index_by_user: HashMap<String, usize> = HashMap::new();
    let mut group_total = 0.0;

    for log in contributions {
        group_total += log.amount;

        if let Some(&i) = index_by_user.get(&log.user_id) {
            leaderboard[i].total += log.amount;
            continue;
        }

        let profile = profile_by_id.get(log.user_id.as_str());
        let name = profile
            .and_then(|p| p.full_name.clone())
            .or_else(|| log.user_name.clone())
            .unwrap_or_else(|| UNKNOWN_NAME.to_string());

        index_by_user.insert(log.user_id.clone(), leaderboard.len());
        leaderboard.push(LeaderboardEntry {
            user_id: log.user_id.clone(),
            name,
            total: log.amount,
            avatar_url: profile.and_then(|p| p.avatar_url.clone()),
        });
    }

    // Floor of 1 so an untouched challenge still has a meaningful goal
    // and the pacing math never divides by zero.
    let participant_count = (leaderboard.len() as u32).max(1);
    let group_goal = challenge.goal * f64::from(participant_count);

    let ratio = pacing_ratio(challenge.start_date, challenge.end_date, now);
    let expected_total = group_goal * ratio;

    let percent_complete = if group_goal > 0.0 {
        (group_total / group_goal).min(1.0) * 100.0
    } else {
        0.0
    };

    ChallengeProgress {
        group_total,
        group_goal,
        expected_total,
        percent_complete,
        participant_count,
        leaderboard,
    }
}

/// Fraction of the challenge window elapsed at `now`, clamped to [0, 1].
///
/// Linear pacing: assumes a uniform contribution rate across the window.
/// A degenerate window (end on or before start) paces at 0.
pub fn pacing_ratio(start: NaiveDate, end: NaiveDate, now: DateTime<Utc>) -> f64 {
    let start_ts = start.and_time(NaiveTime::MIN).and_utc().timestamp();
    let end_ts = end.and_time(NaiveTime::MIN).and_utc().timestamp();

    if end_ts <= start_ts {
        return 0.0;
    }

    let elapsed = (now.timestamp() - start_ts) as f64;
    let window = (end_ts - start_ts) as f64;
    (elapsed / window).clamp(0.0, 1.0)
}

// ─── Unit Conversion ─────────────────────────────────────────────

/// Known unit tokens for converting imported activities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActivityUnit {
    Kilometers,
    /// Scandinavian mile (10 km)
    ScandinavianMiles,
    Meters,
    Minutes,
}

/// Tokens converted with the minutes formula.
///
/// "timer" (hours) is listed here on purpose: the web client has always
/// converted it as minutes, and logged amounts depend on that.
// TODO: confirm with the challenge owners whether "timer" should divide
// by 3600 instead; change MINUTE_TOKENS once settled.
const MINUTE_TOKENS: [&str; 3] = ["min", "minutter", "timer"];

impl ActivityUnit {
    fn from_token(unit: &str) -> Option<Self> {
        let token = unit.trim().to_lowercase();
        match token.as_str() {
            "km" | "kilometer" => Some(Self::Kilometers),
            "mil" => Some(Self::ScandinavianMiles),
            "m" | "meter" => Some(Self::Meters),
            t if MINUTE_TOKENS.contains(&t) => Some(Self::Minutes),
            _ => None,
        }
    }
}

/// Convert an imported activity to an amount in the challenge's unit.
///
/// Best-effort heuristic, not a unit system: an unrecognized unit falls
/// back to the kilometers formula rather than failing.
pub fn convert_activity(activity: &StravaActivity, unit: &str) -> f64 {
    let parsed = ActivityUnit::from_token(unit);
    if parsed.is_none() {
        tracing::debug!(unit, "Unrecognized challenge unit, falling back to km");
    }

    match parsed.unwrap_or(ActivityUnit::Kilometers) {
        ActivityUnit::Kilometers => round1(activity.distance / 1_000.0),
        ActivityUnit::ScandinavianMiles => round1(activity.distance / 10_000.0),
        ActivityUnit::Meters => activity.distance.floor(),
        ActivityUnit::Minutes => (activity.moving_time / 60) as f64,
    }
}

/// Round to one decimal place.
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
