// SPDX-License-Identifier: MIT

//! Challenge model for storage and API.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A group fitness challenge stored in the `challenges` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Challenge {
    /// Row UUID (assigned by the database)
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    /// Per-participant target; the group goal scales with the number of
    /// distinct contributors (see `services::progress`).
    pub goal: f64,
    /// Free-form unit label, e.g. "pushups", "km", "minutter"
    pub unit: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub creator_id: String,
    pub creator_name: Option<String>,
    /// User IDs of everyone who has joined (creator plus anyone who logged)
    pub participants: Option<Vec<String>>,
}

impl Challenge {
    /// Participant list, treating a missing column as empty.
    pub fn participant_ids(&self) -> &[String] {
        self.participants.as_deref().unwrap_or_default()
    }
}

/// Insert payload for a new challenge (the database assigns the ID).
#[derive(Debug, Clone, Serialize)]
pub struct NewChallenge {
    pub title: String,
    pub description: Option<String>,
    pub goal: f64,
    pub unit: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub creator_id: String,
    pub creator_name: Option<String>,
    pub participants: Vec<String>,
}
