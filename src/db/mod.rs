// SPDX-License-Identifier: MIT

//! Database layer (Supabase/PostgREST).

pub mod supabase;

pub use supabase::SupabaseDb;

/// Table names as constants.
pub mod tables {
    pub const PROFILES: &str = "profiles";
    pub const CHALLENGES: &str = "challenges";
    pub const PROGRESS_LOGS: &str = "progress_logs";
}
