// SPDX-License-Identifier: MIT

//! Spurt: social fitness challenges with friends
//!
//! This crate provides the backend API for group challenges: aggregated
//! progress and leaderboards, Strava activity import with transparent
//! token refresh, and AI-generated motivational messages.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::SupabaseDb;
use services::{MotivationService, StravaService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: SupabaseDb,
    pub strava_service: StravaService,
    pub motivation_service: MotivationService,
}
