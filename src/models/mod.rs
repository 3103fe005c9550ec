// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod challenge;
pub mod contribution;
pub mod profile;

pub use challenge::{Challenge, NewChallenge};
pub use contribution::{Contribution, NewContribution};
pub use profile::{Profile, StravaCredential};
