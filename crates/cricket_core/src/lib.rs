//! # cricket_core - Deterministic Limited-Overs Cricket Simulation Engine
//!
//! Ball-by-ball simulation of a two-innings match between two rosters.
//!
//! ## Features
//! - 100% deterministic simulation (same seed = same match)
//! - Skill-driven outcome resolution with shot placement and fielding
//! - Bowler rotation, powerplay fielding caps, free hits and rain stoppages
//! - Resumable snapshots and a per-delivery CSV log
//! - JSON API for front ends

// Struct initialization pattern used intentionally
#![allow(clippy::field_reassign_with_default)]

pub mod api;
pub mod ball_log;
pub mod engine;
pub mod error;
pub mod models;
pub mod player;
pub mod roster;
pub mod save;

// Re-export main API functions
pub use api::{play_match_json, MatchRequest, MatchResponse};
pub use engine::{
    play_match, EngineConfig, MatchOutcome, MatchProgress, MatchResult, MatchRunner, MatchSettings, SelectionMode,
};
pub use error::{MatchError, Result};
pub use models::{DeliveryOutcome, DismissalKind, Fixture, MatchFormat, Player, PlayerRole, Team, TeamSide};
pub use roster::{InMemoryRoster, RosterProvider};
