//! Cricket CLI Library
//!
//! Roster encodings for the `cricket` binary:
//! flat CSV files (one row per player) and the JSON roster store.

pub mod roster_csv;
pub mod roster_store;

pub use roster_csv::{read_rosters, read_rosters_from, write_rosters, write_rosters_to, PlayerRow, TeamRow};
pub use roster_store::{sample_teams, JsonRoster};
