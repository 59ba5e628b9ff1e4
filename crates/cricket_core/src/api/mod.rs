pub mod json_api;

pub use json_api::{play_match_json, MatchRequest, MatchResponse, TeamData, SCHEMA_VERSION};
