use std::fmt;

use crate::player::ValidationError;

/// Errors raised by the simulation core.
///
/// Configuration variants abort the requested action (a match cannot start,
/// a snapshot cannot be resumed). Logic variants mean the driving code asked
/// the engine for something the rules forbid; they are never clamped away.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchError {
    // --- configuration ---
    InvalidSkill { player: String, skill: &'static str, value: u8 },
    InsufficientPlayers { team: String, kind: &'static str, required: usize, found: usize },
    InvalidTeam(String),
    UnknownTeamTag(String),
    InvalidConfig(String),

    // --- logic / invariant violations ---
    InningsOver,
    AwaitingSelection(&'static str),
    IneligibleBowler { index: usize, reason: &'static str },
    IneligibleBatsman { index: usize, reason: &'static str },
    InvalidOversChange { current: u16, requested: u16 },
    NoEligibleBowler { team: String },
    InvalidFielder(usize),

    SerializationError(String),
    DeserializationError(String),
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MatchError::InvalidSkill { player, skill, value } => {
                write!(f, "Invalid {} skill for {}: {} (must be 1-100)", skill, player, value)
            }
            MatchError::InsufficientPlayers { team, kind, required, found } => {
                write!(f, "{} needs at least {} eligible {}, found {}", team, required, kind, found)
            }
            MatchError::InvalidTeam(msg) => write!(f, "Invalid team: {}", msg),
            MatchError::UnknownTeamTag(tag) => write!(f, "No team found for tag '{}'", tag),
            MatchError::InvalidConfig(msg) => write!(f, "Invalid engine config: {}", msg),
            MatchError::InningsOver => write!(f, "Innings is already over"),
            MatchError::AwaitingSelection(what) => {
                write!(f, "Delivery cannot be bowled while awaiting {} selection", what)
            }
            MatchError::IneligibleBowler { index, reason } => {
                write!(f, "Player {} cannot bowl: {}", index, reason)
            }
            MatchError::IneligibleBatsman { index, reason } => {
                write!(f, "Player {} cannot bat: {}", index, reason)
            }
            MatchError::InvalidOversChange { current, requested } => {
                write!(f, "Max overs may only decrease: {} -> {} rejected", current, requested)
            }
            MatchError::NoEligibleBowler { team } => {
                write!(f, "{} has no eligible bowler left", team)
            }
            MatchError::InvalidFielder(index) => write!(f, "Invalid fielder index: {}", index),
            MatchError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            MatchError::DeserializationError(msg) => write!(f, "Deserialization error: {}", msg),
        }
    }
}

impl std::error::Error for MatchError {}

impl MatchError {
    /// Configuration errors stop a match from starting or resuming. Everything
    /// else is either a defect in the caller or a codec failure.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            MatchError::InvalidSkill { .. }
                | MatchError::InsufficientPlayers { .. }
                | MatchError::InvalidTeam(_)
                | MatchError::UnknownTeamTag(_)
                | MatchError::InvalidConfig(_)
        )
    }
}

impl From<serde_json::Error> for MatchError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() {
            MatchError::DeserializationError(err.to_string())
        } else {
            MatchError::SerializationError(err.to_string())
        }
    }
}

impl From<ValidationError> for MatchError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidSkill { player, skill, value } => {
                MatchError::InvalidSkill { player, skill, value }
            }
            other => MatchError::InvalidTeam(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, MatchError>;
