//! Validation module for player data
//!
//! Skill values outside `1..=100` must be rejected before the outcome
//! resolver ever sees them, so every roster passes through here first.

use crate::models::player::Player;
use std::fmt;
use std::ops::RangeInclusive;

/// Valid range for batting, bowling and fielding ratings
pub const SKILL_RANGE: RangeInclusive<u8> = 1..=100;
pub const MAX_NAME_LEN: usize = 64;
/// Team tags are short codes such as "IND" or "AUS"
pub const MAX_TAG_LEN: usize = 9;

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Name validation errors
    InvalidName(String),

    /// Skill rating outside 1..=100
    InvalidSkill { player: String, skill: &'static str, value: u8 },

    /// Team tag validation errors
    InvalidTag(String),

    /// Generic validation error
    ValidationFailed(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidName(msg) => write!(f, "Invalid name: {}", msg),
            ValidationError::InvalidSkill { player, skill, value } => {
                write!(f, "Invalid {} skill for {}: {}. Must be between 1 and 100", skill, player, value)
            }
            ValidationError::InvalidTag(msg) => write!(f, "Invalid team tag: {}", msg),
            ValidationError::ValidationFailed(msg) => write!(f, "Validation failed: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Player validation utility
pub struct PlayerValidator;

impl PlayerValidator {
    /// Validate player or team name (1-64 characters, no delimiters)
    pub fn validate_name(name: &str) -> Result<(), ValidationError> {
        if name.trim().is_empty() {
            return Err(ValidationError::InvalidName("Name cannot be empty".to_string()));
        }

        if name.chars().count() > MAX_NAME_LEN {
            return Err(ValidationError::InvalidName(format!(
                "Name cannot exceed {} characters",
                MAX_NAME_LEN
            )));
        }

        if name.chars().any(|c| c.is_control()) {
            return Err(ValidationError::InvalidName(
                "Name contains control characters".to_string(),
            ));
        }

        Ok(())
    }

    /// Validate a single skill rating
    pub fn validate_skill(player: &str, skill: &'static str, value: u8) -> Result<(), ValidationError> {
        if !SKILL_RANGE.contains(&value) {
            return Err(ValidationError::InvalidSkill { player: player.to_string(), skill, value });
        }
        Ok(())
    }

    /// Validate team tag (1-9 alphanumeric characters, used to re-resolve saved matches)
    pub fn validate_tag(tag: &str) -> Result<(), ValidationError> {
        if tag.is_empty() || tag.len() > MAX_TAG_LEN {
            return Err(ValidationError::InvalidTag(format!(
                "'{}' must be 1-{} characters",
                tag, MAX_TAG_LEN
            )));
        }
        if !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(ValidationError::InvalidTag(format!(
                "'{}' may only contain letters, digits and '-'",
                tag
            )));
        }
        Ok(())
    }

    /// Comprehensive validation for a roster entry
    pub fn validate_player(player: &Player) -> Result<(), ValidationError> {
        Self::validate_name(&player.name)?;
        Self::validate_skill(&player.name, "batting", player.batting_skill)?;
        Self::validate_skill(&player.name, "bowling", player.bowling_skill)?;
        Self::validate_skill(&player.name, "fielding", player.fielding_skill)?;
        Ok(())
    }
}
