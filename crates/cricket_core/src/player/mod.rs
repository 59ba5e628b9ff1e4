//! Player data validation
//!
//! Skill ratings, names and team tags are checked here before a roster is
//! allowed anywhere near the simulation engine.

pub mod validation;

pub use validation::{PlayerValidator, ValidationError, MAX_NAME_LEN, MAX_TAG_LEN, SKILL_RANGE};
