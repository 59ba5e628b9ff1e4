//! # Engine Configuration Module
//!
//! Every tuning constant of the match engine lives here.
//!
//! ## Presets
//! - `realistic()` (default)
//! - `arcade()`: fewer extras, longer carry, more boundaries
//! - `deterministic()`: extras and no-contact dots off, used by tests
//!
//! ## Usage
//! ```rust
//! use cricket_core::engine::config::EngineConfig;
//!
//! let config = EngineConfig::default();
//! let arcade = EngineConfig::arcade();
//! ```

mod field_config;
mod resolver_config;
mod weather_config;

pub use field_config::FieldConfig;
pub use resolver_config::{DismissalWeights, ResolverConfig};
pub use weather_config::WeatherConfig;

use serde::{Deserialize, Serialize};

use crate::error::{MatchError, Result};
use crate::models::MatchFormat;

use super::toss::{TossCall, TossDecision};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct EngineConfig {
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub field: FieldConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
}

impl EngineConfig {
    pub fn realistic() -> Self {
        Self::default()
    }

    pub fn arcade() -> Self {
        let mut cfg = Self::default();
        cfg.resolver.wide_pct = 1.0;
        cfg.resolver.no_ball_pct = 0.5;
        cfg.resolver.bye_pct = 0.5;
        cfg.resolver.leg_bye_pct = 0.5;
        cfg.resolver.no_contact_base = 10;
        cfg.field.shot_distance_scale = 0.95;
        cfg.field.shot_boost_max = 0.1;
        cfg
    }

    pub fn deterministic() -> Self {
        let mut cfg = Self::default();
        cfg.resolver.no_contact = false;
        cfg.resolver.wide_pct = 0.0;
        cfg.resolver.no_ball_pct = 0.0;
        cfg.resolver.bye_pct = 0.0;
        cfg.resolver.leg_bye_pct = 0.0;
        cfg
    }

    pub fn validate(&self) -> Result<()> {
        self.resolver.validate().map_err(MatchError::InvalidConfig)?;
        self.field.validate().map_err(MatchError::InvalidConfig)?;
        self.weather.validate().map_err(MatchError::InvalidConfig)?;
        Ok(())
    }

    /// Parse and validate a YAML config; missing sections fall back to defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let cfg: EngineConfig =
            serde_yaml::from_str(yaml).map_err(|e| MatchError::InvalidConfig(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| MatchError::SerializationError(e.to_string()))
    }
}

/// Who supplies replacement batsmen and new bowlers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// The engine picks next-in-order batsmen and rotates bowlers itself
    #[default]
    Automatic,
    /// The innings pauses until the caller supplies the choice
    Deferred,
}

/// Per-match settings chosen at toss time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchSettings {
    pub format: MatchFormat,
    pub rain_enabled: bool,
    /// Stoppage chance per completed over; `None` uses the weather default
    #[serde(default)]
    pub rain_probability: Option<f32>,
    pub seed: u64,
    #[serde(default)]
    pub batsman_selection: SelectionMode,
    #[serde(default)]
    pub bowler_selection: SelectionMode,
    /// Overrides the generated `{A}_VS_{B}_{unix}` id
    #[serde(default)]
    pub match_id: Option<String>,
    /// Team A's call at the toss
    #[serde(default)]
    pub toss_call: TossCall,
    /// Applied if team A wins the toss
    #[serde(default)]
    pub toss_choice: TossDecision,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            format: MatchFormat::Odi,
            rain_enabled: false,
            rain_probability: None,
            seed: 0,
            batsman_selection: SelectionMode::Automatic,
            bowler_selection: SelectionMode::Automatic,
            match_id: None,
            toss_call: TossCall::Heads,
            toss_choice: TossDecision::Bat,
        }
    }
}

impl MatchSettings {
    pub fn new(format: MatchFormat, seed: u64) -> Self {
        Self { format, seed, ..Self::default() }
    }

    pub fn with_rain(mut self, enabled: bool) -> Self {
        self.rain_enabled = enabled;
        self
    }

    /// Effective per-over stoppage probability (0 when rain is off)
    pub fn rain_probability(&self, weather: &WeatherConfig) -> f32 {
        if !self.rain_enabled {
            return 0.0;
        }
        self.rain_probability.unwrap_or(weather.default_rain_probability)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(p) = self.rain_probability {
            if !(0.0..=1.0).contains(&p) {
                return Err(MatchError::InvalidConfig(format!(
                    "rain probability {} must lie within 0..=1",
                    p
                )));
            }
        }
        Ok(())
    }
}

// ========== Tests ==========

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.resolver.base_chance, 50);
        assert_eq!((cfg.resolver.chance_min, cfg.resolver.chance_max), (10, 90));
        assert!(cfg.resolver.no_contact);
        assert!((cfg.weather.default_rain_probability - 0.1).abs() < f32::EPSILON);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_arcade_has_fewer_extras() {
        let realistic = EngineConfig::realistic();
        let arcade = EngineConfig::arcade();
        assert!(arcade.resolver.extras_pct() < realistic.resolver.extras_pct());
        assert!(arcade.field.shot_distance_scale > realistic.field.shot_distance_scale);
        assert!(arcade.validate().is_ok());
    }

    #[test]
    fn test_deterministic_disables_noise() {
        let det = EngineConfig::deterministic();
        assert!(!det.resolver.no_contact);
        assert_eq!(det.resolver.extras_pct(), 0.0);
    }

    #[test]
    fn test_yaml_roundtrip_and_partial() {
        let cfg = EngineConfig::arcade();
        let yaml = cfg.to_yaml_string().unwrap();
        assert_eq!(EngineConfig::from_yaml_str(&yaml).unwrap(), cfg);

        let partial = "weather:\n  default_rain_probability: 0.3\n  min_overs_lost: 2\n  max_overs_lost: 4\n";
        let parsed = EngineConfig::from_yaml_str(partial).unwrap();
        assert_eq!(parsed.weather.min_overs_lost, 2);
        assert_eq!(parsed.resolver, ResolverConfig::default());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut cfg = EngineConfig::default();
        cfg.field.inner_circle_radius = 2.0;
        assert!(matches!(cfg.validate(), Err(MatchError::InvalidConfig(_))));

        let mut cfg = EngineConfig::default();
        cfg.resolver.chance_min = 95;
        assert!(cfg.validate().is_err());

        let bad = "weather:\n  default_rain_probability: 1.5\n  min_overs_lost: 1\n  max_overs_lost: 5\n";
        assert!(EngineConfig::from_yaml_str(bad).is_err());
    }

    #[test]
    fn test_rain_probability_resolution() {
        let weather = WeatherConfig::default();
        let settings = MatchSettings::new(MatchFormat::Odi, 7);
        assert_eq!(settings.rain_probability(&weather), 0.0);

        let rainy = settings.clone().with_rain(true);
        assert!((rainy.rain_probability(&weather) - 0.1).abs() < f32::EPSILON);

        let mut custom = rainy;
        custom.rain_probability = Some(1.0);
        assert_eq!(custom.rain_probability(&weather), 1.0);
        custom.rain_probability = Some(-0.5);
        assert!(custom.validate().is_err());
    }
}
