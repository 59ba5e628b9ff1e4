//! Rain stoppage settings

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherConfig {
    /// Chance of a stoppage after each completed over when rain is on (default: 0.1)
    pub default_rain_probability: f32,
    /// (default: 1)
    pub min_overs_lost: u16,
    /// (default: 5)
    pub max_overs_lost: u16,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self { default_rain_probability: 0.1, min_overs_lost: 1, max_overs_lost: 5 }
    }
}

impl WeatherConfig {
    pub fn overs_lost_range(&self) -> RangeInclusive<u16> {
        self.min_overs_lost..=self.max_overs_lost
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.default_rain_probability) {
            return Err(format!(
                "rain probability {} must lie within 0..=1",
                self.default_rain_probability
            ));
        }
        if self.min_overs_lost == 0 || self.min_overs_lost > self.max_overs_lost {
            return Err("overs lost range must be non-empty and start at 1 or more".into());
        }
        Ok(())
    }
}
