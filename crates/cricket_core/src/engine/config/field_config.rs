//! Field geometry, in units of the playing-area radius

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldConfig {
    /// Boundary rope (default: 1.06)
    pub boundary_radius: f32,
    /// Carry beyond the rope needed for a six (default: 0.24)
    pub six_margin: f32,
    /// Scale applied to normalized fielder positions (default: 0.94)
    pub fielder_radius: f32,
    /// 30-yard circle (default: 0.45)
    pub inner_circle_radius: f32,
    /// Effective distance under which a mistimed shot is caught (default: 0.06)
    pub catch_radius: f32,
    /// Ground covered per fielding skill point (default: 0.0004)
    pub reach_per_skill: f32,
    /// Effective distance worth one safe run (default: 0.15)
    pub run_distance: f32,
    /// Cap on runs completed before the return (default: 3)
    pub max_running_runs: u8,

    // === Shot ===
    /// (default: 0.8)
    pub shot_distance_scale: f32,
    /// Upper bound of the random carry bonus (default: 0.05)
    pub shot_boost_max: f32,
    /// Timing is uniform in `[-spread, spread]` (default: 20)
    pub timing_spread: i32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            boundary_radius: 1.06,
            six_margin: 0.24,
            fielder_radius: 0.94,
            inner_circle_radius: 0.45,
            catch_radius: 0.06,
            reach_per_skill: 0.0004,
            run_distance: 0.15,
            max_running_runs: 3,

            shot_distance_scale: 0.8,
            shot_boost_max: 0.05,
            timing_spread: 20,
        }
    }
}

impl FieldConfig {
    pub fn six_radius(&self) -> f32 {
        self.boundary_radius + self.six_margin
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.inner_circle_radius <= 0.0 || self.inner_circle_radius >= self.boundary_radius {
            return Err(format!(
                "inner circle {} must lie inside the boundary {}",
                self.inner_circle_radius, self.boundary_radius
            ));
        }
        if self.fielder_radius <= 0.0 || self.fielder_radius > self.boundary_radius {
            return Err("fielders must stand inside the boundary".into());
        }
        if self.six_margin < 0.0 || self.catch_radius < 0.0 || self.reach_per_skill < 0.0 {
            return Err("field distances must not be negative".into());
        }
        if self.run_distance <= 0.0 || self.shot_distance_scale <= 0.0 {
            return Err("run distance and shot scale must be positive".into());
        }
        if self.shot_boost_max < 0.0 || self.timing_spread < 0 {
            return Err("shot randomness must not be negative".into());
        }
        Ok(())
    }
}
