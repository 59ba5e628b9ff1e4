//! Outcome resolver tuning

use serde::{Deserialize, Serialize};

/// Probability constants for one delivery.
///
/// All chances are percentages on a `[0, 100)` uniform draw.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolverConfig {
    // === Scoring / dismissal split ===
    /// Base chance before the skill gap is applied (default: 50)
    pub base_chance: i32,
    /// `P_run = base + (bat - bowl) / run_divisor` (default: 2)
    pub run_divisor: i32,
    /// `P_out = base + (bowl - bat) / out_divisor` (default: 4)
    pub out_divisor: i32,
    /// Lower clamp for both chances (default: 10)
    pub chance_min: i32,
    /// Upper clamp for both chances (default: 90)
    pub chance_max: i32,

    // === No-contact dot ===
    pub no_contact: bool,
    /// (default: 20)
    pub no_contact_base: i32,
    /// (default: 4)
    pub no_contact_divisor: i32,
    /// (default: 5)
    pub no_contact_min: i32,
    /// (default: 50)
    pub no_contact_max: i32,

    // === Extras (percent per delivery) ===
    pub wide_pct: f32,
    pub no_ball_pct: f32,
    pub bye_pct: f32,
    pub leg_bye_pct: f32,

    /// Relative weights for resolver-decided dismissals
    pub dismissal_weights: DismissalWeights,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DismissalWeights {
    pub bowled: u32,
    pub caught: u32,
    pub lbw: u32,
    pub stumped: u32,
}

impl Default for DismissalWeights {
    fn default() -> Self {
        // bowled / caught at even odds
        Self { bowled: 1, caught: 1, lbw: 0, stumped: 0 }
    }
}

impl DismissalWeights {
    pub fn total(&self) -> u32 {
        self.bowled + self.caught + self.lbw + self.stumped
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            base_chance: 50,
            run_divisor: 2,
            out_divisor: 4,
            chance_min: 10,
            chance_max: 90,

            no_contact: true,
            no_contact_base: 20,
            no_contact_divisor: 4,
            no_contact_min: 5,
            no_contact_max: 50,

            wide_pct: 3.0,
            no_ball_pct: 1.0,
            bye_pct: 1.0,
            leg_bye_pct: 1.5,

            dismissal_weights: DismissalWeights::default(),
        }
    }
}

impl ResolverConfig {
    pub fn extras_pct(&self) -> f32 {
        self.wide_pct + self.no_ball_pct + self.bye_pct + self.leg_bye_pct
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.run_divisor <= 0 || self.out_divisor <= 0 || self.no_contact_divisor <= 0 {
            return Err("resolver divisors must be positive".into());
        }
        if !(0..=100).contains(&self.chance_min)
            || !(0..=100).contains(&self.chance_max)
            || self.chance_min > self.chance_max
        {
            return Err(format!(
                "chance clamp {}..={} must lie within 0..=100",
                self.chance_min, self.chance_max
            ));
        }
        if self.no_contact_min > self.no_contact_max || self.no_contact_max > 100 || self.no_contact_min < 0 {
            return Err("no-contact clamp must lie within 0..=100".into());
        }
        for (name, pct) in [
            ("wide_pct", self.wide_pct),
            ("no_ball_pct", self.no_ball_pct),
            ("bye_pct", self.bye_pct),
            ("leg_bye_pct", self.leg_bye_pct),
        ] {
            if !(0.0..=100.0).contains(&pct) {
                return Err(format!("{} must be a percentage, got {}", name, pct));
            }
        }
        if self.extras_pct() >= 100.0 {
            return Err("extras rates leave no room for legal deliveries".into());
        }
        if self.dismissal_weights.total() == 0 {
            return Err("at least one dismissal weight must be non-zero".into());
        }
        Ok(())
    }
}
