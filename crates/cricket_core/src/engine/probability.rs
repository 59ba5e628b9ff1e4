//! Probability calculation utilities for the outcome resolver
//!
//! All functions are pure - they take skills as input and return a chance
//! in percent. This allows easy unit testing without an RNG or innings.

use super::config::ResolverConfig;

// ============================================================================
// Scoring / Dismissal
// ============================================================================

/// Chance (percent) that a delivery is scored off.
///
/// `clamp(base + (bat - bowl) / run_divisor, min, max)`
#[inline]
pub fn run_chance(cfg: &ResolverConfig, bat_skill: u8, bowl_skill: u8) -> i32 {
    let diff = bat_skill as i32 - bowl_skill as i32;
    (cfg.base_chance + diff / cfg.run_divisor).clamp(cfg.chance_min, cfg.chance_max)
}

/// Chance (percent) that a non-scoring delivery takes a wicket.
///
/// `clamp(base + (bowl - bat) / out_divisor, min, max)`
#[inline]
pub fn out_chance(cfg: &ResolverConfig, bat_skill: u8, bowl_skill: u8) -> i32 {
    let diff = bowl_skill as i32 - bat_skill as i32;
    (cfg.base_chance + diff / cfg.out_divisor).clamp(cfg.chance_min, cfg.chance_max)
}

/// Chance (percent) the batsman plays and misses outright.
///
/// `clamp(20 + (bowl - bat) / 4, 5, 50)` with the default constants.
#[inline]
pub fn no_contact_chance(cfg: &ResolverConfig, bat_skill: u8, bowl_skill: u8) -> i32 {
    let diff = bowl_skill as i32 - bat_skill as i32;
    (cfg.no_contact_base + diff / cfg.no_contact_divisor).clamp(cfg.no_contact_min, cfg.no_contact_max)
}

// ============================================================================
// Shot placement
// ============================================================================

/// Landing distance of a shot of the given quality, before the random carry.
///
/// `scale * (0.3 + (quality + 30) / 100)`, never negative.
#[inline]
pub fn shot_distance(distance_scale: f32, quality: i32) -> f32 {
    (distance_scale * (0.3 + (quality + 30) as f32 / 100.0)).max(0.0)
}

/// Distance a fielder effectively has to cover, after their skill.
#[inline]
pub fn effective_fielding_distance(raw_distance: f32, fielding_skill: u8, reach_per_skill: f32) -> f32 {
    raw_distance - fielding_skill as f32 * reach_per_skill
}

// ========== Tests ==========

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> ResolverConfig {
        ResolverConfig::default()
    }

    #[test]
    fn test_equal_skills_are_even() {
        assert_eq!(run_chance(&cfg(), 60, 60), 50);
        assert_eq!(out_chance(&cfg(), 60, 60), 50);
        assert_eq!(no_contact_chance(&cfg(), 60, 60), 20);
    }

    #[test]
    fn test_extreme_gap_clamps() {
        // raw: 50 + 99/2 = 99 and 50 - 99/4 = 26
        assert_eq!(run_chance(&cfg(), 100, 1), 90);
        assert_eq!(out_chance(&cfg(), 100, 1), 26);
        // raw: 50 - 49 = 1 and 50 + 24 = 74
        assert_eq!(run_chance(&cfg(), 1, 100), 10);
        assert_eq!(out_chance(&cfg(), 1, 100), 74);
        assert_eq!(no_contact_chance(&cfg(), 100, 1), 5);
        assert_eq!(no_contact_chance(&cfg(), 1, 100), 44);
    }

    #[test]
    fn test_chances_never_leave_bounds() {
        for bat in 1..=100u8 {
            for bowl in 1..=100u8 {
                let r = run_chance(&cfg(), bat, bowl);
                let o = out_chance(&cfg(), bat, bowl);
                let n = no_contact_chance(&cfg(), bat, bowl);
                assert!((10..=90).contains(&r));
                assert!((10..=90).contains(&o));
                assert!((5..=50).contains(&n));
            }
        }
    }

    #[test]
    fn test_out_chance_hits_both_clamps_with_tight_divisor() {
        let mut tight = cfg();
        tight.out_divisor = 1;
        assert_eq!(out_chance(&tight, 1, 100), 90);
        assert_eq!(out_chance(&tight, 100, 1), 10);
    }

    #[test]
    fn test_shot_distance() {
        assert!((shot_distance(0.8, 0) - 0.48).abs() < 1e-6);
        assert_eq!(shot_distance(0.8, -100), 0.0);
        assert!(shot_distance(0.8, 80) > 1.06);
        assert!((effective_fielding_distance(0.2, 100, 0.0004) - 0.16).abs() < 1e-6);
    }
}
