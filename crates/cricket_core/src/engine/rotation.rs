//! Bowler rotation policy
//!
//! The next bowler is the next nominal bowler (bowler or all-rounder) in
//! squad order after the one who just finished, skipping anyone who bowled
//! the previous over or has used up their delivery cap. When no nominal
//! bowler is left, anyone eligible in rotation order bowls, the wicketkeeper
//! last.

use crate::error::{MatchError, Result};
use crate::models::Team;

/// Eligibility inputs for one bowling side during an innings.
#[derive(Debug, Clone, Copy)]
pub struct BowlingLimits<'a> {
    /// Bowler of the over just completed
    pub previous: Option<usize>,
    /// Legal deliveries each player has bowled this innings
    pub deliveries: &'a [u16],
    /// Per-innings delivery cap for the format
    pub cap: Option<u16>,
}

impl BowlingLimits<'_> {
    fn bowled(&self, index: usize) -> u16 {
        self.deliveries.get(index).copied().unwrap_or(0)
    }

    fn capped(&self, index: usize) -> bool {
        self.cap.is_some_and(|cap| self.bowled(index) >= cap)
    }
}

/// Why `index` may not bowl the next over, if anything.
pub fn check_bowler(team: &Team, index: usize, limits: &BowlingLimits) -> Result<()> {
    let Some(player) = team.players.get(index) else {
        return Err(MatchError::IneligibleBowler { index, reason: "no such player" });
    };
    if !player.is_active {
        return Err(MatchError::IneligibleBowler { index, reason: "player is inactive" });
    }
    if limits.previous == Some(index) {
        return Err(MatchError::IneligibleBowler { index, reason: "bowled the previous over" });
    }
    if limits.capped(index) {
        return Err(MatchError::IneligibleBowler { index, reason: "reached the delivery cap" });
    }
    Ok(())
}

/// Every player who may bowl the next over, in squad order.
pub fn eligible_bowlers(team: &Team, limits: &BowlingLimits) -> Vec<usize> {
    (0..team.players.len()).filter(|&i| check_bowler(team, i, limits).is_ok()).collect()
}

/// Pick the bowler for the next over.
pub fn select_next_bowler(team: &Team, limits: &BowlingLimits) -> Result<usize> {
    let n = team.players.len();
    if n == 0 {
        return Err(MatchError::NoEligibleBowler { team: team.name.clone() });
    }

    let start = limits.previous.map(|p| p + 1).unwrap_or(0);
    let rotation: Vec<usize> = (0..n).map(|k| (start + k) % n).collect();
    let ok = |i: usize| check_bowler(team, i, limits).is_ok();

    let nominal = rotation.iter().copied().find(|&i| ok(i) && team.players[i].role.is_bowling_option());
    if let Some(i) = nominal {
        return Ok(i);
    }

    let fallback = rotation
        .iter()
        .copied()
        .find(|&i| ok(i) && !team.players[i].is_wicketkeeper)
        .or_else(|| rotation.iter().copied().find(|&i| ok(i)));

    match fallback {
        Some(i) => {
            tracing::debug!(team = %team.name, bowler = i, "no nominal bowler left, falling back");
            Ok(i)
        }
        None => Err(MatchError::NoEligibleBowler { team: team.name.clone() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_fixtures::create_test_team;

    #[test]
    fn test_rotation_cycles_nominal_bowlers() {
        // bowlers sit at 6..=10
        let team = create_test_team("England", "ENG");
        let none = [0u16; 11];
        let mut limits = BowlingLimits { previous: None, deliveries: &none, cap: Some(60) };

        let mut order = Vec::new();
        for _ in 0..6 {
            let next = select_next_bowler(&team, &limits).unwrap();
            order.push(next);
            limits.previous = Some(next);
        }
        assert_eq!(order, vec![6, 7, 8, 9, 10, 6]);
    }

    #[test]
    fn test_never_previous_bowler() {
        let team = create_test_team("England", "ENG");
        let none = [0u16; 11];
        for prev in 0..11 {
            let limits = BowlingLimits { previous: Some(prev), deliveries: &none, cap: Some(60) };
            assert_ne!(select_next_bowler(&team, &limits).unwrap(), prev);
        }
    }

    #[test]
    fn test_capped_bowlers_skipped_then_fallback() {
        let team = create_test_team("England", "ENG");
        let mut bowled = [0u16; 11];
        for b in bowled.iter_mut().skip(6) {
            *b = 60;
        }
        let limits = BowlingLimits { previous: Some(10), deliveries: &bowled, cap: Some(60) };
        let next = select_next_bowler(&team, &limits).unwrap();
        assert!(next < 6);
        assert!(!team.players[next].is_wicketkeeper);
    }

    #[test]
    fn test_no_eligible_bowler() {
        let team = create_test_team("England", "ENG");
        let bowled = [24u16; 11];
        let limits = BowlingLimits { previous: None, deliveries: &bowled, cap: Some(24) };
        assert!(matches!(
            select_next_bowler(&team, &limits),
            Err(MatchError::NoEligibleBowler { .. })
        ));
        assert!(eligible_bowlers(&team, &limits).is_empty());
    }

    #[test]
    fn test_check_bowler_reasons() {
        let team = create_test_team("England", "ENG");
        let bowled = [0u16; 11];
        let limits = BowlingLimits { previous: Some(7), deliveries: &bowled, cap: None };
        assert!(check_bowler(&team, 8, &limits).is_ok());
        assert_eq!(
            check_bowler(&team, 7, &limits),
            Err(MatchError::IneligibleBowler { index: 7, reason: "bowled the previous over" })
        );
        assert!(check_bowler(&team, 42, &limits).is_err());
    }
}
