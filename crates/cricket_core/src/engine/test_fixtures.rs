//! Test Fixtures Module
//!
//! Centralized test helpers for engine tests.
//!
//! ## Usage
//! ```rust,ignore
//! #[cfg(test)]
//! use crate::engine::test_fixtures::*;
//! ```

use crate::models::{Fixture, Player, PlayerRole, Team};

// =============================================================================
// Team Creation Helpers
// =============================================================================

/// Create a playing XI with a conventional balance.
///
/// - 0..=4: specialist batsmen
/// - 5: wicketkeeper
/// - 6..=8: bowlers
/// - 9..=10: all-rounders
pub fn create_test_team(name: &str, tag: &str) -> Team {
    let mut players = Vec::with_capacity(11);

    for i in 0..11 {
        let (role, bat, bowl, field) = match i {
            0..=4 => (PlayerRole::Batsman, 70, 20, 60),
            5 => (PlayerRole::WicketKeeper, 60, 10, 80),
            6..=8 => (PlayerRole::Bowler, 25, 75, 60),
            _ => (PlayerRole::AllRounder, 55, 60, 65),
        };
        players.push(Player::new(&format!("{} Player {}", name, i + 1), role, bat, bowl, field));
    }

    Team::new(name, tag, players)
}

/// Same layout with every batting and bowling skill overridden.
pub fn create_test_team_with_skills(name: &str, tag: &str, batting: u8, bowling: u8) -> Team {
    let mut team = create_test_team(name, tag);
    for p in &mut team.players {
        p.batting_skill = batting;
        p.bowling_skill = bowling;
    }
    team
}

/// A side with only `n` players, all bowlers.
pub fn create_short_team(name: &str, tag: &str, n: usize) -> Team {
    let players = (0..n)
        .map(|i| Player::new(&format!("{} Player {}", name, i + 1), PlayerRole::Bowler, 50, 50, 50))
        .collect();
    Team::new(name, tag, players)
}

/// India (A) vs Australia (B)
pub fn create_test_fixture() -> Fixture {
    Fixture::new(create_test_team("India", "IND"), create_test_team("Australia", "AUS"))
}
