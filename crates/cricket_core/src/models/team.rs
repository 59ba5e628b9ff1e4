use super::player::BowlingStyle;
use super::Player;
use crate::error::{MatchError, Result};
use crate::player::PlayerValidator;
use serde::{Deserialize, Serialize};

/// Squad capacity of a stored team
pub const MAX_PLAYERS: usize = 22;
/// Players taking the field in a match
pub const PLAYING_XI: usize = 11;
/// Minimum batsmen and bowlers a side needs before the toss
pub const MIN_ELIGIBLE: usize = 2;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Team {
    pub name: String,
    /// Short code used to re-resolve the team from a saved match
    pub tag: String,
    pub players: Vec<Player>, // up to 22, first 11 active players take the field
    #[serde(default)]
    pub captain: Option<usize>,
    #[serde(default)]
    pub vice_captain: Option<usize>,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub is_hidden: bool,
}

impl Team {
    pub fn new(name: &str, tag: &str, players: Vec<Player>) -> Self {
        Self {
            name: name.to_string(),
            tag: tag.to_string(),
            players,
            captain: None,
            vice_captain: None,
            is_deleted: false,
            is_hidden: false,
        }
    }

    /// Roster-level checks: names, tag, skills, capacity and unique player names.
    pub fn validate(&self) -> Result<()> {
        PlayerValidator::validate_name(&self.name)?;
        PlayerValidator::validate_tag(&self.tag)?;

        if self.players.len() > MAX_PLAYERS {
            return Err(MatchError::InvalidTeam(format!(
                "{} has {} players (max {})",
                self.name,
                self.players.len(),
                MAX_PLAYERS
            )));
        }

        for (i, player) in self.players.iter().enumerate() {
            PlayerValidator::validate_player(player)?;
            if self.players[..i].iter().any(|p| p.name == player.name) {
                return Err(MatchError::InvalidTeam(format!(
                    "{} lists {} twice",
                    self.name, player.name
                )));
            }
        }

        for (label, idx) in [("captain", self.captain), ("vice-captain", self.vice_captain)] {
            if let Some(i) = idx {
                if i >= self.players.len() {
                    return Err(MatchError::InvalidTeam(format!(
                        "{} {} index {} out of range",
                        self.name, label, i
                    )));
                }
            }
        }
        Ok(())
    }

    /// The side that takes the field: the first eleven active players,
    /// in roster order, with per-match counters reset.
    pub fn playing_xi(&self) -> Team {
        let players = self
            .players
            .iter()
            .filter(|p| p.is_active)
            .take(PLAYING_XI)
            .cloned()
            .map(|mut p| {
                p.match_stats = Default::default();
                p
            })
            .collect();

        Team {
            name: self.name.clone(),
            tag: self.tag.clone(),
            players,
            captain: None,
            vice_captain: None,
            is_deleted: false,
            is_hidden: false,
        }
    }

    pub fn eligible_batsmen(&self) -> usize {
        self.players.iter().filter(|p| p.is_active).count()
    }

    /// Players with a bowling role or a declared bowling style
    pub fn eligible_bowlers(&self) -> usize {
        self.players
            .iter()
            .filter(|p| p.is_active)
            .filter(|p| p.role.is_bowling_option() || p.bowling_style != BowlingStyle::None)
            .count()
    }

    /// Wickets that end the innings: ten, or fewer for a short side.
    pub fn all_out_wickets(&self) -> u8 {
        self.eligible_batsmen().saturating_sub(1).min(10) as u8
    }

    pub fn wicketkeeper(&self) -> Option<usize> {
        self.players.iter().position(|p| p.is_wicketkeeper)
    }

    /// Fold every player's match counters into their career totals.
    pub fn commit_match_stats(&mut self) {
        for player in &mut self.players {
            player.commit_match_stats();
        }
    }

    /// Copy career totals from a finished playing XI back onto this roster,
    /// matching players by name.
    pub fn absorb_career_updates(&mut self, xi: &Team) {
        for played in &xi.players {
            if let Some(p) = self.players.iter_mut().find(|p| p.name == played.name) {
                p.career = played.career;
            }
        }
    }
}

/// Which of the two fixture teams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamSide {
    A,
    B,
}

impl TeamSide {
    #[inline]
    pub const fn other(self) -> Self {
        match self {
            TeamSide::A => TeamSide::B,
            TeamSide::B => TeamSide::A,
        }
    }

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            TeamSide::A => 0,
            TeamSide::B => 1,
        }
    }
}

/// The two playing elevens of a match.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Fixture {
    pub teams: [Team; 2],
}

impl Fixture {
    pub fn new(team_a: Team, team_b: Team) -> Self {
        Self { teams: [team_a, team_b] }
    }

    pub fn team(&self, side: TeamSide) -> &Team {
        &self.teams[side.index()]
    }

    pub fn team_mut(&mut self, side: TeamSide) -> &mut Team {
        &mut self.teams[side.index()]
    }

    /// Borrow (batting, bowling) at once.
    pub fn split(&self, batting: TeamSide) -> (&Team, &Team) {
        let [a, b] = &self.teams;
        match batting {
            TeamSide::A => (a, b),
            TeamSide::B => (b, a),
        }
    }

    pub fn split_mut(&mut self, batting: TeamSide) -> (&mut Team, &mut Team) {
        let [a, b] = &mut self.teams;
        match batting {
            TeamSide::A => (a, b),
            TeamSide::B => (b, a),
        }
    }

    pub fn side_of_tag(&self, tag: &str) -> Option<TeamSide> {
        if self.teams[0].tag == tag {
            Some(TeamSide::A)
        } else if self.teams[1].tag == tag {
            Some(TeamSide::B)
        } else {
            None
        }
    }
}
