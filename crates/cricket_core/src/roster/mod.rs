//! Roster boundary
//!
//! The engine only ever looks teams up by tag (when resuming a saved match)
//! and writes them back once career totals change. Where the teams live is
//! the provider's business.

use std::collections::BTreeMap;

use crate::error::{MatchError, Result};
use crate::models::Team;

pub trait RosterProvider {
    /// Team registered under `tag`, if any.
    fn team_by_tag(&self, tag: &str) -> Option<Team>;

    /// Insert or replace the team with the same tag.
    fn store_team(&mut self, team: Team) -> Result<()>;

    fn tags(&self) -> Vec<String>;

    fn require_team(&self, tag: &str) -> Result<Team> {
        self.team_by_tag(tag).ok_or_else(|| MatchError::UnknownTeamTag(tag.to_string()))
    }
}

/// In-memory roster, keyed by tag.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRoster {
    teams: BTreeMap<String, Team>,
}

impl InMemoryRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_teams(teams: impl IntoIterator<Item = Team>) -> Result<Self> {
        let mut roster = Self::new();
        for team in teams {
            roster.store_team(team)?;
        }
        Ok(roster)
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}

impl RosterProvider for InMemoryRoster {
    fn team_by_tag(&self, tag: &str) -> Option<Team> {
        self.teams.get(tag).filter(|t| !t.is_deleted).cloned()
    }

    fn store_team(&mut self, team: Team) -> Result<()> {
        team.validate()?;
        self.teams.insert(team.tag.clone(), team);
        Ok(())
    }

    fn tags(&self) -> Vec<String> {
        self.teams.values().filter(|t| !t.is_deleted).map(|t| t.tag.clone()).collect()
    }
}
