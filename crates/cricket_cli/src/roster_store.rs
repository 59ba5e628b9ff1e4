//! JSON roster store
//!
//! The CLI's Roster Provider: every team in one pretty-printed JSON file,
//! kept in memory and written back atomically on [`JsonRoster::save`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use cricket_core::error::Result as CoreResult;
use cricket_core::models::{BattingHand, BowlingStyle, Player, PlayerRole, Team};
use cricket_core::roster::RosterProvider;

#[derive(Debug, Default, Serialize, Deserialize)]
struct RosterFile {
    teams: Vec<Team>,
}

#[derive(Debug, Clone)]
pub struct JsonRoster {
    path: PathBuf,
    teams: BTreeMap<String, Team>,
}

impl JsonRoster {
    /// Open `path`; a missing file is an empty roster.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let teams = if path.exists() {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read roster: {}", path.display()))?;
            let file: RosterFile = serde_json::from_str(&json).context("Failed to parse roster JSON")?;
            file.teams
        } else {
            Vec::new()
        };

        let mut roster = Self { path, teams: BTreeMap::new() };
        for team in teams {
            roster.store_team(team)?;
        }
        Ok(roster)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every team, hidden and deleted ones included.
    pub fn all_teams(&self) -> Vec<Team> {
        self.teams.values().cloned().collect()
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let file = RosterFile { teams: self.all_teams() };
        let json = serde_json::to_string_pretty(&file)?;

        let temp = self.path.with_extension("tmp");
        std::fs::write(&temp, json).with_context(|| format!("Failed to write {}", temp.display()))?;
        std::fs::rename(&temp, &self.path)
            .with_context(|| format!("Failed to replace roster: {}", self.path.display()))?;
        tracing::debug!(path = %self.path.display(), teams = file.teams.len(), "roster saved");
        Ok(())
    }

    /// Fold finished-match career totals back into the stored squad.
    pub fn record_match(&mut self, xi: &Team) -> Result<()> {
        let mut team = self.team_by_tag(&xi.tag).with_context(|| format!("team {} not in roster", xi.tag))?;
        team.absorb_career_updates(xi);
        self.store_team(team)?;
        Ok(())
    }
}

impl RosterProvider for JsonRoster {
    fn team_by_tag(&self, tag: &str) -> Option<Team> {
        self.teams.get(tag).filter(|t| !t.is_deleted).cloned()
    }

    fn store_team(&mut self, team: Team) -> CoreResult<()> {
        team.validate()?;
        self.teams.insert(team.tag.clone(), team);
        Ok(())
    }

    fn tags(&self) -> Vec<String> {
        self.teams.values().filter(|t| !t.is_deleted && !t.is_hidden).map(|t| t.tag.clone()).collect()
    }
}

// ============================================================================
// Starter squads
// ============================================================================

fn squad(names: [&str; 11], left_handers: &[usize]) -> Vec<Player> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let (role, bat, bowl, field, style) = match i {
                0 | 1 => (PlayerRole::Batsman, 74 - i as u8 * 2, 15, 65, BowlingStyle::None),
                2..=4 => (PlayerRole::Batsman, 70 - i as u8, 25, 62, BowlingStyle::Ob),
                5 => (PlayerRole::WicketKeeper, 58, 5, 84, BowlingStyle::None),
                6 => (PlayerRole::AllRounder, 55, 62, 66, BowlingStyle::Rfm),
                7 => (PlayerRole::AllRounder, 48, 66, 60, BowlingStyle::Sla),
                8 => (PlayerRole::Bowler, 28, 78, 58, BowlingStyle::Rf),
                9 => (PlayerRole::Bowler, 22, 74, 55, BowlingStyle::Lfm),
                _ => (PlayerRole::Bowler, 18, 72, 52, BowlingStyle::Lb),
            };
            let hand = if left_handers.contains(&i) { BattingHand::Left } else { BattingHand::Right };
            Player::new(name, role, bat, bowl, field).with_batting_hand(hand).with_bowling_style(style)
        })
        .collect()
}

/// Two balanced sides for `roster init`.
pub fn sample_teams() -> Vec<Team> {
    let mut harbour = Team::new(
        "Harbour Hawks",
        "HAW",
        squad(
            [
                "Arjun Mehta", "Tom Lacey", "Ravi Shankar", "Will Carter", "Sam Oduya", "Ben Foster",
                "Imran Qadir", "Leo Hart", "Dan Pryce", "Kofi Mensah", "Nathan Greig",
            ],
            &[1, 4],
        ),
    );
    harbour.captain = Some(2);

    let mut valley = Team::new(
        "Valley Vipers",
        "VIP",
        squad(
            [
                "Marcus Reid", "Hamza Sheikh", "Joel Kirby", "Ashwin Rao", "Callum Doyle", "Priya Nair",
                "Ollie Shaw", "Tariq Bashir", "Finn Walsh", "Rory Quinn", "Dev Patel",
            ],
            &[0, 3],
        ),
    );
    valley.captain = Some(0);

    vec![harbour, valley]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sample_teams_are_valid() {
        for team in sample_teams() {
            assert!(team.validate().is_ok());
            assert_eq!(team.players.len(), 11);
            assert_eq!(team.wicketkeeper(), Some(5));
            assert!(team.eligible_bowlers() >= 5);
        }
    }

    #[test]
    fn test_open_save_reopen() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("data").join("roster.json");

        let mut roster = JsonRoster::open(&path)?;
        assert!(roster.tags().is_empty());
        for team in sample_teams() {
            roster.store_team(team)?;
        }
        roster.save()?;

        let reopened = JsonRoster::open(&path)?;
        assert_eq!(reopened.tags(), vec!["HAW".to_string(), "VIP".to_string()]);
        assert_eq!(reopened.team_by_tag("VIP"), roster.team_by_tag("VIP"));
        assert!(!path.with_extension("tmp").exists());
        Ok(())
    }

    #[test]
    fn test_record_match_updates_careers() -> Result<()> {
        let dir = TempDir::new()?;
        let mut roster = JsonRoster::open(dir.path().join("roster.json"))?;
        for team in sample_teams() {
            roster.store_team(team)?;
        }

        let mut xi = roster.require_team("HAW")?.playing_xi();
        xi.players[0].career.matches_played = 1;
        xi.players[0].career.runs = 57;
        roster.record_match(&xi)?;

        let stored = roster.require_team("HAW")?;
        assert_eq!(stored.players[0].career.runs, 57);
        assert!(roster.record_match(&Team::new("Nobody", "NOB", Vec::new())).is_err());
        Ok(())
    }

    #[test]
    fn test_hidden_and_deleted() -> Result<()> {
        let dir = TempDir::new()?;
        let mut roster = JsonRoster::open(dir.path().join("roster.json"))?;
        let mut teams = sample_teams();
        teams[0].is_hidden = true;
        teams[1].is_deleted = true;
        for team in teams {
            roster.store_team(team)?;
        }
        assert!(roster.tags().is_empty());
        // hidden teams can still be resolved for a saved match
        assert!(roster.team_by_tag("HAW").is_some());
        assert!(roster.team_by_tag("VIP").is_none());
        assert_eq!(roster.all_teams().len(), 2);
        Ok(())
    }
}
