//! Flat-file roster encoding
//!
//! Two headerless CSV files:
//! - teams: `name,tag,is_deleted,is_hidden,captain,vice_captain`
//! - players: one row per player, keyed by team tag, in squad order
//!
//! Every player field (career totals included) round-trips exactly.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::Path;

use cricket_core::models::{BattingHand, BowlingStyle, CareerStats, Player, PlayerRole, Team};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRow {
    pub name: String,
    pub tag: String,
    pub is_deleted: u8,
    pub is_hidden: u8,
    pub captain: Option<usize>,
    pub vice_captain: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRow {
    pub team: String,
    pub name: String,
    /// 0=Batsman 1=Bowler 2=AllRounder 3=WicketKeeper
    pub role: u8,
    pub batting_hand: String,
    pub bowling_style: String,
    pub is_wicketkeeper: u8,
    pub is_active: u8,
    pub batting_skill: u8,
    pub bowling_skill: u8,
    pub fielding_skill: u8,
    pub matches_played: u32,
    pub runs: u32,
    pub wickets: u32,
    pub stumpings: u32,
    pub run_outs: u32,
}

impl PlayerRow {
    pub fn from_player(team_tag: &str, p: &Player) -> Self {
        Self {
            team: team_tag.to_string(),
            name: p.name.clone(),
            role: p.role.code(),
            batting_hand: p.batting_hand.code().to_string(),
            bowling_style: p.bowling_style.code().to_string(),
            is_wicketkeeper: p.is_wicketkeeper as u8,
            is_active: p.is_active as u8,
            batting_skill: p.batting_skill,
            bowling_skill: p.bowling_skill,
            fielding_skill: p.fielding_skill,
            matches_played: p.career.matches_played,
            runs: p.career.runs,
            wickets: p.career.wickets,
            stumpings: p.career.stumpings,
            run_outs: p.career.run_outs,
        }
    }

    pub fn into_player(self) -> Result<Player> {
        let role = PlayerRole::from_code(self.role)
            .with_context(|| format!("{}: unknown role code {}", self.name, self.role))?;
        let hand: BattingHand = self.batting_hand.parse()?;
        let style: BowlingStyle = self.bowling_style.parse()?;

        let mut player = Player::new(&self.name, role, self.batting_skill, self.bowling_skill, self.fielding_skill)
            .with_batting_hand(hand)
            .with_bowling_style(style);
        player.is_wicketkeeper = self.is_wicketkeeper != 0;
        player.is_active = self.is_active != 0;
        player.career = CareerStats {
            matches_played: self.matches_played,
            runs: self.runs,
            wickets: self.wickets,
            stumpings: self.stumpings,
            run_outs: self.run_outs,
        };
        Ok(player)
    }
}

fn reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new().has_headers(false).trim(csv::Trim::All).from_reader(input)
}

fn writer<W: Write>(output: W) -> csv::Writer<W> {
    csv::WriterBuilder::new().has_headers(false).from_writer(output)
}

/// Parse both files. Players whose team tag is unknown are an error.
pub fn read_rosters_from<R1: Read, R2: Read>(teams: R1, players: R2) -> Result<Vec<Team>> {
    let mut order = Vec::new();
    let mut by_tag: BTreeMap<String, Team> = BTreeMap::new();

    for (line, row) in reader(teams).deserialize::<TeamRow>().enumerate() {
        let row = row.with_context(|| format!("teams line {}", line + 1))?;
        if by_tag.contains_key(&row.tag) {
            bail!("teams line {}: duplicate tag {}", line + 1, row.tag);
        }
        let mut team = Team::new(&row.name, &row.tag, Vec::new());
        team.is_deleted = row.is_deleted != 0;
        team.is_hidden = row.is_hidden != 0;
        team.captain = row.captain;
        team.vice_captain = row.vice_captain;
        order.push(row.tag.clone());
        by_tag.insert(row.tag, team);
    }

    for (line, row) in reader(players).deserialize::<PlayerRow>().enumerate() {
        let row = row.with_context(|| format!("players line {}", line + 1))?;
        let team = by_tag
            .get_mut(&row.team)
            .with_context(|| format!("players line {}: unknown team {}", line + 1, row.team))?;
        team.players.push(row.into_player()?);
    }

    let teams: Vec<Team> = order.iter().filter_map(|tag| by_tag.remove(tag)).collect();
    for team in &teams {
        team.validate().with_context(|| format!("team {}", team.tag))?;
    }
    Ok(teams)
}

pub fn write_rosters_to<W1: Write, W2: Write>(teams: &[Team], teams_out: W1, players_out: W2) -> Result<()> {
    let mut tw = writer(teams_out);
    let mut pw = writer(players_out);

    for team in teams {
        tw.serialize(TeamRow {
            name: team.name.clone(),
            tag: team.tag.clone(),
            is_deleted: team.is_deleted as u8,
            is_hidden: team.is_hidden as u8,
            captain: team.captain,
            vice_captain: team.vice_captain,
        })?;
        for p in &team.players {
            pw.serialize(PlayerRow::from_player(&team.tag, p))?;
        }
    }
    tw.flush()?;
    pw.flush()?;
    Ok(())
}

pub fn read_rosters(teams_path: &Path, players_path: &Path) -> Result<Vec<Team>> {
    let teams = std::fs::File::open(teams_path)
        .with_context(|| format!("Failed to open teams file: {}", teams_path.display()))?;
    let players = std::fs::File::open(players_path)
        .with_context(|| format!("Failed to open players file: {}", players_path.display()))?;
    read_rosters_from(teams, players)
}

pub fn write_rosters(teams: &[Team], teams_path: &Path, players_path: &Path) -> Result<()> {
    for path in [teams_path, players_path] {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }
    let teams_out = std::fs::File::create(teams_path)
        .with_context(|| format!("Failed to create teams file: {}", teams_path.display()))?;
    let players_out = std::fs::File::create(players_path)
        .with_context(|| format!("Failed to create players file: {}", players_path.display()))?;
    write_rosters_to(teams, teams_out, players_out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster_store::sample_teams;

    #[test]
    fn test_roundtrip_is_exact() -> Result<()> {
        let mut teams = sample_teams();
        teams[0].players[3].career = CareerStats { matches_played: 12, runs: 410, wickets: 3, stumpings: 0, run_outs: 2 };
        teams[0].captain = Some(2);
        teams[1].is_hidden = true;
        teams[1].players[10].is_active = false;

        let (mut t, mut p) = (Vec::new(), Vec::new());
        write_rosters_to(&teams, &mut t, &mut p)?;
        let back = read_rosters_from(t.as_slice(), p.as_slice())?;

        assert_eq!(back, teams);
        Ok(())
    }

    #[test]
    fn test_parses_hand_written_rows() -> Result<()> {
        let teams = "Chennai,CHE,0,0,,\n";
        let players = "CHE, Opener One ,0,LHB,,0,1,72,15,60,0,0,0,0,0\n\
                       CHE,Keeper,3,RHB,NONE,1,1,55,5,85,4,90,0,3,1\n\
                       CHE,Quick,1,RHB,RF,0,1,20,80,55,0,0,0,0,0\n";
        let back = read_rosters_from(teams.as_bytes(), players.as_bytes())?;

        let che = &back[0];
        assert_eq!(che.players.len(), 3);
        assert_eq!(che.players[0].name, "Opener One");
        assert_eq!(che.players[0].batting_hand, BattingHand::Left);
        assert_eq!(che.players[0].bowling_style, BowlingStyle::None);
        assert_eq!(che.wicketkeeper(), Some(1));
        assert_eq!(che.players[1].career.stumpings, 3);
        assert_eq!(che.players[2].bowling_style, BowlingStyle::Rf);
        Ok(())
    }

    #[test]
    fn test_rejects_bad_rows() {
        let teams = "Chennai,CHE,0,0,,\n";
        assert!(read_rosters_from(teams.as_bytes(), "MUM,X,0,RHB,,0,1,50,50,50,0,0,0,0,0\n".as_bytes()).is_err());
        assert!(read_rosters_from(teams.as_bytes(), "CHE,X,7,RHB,,0,1,50,50,50,0,0,0,0,0\n".as_bytes()).is_err());
        // skill out of range
        assert!(read_rosters_from(teams.as_bytes(), "CHE,X,0,RHB,,0,1,0,50,50,0,0,0,0,0\n".as_bytes()).is_err());
        assert!(read_rosters_from("A,DUP,0,0,,\nB,DUP,0,0,,\n".as_bytes(), "".as_bytes()).is_err());
    }
}
