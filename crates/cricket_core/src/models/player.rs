use crate::player::{PlayerValidator, ValidationError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Player data for the match simulation engine.
///
/// # Boundary Contract
/// - Owned by the roster provider; the engine only touches `match_stats`
///   during a match and folds them into `career` once the match completes.
/// - Every field round-trips exactly through JSON and the CSV roster format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub name: String,
    pub role: PlayerRole,

    pub batting_hand: BattingHand,
    #[serde(default)]
    pub bowling_style: BowlingStyle,
    #[serde(default)]
    pub is_wicketkeeper: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,

    /// Skills (1-100)
    pub batting_skill: u8,
    pub bowling_skill: u8,
    pub fielding_skill: u8,

    #[serde(default)]
    pub career: CareerStats,

    /// Counters for the match in progress (reset at toss time)
    #[serde(default)]
    pub match_stats: MatchCounters,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PlayerRole {
    Batsman,
    Bowler,
    AllRounder,
    WicketKeeper,
}

impl PlayerRole {
    /// Decode from the numeric codes used by flat-file rosters (0=Batsman ... 3=WicketKeeper).
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(PlayerRole::Batsman),
            1 => Some(PlayerRole::Bowler),
            2 => Some(PlayerRole::AllRounder),
            3 => Some(PlayerRole::WicketKeeper),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            PlayerRole::Batsman => 0,
            PlayerRole::Bowler => 1,
            PlayerRole::AllRounder => 2,
            PlayerRole::WicketKeeper => 3,
        }
    }

    /// Nominal bowling options for the rotation policy
    pub fn is_bowling_option(&self) -> bool {
        matches!(self, PlayerRole::Bowler | PlayerRole::AllRounder)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum BattingHand {
    #[default]
    #[serde(rename = "RHB")]
    Right,
    #[serde(rename = "LHB")]
    Left,
}

impl BattingHand {
    pub fn code(&self) -> &'static str {
        match self {
            BattingHand::Right => "RHB",
            BattingHand::Left => "LHB",
        }
    }
}

impl FromStr for BattingHand {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RHB" | "R" | "RIGHT" => Ok(BattingHand::Right),
            "LHB" | "L" | "LEFT" => Ok(BattingHand::Left),
            other => Err(ValidationError::ValidationFailed(format!("Unknown batting hand: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum BowlingStyle {
    #[default]
    None,
    // Pace
    /// Right-arm fast
    Rf,
    /// Right-arm fast-medium
    Rfm,
    /// Right-arm medium
    Rm,
    /// Left-arm fast
    Lf,
    /// Left-arm fast-medium
    Lfm,
    /// Left-arm medium
    Lm,
    // Spin
    /// Right-arm off-spin
    Ob,
    /// Right-arm leg-spin
    Lb,
    /// Left-arm orthodox spin
    Sla,
    /// Left-arm wrist-spin
    Lws,
}

impl BowlingStyle {
    pub const ALL: [BowlingStyle; 11] = [
        BowlingStyle::None,
        BowlingStyle::Rf,
        BowlingStyle::Rfm,
        BowlingStyle::Rm,
        BowlingStyle::Lf,
        BowlingStyle::Lfm,
        BowlingStyle::Lm,
        BowlingStyle::Ob,
        BowlingStyle::Lb,
        BowlingStyle::Sla,
        BowlingStyle::Lws,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            BowlingStyle::None => "NONE",
            BowlingStyle::Rf => "RF",
            BowlingStyle::Rfm => "RFM",
            BowlingStyle::Rm => "RM",
            BowlingStyle::Lf => "LF",
            BowlingStyle::Lfm => "LFM",
            BowlingStyle::Lm => "LM",
            BowlingStyle::Ob => "OB",
            BowlingStyle::Lb => "LB",
            BowlingStyle::Sla => "SLA",
            BowlingStyle::Lws => "LWS",
        }
    }

    pub fn is_spin(&self) -> bool {
        matches!(self, BowlingStyle::Ob | BowlingStyle::Lb | BowlingStyle::Sla | BowlingStyle::Lws)
    }
}

impl FromStr for BowlingStyle {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        if upper.is_empty() {
            return Ok(BowlingStyle::None);
        }
        BowlingStyle::ALL
            .iter()
            .copied()
            .find(|style| style.code() == upper)
            .ok_or_else(|| ValidationError::ValidationFailed(format!("Unknown bowling style: {}", s)))
    }
}

/// Cumulative career statistics
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CareerStats {
    pub matches_played: u32,
    pub runs: u32,
    pub wickets: u32,
    pub stumpings: u32,
    pub run_outs: u32,
}

/// Per-match counters, folded into `CareerStats` when the match completes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct MatchCounters {
    pub balls_faced: u32,
    pub runs_scored: u32,
    pub balls_bowled: u32,
    pub runs_conceded: u32,
    pub wickets: u32,
    pub stumpings: u32,
    pub run_outs: u32,
}

impl Player {
    pub fn new(name: &str, role: PlayerRole, batting: u8, bowling: u8, fielding: u8) -> Self {
        Self {
            name: name.to_string(),
            role,
            batting_hand: BattingHand::Right,
            bowling_style: if role.is_bowling_option() { BowlingStyle::Rm } else { BowlingStyle::None },
            is_wicketkeeper: role == PlayerRole::WicketKeeper,
            is_active: true,
            batting_skill: batting,
            bowling_skill: bowling,
            fielding_skill: fielding,
            career: CareerStats::default(),
            match_stats: MatchCounters::default(),
        }
    }

    pub fn with_batting_hand(mut self, hand: BattingHand) -> Self {
        self.batting_hand = hand;
        self
    }

    pub fn with_bowling_style(mut self, style: BowlingStyle) -> Self {
        self.bowling_style = style;
        self
    }

    pub fn is_left_handed(&self) -> bool {
        self.batting_hand == BattingHand::Left
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        PlayerValidator::validate_player(self)
    }

    /// Fold this match's counters into the career totals.
    pub fn commit_match_stats(&mut self) {
        self.career.matches_played += 1;
        self.career.runs += self.match_stats.runs_scored;
        self.career.wickets += self.match_stats.wickets;
        self.career.stumpings += self.match_stats.stumpings;
        self.career.run_outs += self.match_stats.run_outs;
    }

    pub fn economy(&self) -> Option<f32> {
        if self.match_stats.balls_bowled == 0 {
            return None;
        }
        Some(self.match_stats.runs_conceded as f32 * 6.0 / self.match_stats.balls_bowled as f32)
    }
}
