//! Per-innings scorecard: batting and bowling lines, extras, fall of wickets.

use serde::{Deserialize, Serialize};

use crate::models::{DeliveryOutcome, DismissalKind, Team};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dismissal {
    pub kind: DismissalKind,
    pub bowler: usize,
    pub fielder: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattingLine {
    pub runs: u16,
    pub balls: u16,
    pub fours: u16,
    pub sixes: u16,
    pub dismissal: Option<Dismissal>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BowlingLine {
    /// Legal deliveries
    pub balls: u16,
    pub runs: u16,
    pub wickets: u16,
    pub maidens: u16,
    pub wides: u16,
    pub no_balls: u16,
}

impl BowlingLine {
    pub fn economy(&self) -> Option<f32> {
        run_rate(self.runs, self.balls)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extras {
    pub wides: u16,
    pub no_balls: u16,
    pub byes: u16,
    pub leg_byes: u16,
}

impl Extras {
    pub fn total(&self) -> u16 {
        self.wides + self.no_balls + self.byes + self.leg_byes
    }

    pub fn record(&mut self, outcome: &DeliveryOutcome) {
        match *outcome {
            DeliveryOutcome::Wide(r) => self.wides += 1 + r as u16,
            DeliveryOutcome::NoBall(_) | DeliveryOutcome::NoBallRunOut { .. } => self.no_balls += 1,
            DeliveryOutcome::Bye(r) => self.byes += r as u16,
            DeliveryOutcome::LegBye(r) => self.leg_byes += r as u16,
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallOfWicket {
    pub wicket: u8,
    pub runs: u16,
    pub batsman: usize,
    /// Legal balls bowled in the innings when it fell
    pub balls: u16,
}

/// Running scorecard owned by the innings state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InningsCard {
    pub batting: Vec<BattingLine>,
    pub bowling: Vec<BowlingLine>,
    pub extras: Extras,
    pub fall_of_wickets: Vec<FallOfWicket>,
}

impl InningsCard {
    pub fn new(batting_players: usize, bowling_players: usize) -> Self {
        Self {
            batting: vec![BattingLine::default(); batting_players],
            bowling: vec![BowlingLine::default(); bowling_players],
            extras: Extras::default(),
            fall_of_wickets: Vec::new(),
        }
    }
}

// ============================================================================
// Rates / formatting
// ============================================================================

/// "45.3" for 273 legal balls
pub fn overs_display(balls: u16) -> String {
    format!("{}.{}", balls / 6, balls % 6)
}

/// Runs per six legal balls
pub fn run_rate(runs: u16, balls: u16) -> Option<f32> {
    if balls == 0 {
        return None;
    }
    Some(runs as f32 * 6.0 / balls as f32)
}

/// Runs per over still needed to pass `target`.
pub fn required_run_rate(target: u16, runs: u16, balls_left: u16) -> Option<f32> {
    if balls_left == 0 || runs > target {
        return None;
    }
    Some((target - runs + 1) as f32 * 6.0 / balls_left as f32)
}

// ============================================================================
// Summary
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattingSummaryLine {
    pub name: String,
    pub runs: u16,
    pub balls: u16,
    pub fours: u16,
    pub sixes: u16,
    pub how_out: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BowlingSummaryLine {
    pub name: String,
    pub overs: String,
    pub maidens: u16,
    pub runs: u16,
    pub wickets: u16,
    pub economy: Option<f32>,
}

/// Presentation-ready scorecard of one innings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InningsSummary {
    pub inning_num: u8,
    pub batting_team: String,
    pub bowling_team: String,
    pub runs: u16,
    pub wickets: u8,
    pub overs: String,
    pub legal_balls: u16,
    pub max_overs: u16,
    pub target: u16,
    pub extras: Extras,
    pub run_rate: Option<f32>,
    pub batting: Vec<BattingSummaryLine>,
    pub bowling: Vec<BowlingSummaryLine>,
    pub fall_of_wickets: Vec<FallOfWicket>,
}

/// Text such as "c Smith b Starc", "run out (Warner)", "not out".
pub fn describe_dismissal(line: &BattingLine, bowling: &Team) -> String {
    let name = |i: usize| bowling.players.get(i).map(|p| p.name.as_str()).unwrap_or("?");
    let Some(d) = line.dismissal else {
        return "not out".to_string();
    };
    match (d.kind, d.fielder) {
        (DismissalKind::Bowled, _) => format!("b {}", name(d.bowler)),
        (DismissalKind::Lbw, _) => format!("lbw b {}", name(d.bowler)),
        (DismissalKind::Caught, Some(f)) if f == d.bowler => format!("c & b {}", name(d.bowler)),
        (DismissalKind::Caught, Some(f)) => format!("c {} b {}", name(f), name(d.bowler)),
        (DismissalKind::Caught, None) => format!("c ? b {}", name(d.bowler)),
        (DismissalKind::Stumped, Some(f)) => format!("st {} b {}", name(f), name(d.bowler)),
        (DismissalKind::Stumped, None) => format!("st b {}", name(d.bowler)),
        (DismissalKind::RunOut, Some(f)) => format!("run out ({})", name(f)),
        (DismissalKind::RunOut, None) => "run out".to_string(),
    }
}
