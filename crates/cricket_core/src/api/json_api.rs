use serde::{Deserialize, Serialize};

use crate::ball_log::{BallLog, LogRow, MemoryBallLog};
use crate::engine::{
    EngineConfig, InningsSummary, MatchProgress, MatchResult, MatchRunner, MatchSettings, SelectionMode, TossCall,
    TossDecision,
};
use crate::models::{MatchFormat, Player, Team};

pub const SCHEMA_VERSION: u8 = 1;

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub schema_version: u8,
    pub seed: u64,
    pub team_a: TeamData,
    pub team_b: TeamData,
    /// "T20", "ODI" or "TEST"
    pub format: String,
    #[serde(default)]
    pub rain: bool,
    /// Per-over stoppage chance (0-1); engine default when absent
    #[serde(default)]
    pub rain_probability: Option<f32>,
    /// Team A's call
    #[serde(default)]
    pub toss_call: TossCall,
    /// Team A's choice if it wins the toss
    #[serde(default)]
    pub toss_choice: TossDecision,
    #[serde(default)]
    pub match_id: Option<String>,
    /// Return the delivery log rows as well
    #[serde(default)]
    pub include_deliveries: bool,
    /// YAML engine config overriding the default preset
    #[serde(default)]
    pub engine_config: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TeamData {
    pub name: String,
    pub tag: String,
    pub players: Vec<Player>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MatchResponse {
    pub schema_version: u8,
    pub match_id: String,
    pub seed: u64,
    pub result: MatchResult,
    pub summary: String,
    pub winner: Option<String>,
    pub toss: String,
    pub innings: Vec<InningsSummary>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deliveries: Vec<LogRow>,
    /// Updated career totals, team A then team B
    pub teams: Vec<Team>,
}

fn convert_team(data: TeamData) -> Team {
    Team::new(&data.name, &data.tag, data.players)
}

/// Play a complete match described by a JSON request.
///
/// Selections are automatic; the delivery log is kept in memory and returned
/// when `include_deliveries` is set.
pub fn play_match_json(request_json: &str) -> Result<String, String> {
    let request: MatchRequest =
        serde_json::from_str(request_json).map_err(|e| format!("Invalid JSON request: {}", e))?;

    if request.schema_version != SCHEMA_VERSION {
        return Err(format!("Unsupported schema version: {}", request.schema_version));
    }

    let format: MatchFormat = request.format.parse().map_err(|e| format!("{}", e))?;
    let config = match &request.engine_config {
        Some(yaml) => EngineConfig::from_yaml_str(yaml).map_err(|e| format!("Engine config: {}", e))?,
        None => EngineConfig::default(),
    };

    let settings = MatchSettings {
        format,
        rain_enabled: request.rain,
        rain_probability: request.rain_probability,
        seed: request.seed,
        batsman_selection: SelectionMode::Automatic,
        bowler_selection: SelectionMode::Automatic,
        match_id: request.match_id,
        toss_call: request.toss_call,
        toss_choice: request.toss_choice,
    };

    let team_a = convert_team(request.team_a);
    let team_b = convert_team(request.team_b);

    let mut runner = MatchRunner::new(team_a, team_b, settings, config).map_err(|e| e.to_string())?;
    let mut log = MemoryBallLog::default();

    loop {
        match runner.step().map_err(|e| e.to_string())? {
            MatchProgress::Delivered(record) if request.include_deliveries => {
                let (batting, bowling) = runner.fixture().split(runner.innings().batting_side());
                log.record(&LogRow::from_record(&record, batting, bowling)).map_err(|e| e.to_string())?;
            }
            MatchProgress::Finished => break,
            MatchProgress::AwaitingBatsman | MatchProgress::AwaitingBowler => {
                return Err("selection awaited in an automatic match".to_string());
            }
            _ => {}
        }
    }

    let outcome = runner.outcome().cloned().ok_or("match did not finish")?;
    let response = MatchResponse {
        schema_version: SCHEMA_VERSION,
        match_id: outcome.match_id,
        seed: request.seed,
        result: outcome.result,
        summary: outcome.summary,
        winner: outcome.winner_name,
        toss: outcome.toss_summary,
        innings: outcome.innings,
        deliveries: log.rows,
        teams: runner.into_fixture().teams.into_iter().collect(),
    };

    serde_json::to_string(&response).map_err(|e| format!("Failed to serialize response: {}", e))
}
