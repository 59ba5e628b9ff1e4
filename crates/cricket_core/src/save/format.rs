use super::error::SaveError;
use super::SNAPSHOT_VERSION;
use crate::engine::config::SelectionMode;
use crate::engine::innings::InningsState;
use crate::engine::scorecard::InningsCard;
use crate::engine::toss::TossResult;
use crate::models::{MatchFormat, PowerplayPhase};
use serde::{Deserialize, Serialize};

use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use rmp_serde::{from_slice, to_vec_named};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;

/// Resumable state of a match in progress.
///
/// The first block is the flat key set every snapshot version carries; the
/// rest was added in version 1 and is rebuilt by migration for older files.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MatchSnapshot {
    /// Snapshot format version for migration
    #[serde(default)]
    pub version: u32,

    /// Save timestamp (unix milliseconds)
    #[serde(default)]
    pub timestamp: u64,

    pub batting_team_tag: String,
    pub bowling_team_tag: String,
    pub total_runs: u16,
    pub wickets: u8,
    pub overs_completed: u16,
    pub balls_bowled_in_over: u8,
    /// Fielding restriction phase, 1-3
    pub current_powerplay: u8,
    pub striker_idx: Option<usize>,
    pub non_striker_idx: Option<usize>,
    pub bowler_idx: Option<usize>,
    pub max_overs: u16,
    pub target: u16,
    /// Chance of a stoppage after each over, 0-100
    pub rain_percentage: u8,
    pub match_id: String,
    /// "T20", "ODI" or "TEST"
    pub format: String,
    pub inning_num: u8,

    // --- version 1 ---
    /// Side that called the toss
    #[serde(default)]
    pub team_a_tag: String,
    #[serde(default)]
    pub team_b_tag: String,
    #[serde(default)]
    pub seed: u64,
    /// Position of the match RNG stream
    #[serde(default)]
    pub rng_word_pos: u64,
    #[serde(default)]
    pub previous_bowler_idx: Option<usize>,
    #[serde(default)]
    pub awaiting_batsman: bool,
    #[serde(default)]
    pub awaiting_bowler: bool,
    #[serde(default)]
    pub next_batsman_idx: Option<usize>,
    #[serde(default)]
    pub batting_order: Vec<usize>,
    #[serde(default)]
    pub dismissed: Vec<usize>,
    /// Legal deliveries per bowling-team player this innings
    #[serde(default)]
    pub bowler_deliveries: Vec<u16>,
    #[serde(default)]
    pub free_hit: bool,
    #[serde(default)]
    pub over_runs_conceded: u16,
    #[serde(default)]
    pub batsman_selection: SelectionMode,
    #[serde(default)]
    pub bowler_selection: SelectionMode,
    #[serde(default)]
    pub card: Option<InningsCard>,
    #[serde(default)]
    pub first_innings: Option<InningsState>,
    #[serde(default)]
    pub toss: Option<TossResult>,
    /// Exact per-over rain chance (0.0-1.0); `rain_percentage` is its rounding
    #[serde(default)]
    pub rain_probability: Option<f32>,
}

impl MatchSnapshot {
    pub fn update_timestamp(&mut self) {
        self.timestamp = current_timestamp();
    }

    pub fn match_format(&self) -> Result<MatchFormat, SaveError> {
        self.format.parse().map_err(|_| SaveError::Invalid(format!("unknown format '{}'", self.format)))
    }

    pub fn powerplay(&self) -> Result<PowerplayPhase, SaveError> {
        PowerplayPhase::from_number(self.current_powerplay)
            .ok_or_else(|| SaveError::Invalid(format!("powerplay phase {}", self.current_powerplay)))
    }

    /// Per-over rain chance, falling back to the rounded percentage.
    pub fn rain_chance(&self) -> f32 {
        self.rain_probability.unwrap_or(self.rain_percentage as f32 / 100.0)
    }

    /// "IND 143/4 (27.3) in innings 2"
    pub fn score_line(&self) -> String {
        format!(
            "{} {}/{} ({}.{}) in innings {}",
            self.batting_team_tag,
            self.total_runs,
            self.wickets,
            self.overs_completed,
            self.balls_bowled_in_over,
            self.inning_num
        )
    }

    pub fn validate(&self) -> Result<(), SaveError> {
        let invalid = |msg: String| Err(SaveError::Invalid(msg));

        if self.match_id.is_empty() {
            return invalid("empty match id".into());
        }
        if self.batting_team_tag.is_empty() || self.bowling_team_tag.is_empty() {
            return invalid("missing team tag".into());
        }
        if self.batting_team_tag == self.bowling_team_tag {
            return invalid(format!("team {} plays itself", self.batting_team_tag));
        }
        if !(1..=2).contains(&self.inning_num) {
            return invalid(format!("innings number {}", self.inning_num));
        }
        if self.balls_bowled_in_over > 5 {
            return invalid(format!("{} balls bowled in the over", self.balls_bowled_in_over));
        }
        if self.wickets > 10 {
            return invalid(format!("{} wickets", self.wickets));
        }
        if self.overs_completed > self.max_overs {
            return invalid(format!("{} of {} overs completed", self.overs_completed, self.max_overs));
        }
        if self.rain_percentage > 100 {
            return invalid(format!("rain percentage {}", self.rain_percentage));
        }
        if let Some(p) = self.rain_probability {
            if !(0.0..=1.0).contains(&p) {
                return invalid(format!("rain probability {}", p));
            }
        }
        if (self.inning_num == 1) != (self.target == 0) {
            return invalid(format!("target {} in innings {}", self.target, self.inning_num));
        }
        if self.striker_idx.is_some() && self.striker_idx == self.non_striker_idx {
            return invalid("striker and non-striker are the same player".into());
        }
        self.match_format()?;
        self.powerplay()?;
        Ok(())
    }
}

/// Serialize and compress a snapshot
pub fn serialize_and_compress(snapshot: &MatchSnapshot) -> Result<Vec<u8>, SaveError> {
    snapshot.validate()?;

    // 1. MessagePack with field names
    let msgpack = to_vec_named(snapshot)?;

    // 2. LZ4, size prepended
    let compressed = compress_prepend_size(&msgpack);

    // 3. SHA256 trailer
    let mut hasher = Sha256::new();
    hasher.update(&compressed);
    let checksum = hasher.finalize();

    let mut result = compressed;
    result.extend_from_slice(&checksum);

    Ok(result)
}

/// Decompress and deserialize a snapshot
pub fn decompress_and_deserialize(bytes: &[u8]) -> Result<MatchSnapshot, SaveError> {
    // header + checksum
    if bytes.len() < 4 + 32 {
        return Err(SaveError::Corrupted);
    }

    let (payload, checksum_bytes) = bytes.split_at(bytes.len() - 32);

    let mut hasher = Sha256::new();
    hasher.update(payload);
    let calculated_checksum = hasher.finalize();

    if &calculated_checksum[..] != checksum_bytes {
        return Err(SaveError::ChecksumMismatch);
    }

    let msgpack = decompress_size_prepended(payload).map_err(|_| SaveError::Decompression)?;
    let snapshot: MatchSnapshot = from_slice(&msgpack)?;

    if snapshot.version > SNAPSHOT_VERSION {
        return Err(SaveError::VersionMismatch { found: snapshot.version, expected: SNAPSHOT_VERSION });
    }

    Ok(snapshot)
}

pub fn current_timestamp() -> u64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as u64
}
