//! Delivery log
//!
//! One record per delivery, appended as the match is played. The CSV layout
//! is `Inning,Over,Ball,Bowler,Batsman,Runs,Outcome,DismissalMethod,Fielder`
//! with the over counted from 0 and the ball as the legal-ball slot (1-6).

pub mod csv_log;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::innings::DeliveryRecord;
use crate::models::Team;

pub use csv_log::{log_file_name, CsvBallLog, LOG_HEADER};

#[derive(Error, Debug)]
pub enum LogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// A single log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRow {
    #[serde(rename = "Inning")]
    pub inning: u8,
    #[serde(rename = "Over")]
    pub over: u16,
    #[serde(rename = "Ball")]
    pub ball: u8,
    #[serde(rename = "Bowler")]
    pub bowler: String,
    #[serde(rename = "Batsman")]
    pub batsman: String,
    #[serde(rename = "Runs")]
    pub runs: u16,
    #[serde(rename = "Outcome")]
    pub outcome: String,
    #[serde(rename = "DismissalMethod")]
    pub dismissal_method: String,
    #[serde(rename = "Fielder")]
    pub fielder: String,
}

impl LogRow {
    /// Build the row for `record`, resolving player names from the two sides.
    pub fn from_record(record: &DeliveryRecord, batting: &Team, bowling: &Team) -> Self {
        let name = |team: &Team, i: usize| team.players.get(i).map(|p| p.name.clone()).unwrap_or_default();

        let (dismissal_method, fielder) = match record.outcome.wicket() {
            Some((kind, fielder)) => {
                (kind.label().to_string(), fielder.map(|f| name(bowling, f)).unwrap_or_default())
            }
            None => (String::new(), String::new()),
        };

        Self {
            inning: record.inning_num,
            over: record.over,
            ball: record.ball,
            bowler: name(bowling, record.bowler),
            batsman: name(batting, record.striker),
            runs: record.outcome.team_runs(),
            outcome: record.outcome.log_code().to_string(),
            dismissal_method,
            fielder,
        }
    }
}

/// Sink for delivery records.
pub trait BallLog {
    fn record(&mut self, row: &LogRow) -> Result<(), LogError>;

    /// Called once when the match ends.
    fn finish(&mut self) -> Result<(), LogError> {
        Ok(())
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBallLog;

impl BallLog for NullBallLog {
    fn record(&mut self, _row: &LogRow) -> Result<(), LogError> {
        Ok(())
    }
}

/// Keeps rows in memory; used by the JSON API and tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryBallLog {
    pub rows: Vec<LogRow>,
}

impl BallLog for MemoryBallLog {
    fn record(&mut self, row: &LogRow) -> Result<(), LogError> {
        self.rows.push(row.clone());
        Ok(())
    }
}

impl<L: BallLog + ?Sized> BallLog for Box<L> {
    fn record(&mut self, row: &LogRow) -> Result<(), LogError> {
        (**self).record(row)
    }

    fn finish(&mut self) -> Result<(), LogError> {
        (**self).finish()
    }
}
