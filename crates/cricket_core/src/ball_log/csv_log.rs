use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use super::{BallLog, LogError, LogRow};

pub const LOG_HEADER: [&str; 9] =
    ["Inning", "Over", "Ball", "Bowler", "Batsman", "Runs", "Outcome", "DismissalMethod", "Fielder"];

/// `match_{id}_{YYYYmmdd_HHMMSS}.log`
pub fn log_file_name(match_id: &str, at: DateTime<Local>) -> String {
    format!("match_{}_{}.log", match_id, at.format("%Y%m%d_%H%M%S"))
}

/// CSV delivery log, flushed after every row so a crash loses at most the
/// delivery in flight.
pub struct CsvBallLog {
    writer: csv::Writer<File>,
    path: PathBuf,
}

impl CsvBallLog {
    /// Create (or truncate) `path` and write the header.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, LogError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file = File::create(&path)?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        writer.write_record(LOG_HEADER)?;
        writer.flush()?;

        tracing::debug!(path = %path.display(), "delivery log opened");
        Ok(Self { writer, path })
    }

    /// Open a log for `match_id` in `dir`, named from the current local time.
    pub fn for_match(dir: impl AsRef<Path>, match_id: &str) -> Result<Self, LogError> {
        Self::create(dir.as_ref().join(log_file_name(match_id, Local::now())))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BallLog for CsvBallLog {
    fn record(&mut self, row: &LogRow) -> Result<(), LogError> {
        self.writer.serialize(row)?;
        self.writer.flush()?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), LogError> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn row(over: u16, ball: u8, outcome: &str, runs: u16) -> LogRow {
        LogRow {
            inning: 1,
            over,
            ball,
            bowler: "Starc".into(),
            batsman: "Sharma".into(),
            runs,
            outcome: outcome.into(),
            dismissal_method: String::new(),
            fielder: String::new(),
        }
    }

    #[test]
    fn test_file_name() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(log_file_name("IND_VS_AUS_1710000000", at), "match_IND_VS_AUS_1710000000_20240309_140507.log");
    }

    #[test]
    fn test_rows_are_on_disk_immediately() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logs").join("m.log");
        let mut log = CsvBallLog::create(&path).unwrap();

        log.record(&row(0, 1, "DOT", 0)).unwrap();
        log.record(&row(0, 2, "RUNS", 4)).unwrap();

        // read back without finishing
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Inning,Over,Ball,Bowler,Batsman,Runs,Outcome,DismissalMethod,Fielder");
        assert_eq!(lines[1], "1,0,1,Starc,Sharma,0,DOT,,");
        assert_eq!(lines[2], "1,0,2,Starc,Sharma,4,RUNS,,");
        assert_eq!(log.path(), path.as_path());
    }

    #[test]
    fn test_rows_parse_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("m.log");
        let mut log = CsvBallLog::create(&path).unwrap();
        let mut wicket = row(2, 6, "WICKET", 0);
        wicket.dismissal_method = "Run Out".into();
        wicket.fielder = "Smith".into();
        log.record(&wicket).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<LogRow> = reader.deserialize().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows, vec![wicket]);
    }

    #[test]
    fn test_unwritable_location_fails() {
        let dir = TempDir::new().unwrap();
        // a directory cannot be opened as the log file
        assert!(matches!(CsvBallLog::create(dir.path()), Err(LogError::Io(_))));
    }
}
