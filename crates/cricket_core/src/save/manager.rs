use super::error::SaveError;
use super::format::{decompress_and_deserialize, serialize_and_compress, MatchSnapshot};
use super::migration::migrate_snapshot;

use std::fs::{remove_file, rename, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub const SNAPSHOT_EXTENSION: &str = "snap";

/// Snapshot files in one directory, one per match id.
#[derive(Debug, Clone)]
pub struct SaveManager {
    dir: PathBuf,
}

impl SaveManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn snapshot_path(&self, match_id: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", match_id, SNAPSHOT_EXTENSION))
    }

    /// Save a snapshot under its match id
    pub fn save(&self, snapshot: &MatchSnapshot) -> Result<PathBuf, SaveError> {
        let path = self.snapshot_path(&snapshot.match_id);
        Self::save_to_path(&path, snapshot)?;
        log::info!("Match {} saved ({})", snapshot.match_id, snapshot.score_line());
        Ok(path)
    }

    /// Load the snapshot for `match_id`
    pub fn load(&self, match_id: &str) -> Result<MatchSnapshot, SaveError> {
        let snapshot = Self::load_from_path(&self.snapshot_path(match_id))?;
        log::info!("Match {} loaded", match_id);
        Ok(snapshot)
    }

    pub fn exists(&self, match_id: &str) -> bool {
        self.snapshot_path(match_id).exists()
    }

    /// Remove a finished match's snapshot
    pub fn delete(&self, match_id: &str) -> Result<(), SaveError> {
        let path = self.snapshot_path(match_id);
        if path.exists() {
            remove_file(&path)?;
            log::info!("Deleted snapshot {}", match_id);
        }
        Ok(())
    }

    /// Every readable snapshot in the directory, most recent first
    pub fn list(&self) -> Vec<SnapshotInfo> {
        let Ok(entries) = std::fs::read_dir(&self.dir) else {
            return Vec::new();
        };

        let mut infos: Vec<SnapshotInfo> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == SNAPSHOT_EXTENSION))
            .filter_map(|p| match Self::load_from_path(&p) {
                Ok(snap) => Some(SnapshotInfo::from(&snap)),
                Err(e) => {
                    log::warn!("Skipping unreadable snapshot {:?}: {}", p, e);
                    None
                }
            })
            .collect();

        infos.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        infos
    }

    pub fn save_to_path(path: &Path, snapshot: &MatchSnapshot) -> Result<(), SaveError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut snapshot = snapshot.clone();
        snapshot.update_timestamp();
        let data = serialize_and_compress(&snapshot)?;

        // Atomic save: write to temp file, then rename
        let temp_path = path.with_extension("tmp");

        {
            let mut file = File::create(&temp_path)?;
            file.write_all(&data)?;
            file.flush()?;
            file.sync_all()?;
        }

        rename(&temp_path, path)?;

        log::debug!("Saved {} bytes to {:?}", data.len(), path);
        Ok(())
    }

    pub fn load_from_path(path: &Path) -> Result<MatchSnapshot, SaveError> {
        if !path.exists() {
            return Err(SaveError::FileNotFound { path: path.display().to_string() });
        }

        let mut file = File::open(path)?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;

        let snapshot = migrate_snapshot(decompress_and_deserialize(&data)?)?;
        snapshot.validate()?;

        log::debug!("Loaded {} bytes from {:?}", data.len(), path);
        Ok(snapshot)
    }
}

#[derive(Debug, Clone)]
pub struct SnapshotInfo {
    pub match_id: String,
    pub timestamp: u64,
    pub version: u32,
    pub format: String,
    pub inning_num: u8,
    pub score: String,
}

impl From<&MatchSnapshot> for SnapshotInfo {
    fn from(snap: &MatchSnapshot) -> Self {
        Self {
            match_id: snap.match_id.clone(),
            timestamp: snap.timestamp,
            version: snap.version,
            format: snap.format.clone(),
            inning_num: snap.inning_num,
            score: snap.score_line(),
        }
    }
}

impl SnapshotInfo {
    pub fn format_timestamp(&self) -> String {
        use time::{format_description::well_known::Rfc3339, OffsetDateTime};

        let timestamp = OffsetDateTime::from_unix_timestamp_nanos(self.timestamp as i128 * 1_000_000)
            .unwrap_or_else(|_| OffsetDateTime::now_utc());

        timestamp.format(&Rfc3339).unwrap_or_else(|_| "Unknown".to_string())
    }

    pub fn get_display_text(&self) -> String {
        format!("{} [{}]: {}", self.match_id, self.format, self.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::match_runner::MatchRunner;
    use crate::engine::test_fixtures::create_test_team;
    use crate::engine::{EngineConfig, MatchSettings};
    use crate::models::MatchFormat;
    use tempfile::TempDir;

    fn snapshot(id: &str) -> MatchSnapshot {
        let mut settings = MatchSettings::new(MatchFormat::T20, 5);
        settings.match_id = Some(id.to_string());
        let mut runner = MatchRunner::new(
            create_test_team("India", "IND"),
            create_test_team("Australia", "AUS"),
            settings,
            EngineConfig::default(),
        )
        .unwrap();
        runner.step().unwrap();
        runner.snapshot()
    }

    #[test]
    fn test_save_load_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let manager = SaveManager::new(temp_dir.path());
        let snap = snapshot("IND_VS_AUS_1");

        let path = manager.save(&snap).unwrap();
        assert_eq!(path, temp_dir.path().join("IND_VS_AUS_1.snap"));
        assert!(manager.exists("IND_VS_AUS_1"));

        let loaded = manager.load("IND_VS_AUS_1").unwrap();
        assert_eq!(loaded.total_runs, snap.total_runs);
        assert_eq!(loaded.striker_idx, snap.striker_idx);
        assert_eq!(loaded.card, snap.card);
    }

    #[test]
    fn test_atomic_save() {
        let temp_dir = TempDir::new().unwrap();
        let save_path = temp_dir.path().join("nested").join("atomic.snap");
        SaveManager::save_to_path(&save_path, &snapshot("A_VS_B_2")).unwrap();

        assert!(save_path.exists());
        assert!(!save_path.with_extension("tmp").exists());
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let manager = SaveManager::new(temp_dir.path());
        let err = manager.load("nope").unwrap_err();
        assert!(matches!(err, SaveError::FileNotFound { .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_list_and_delete() {
        let temp_dir = TempDir::new().unwrap();
        let manager = SaveManager::new(temp_dir.path());
        manager.save(&snapshot("M_1")).unwrap();
        manager.save(&snapshot("M_2")).unwrap();
        std::fs::write(temp_dir.path().join("junk.snap"), b"not a snapshot").unwrap();

        let infos = manager.list();
        assert_eq!(infos.len(), 2);
        assert!(infos.iter().all(|i| i.inning_num == 1));
        assert!(!infos[0].format_timestamp().is_empty());

        manager.delete("M_1").unwrap();
        assert!(!manager.exists("M_1"));
        assert_eq!(manager.list().len(), 1);
    }
}
