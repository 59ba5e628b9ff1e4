use super::error::SaveError;
use super::format::MatchSnapshot;
use super::SNAPSHOT_VERSION;

/// Migrate a snapshot from an older format to the current one
pub fn migrate_snapshot(mut snapshot: MatchSnapshot) -> Result<MatchSnapshot, SaveError> {
    let original_version = snapshot.version;

    snapshot = match snapshot.version {
        0 => migrate_v0_to_v1(snapshot)?,
        1 => snapshot,
        v => {
            return Err(SaveError::VersionMismatch { found: v, expected: SNAPSHOT_VERSION });
        }
    };

    snapshot.version = SNAPSHOT_VERSION;

    if original_version != SNAPSHOT_VERSION {
        log::info!("Migrated snapshot {} from version {} to {}", snapshot.match_id, original_version, SNAPSHOT_VERSION);
    }

    Ok(snapshot)
}

/// Version 0 carried only the flat counters. Everything else is
/// reconstructed assuming batsmen came in squad order.
fn migrate_v0_to_v1(mut snapshot: MatchSnapshot) -> Result<MatchSnapshot, SaveError> {
    log::info!("Migrating snapshot {} from version 0 to 1", snapshot.match_id);

    // 1. Side order: team A batted first
    if snapshot.team_a_tag.is_empty() || snapshot.team_b_tag.is_empty() {
        let (a, b) = if snapshot.inning_num == 2 {
            (&snapshot.bowling_team_tag, &snapshot.batting_team_tag)
        } else {
            (&snapshot.batting_team_tag, &snapshot.bowling_team_tag)
        };
        snapshot.team_a_tag = a.clone();
        snapshot.team_b_tag = b.clone();
    }

    // 2. Batting order from the wicket count
    if snapshot.batting_order.is_empty() {
        let at_crease: Vec<usize> = [snapshot.striker_idx, snapshot.non_striker_idx].into_iter().flatten().collect();
        let in_so_far = snapshot.wickets as usize + at_crease.len();
        let highest = at_crease.iter().copied().max().map(|m| m + 1).unwrap_or(0);

        snapshot.batting_order = (0..in_so_far.max(highest)).collect();
        snapshot.dismissed =
            snapshot.batting_order.iter().copied().filter(|i| !at_crease.contains(i)).take(snapshot.wickets as usize).collect();
    }

    // 3. Pending selections
    snapshot.awaiting_batsman = snapshot.striker_idx.is_none() || snapshot.non_striker_idx.is_none();
    snapshot.awaiting_bowler = snapshot.bowler_idx.is_none();
    if snapshot.next_batsman_idx.is_none() && snapshot.awaiting_batsman {
        snapshot.next_batsman_idx = snapshot.batting_order.iter().max().map(|m| m + 1);
    }

    // 4. Current bowler has at least this over's balls
    if snapshot.bowler_deliveries.is_empty() {
        if let Some(b) = snapshot.bowler_idx {
            snapshot.bowler_deliveries = vec![0; b + 1];
            snapshot.bowler_deliveries[b] = snapshot.balls_bowled_in_over as u16;
        }
    }

    Ok(snapshot)
}

/// Check if a snapshot needs migration
pub fn needs_migration(snapshot: &MatchSnapshot) -> bool {
    snapshot.version < SNAPSHOT_VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v0() -> MatchSnapshot {
        MatchSnapshot {
            version: 0,
            timestamp: 0,
            batting_team_tag: "AUS".into(),
            bowling_team_tag: "IND".into(),
            total_runs: 87,
            wickets: 3,
            overs_completed: 12,
            balls_bowled_in_over: 2,
            current_powerplay: 2,
            striker_idx: Some(4),
            non_striker_idx: Some(2),
            bowler_idx: Some(8),
            max_overs: 20,
            target: 151,
            rain_percentage: 0,
            match_id: "IND_VS_AUS_1700000000".into(),
            format: "T20".into(),
            inning_num: 2,
            team_a_tag: String::new(),
            team_b_tag: String::new(),
            seed: 0,
            rng_word_pos: 0,
            previous_bowler_idx: None,
            awaiting_batsman: false,
            awaiting_bowler: false,
            next_batsman_idx: None,
            batting_order: Vec::new(),
            dismissed: Vec::new(),
            bowler_deliveries: Vec::new(),
            free_hit: false,
            over_runs_conceded: 0,
            batsman_selection: Default::default(),
            bowler_selection: Default::default(),
            card: None,
            first_innings: None,
            toss: None,
            rain_probability: None,
        }
    }

    #[test]
    fn test_migrate_v0_to_v1() {
        let migrated = migrate_snapshot(v0()).unwrap();
        assert_eq!(migrated.version, 1);
        assert_eq!(migrated.team_a_tag, "IND");
        assert_eq!(migrated.team_b_tag, "AUS");
        assert_eq!(migrated.batting_order, vec![0, 1, 2, 3, 4]);
        assert_eq!(migrated.dismissed, vec![0, 1, 3]);
        assert!(!migrated.awaiting_batsman);
        assert_eq!(migrated.bowler_deliveries[8], 2);
        assert!(migrated.validate().is_ok());
    }

    #[test]
    fn test_v0_awaiting_batsman() {
        let mut snap = v0();
        snap.striker_idx = None;
        let migrated = migrate_snapshot(snap).unwrap();
        assert!(migrated.awaiting_batsman);
        assert_eq!(migrated.dismissed, vec![0, 1, 3]);
        assert_eq!(migrated.batting_order, vec![0, 1, 2, 3]);
        assert_eq!(migrated.next_batsman_idx, Some(4));
    }

    #[test]
    fn test_no_migration_needed() {
        let mut snap = migrate_snapshot(v0()).unwrap();
        assert!(!needs_migration(&snap));
        snap.free_hit = true;
        assert_eq!(migrate_snapshot(snap.clone()).unwrap(), snap);
    }

    #[test]
    fn test_future_version_rejected() {
        let mut snap = v0();
        snap.version = 9;
        assert!(matches!(migrate_snapshot(snap), Err(SaveError::VersionMismatch { found: 9, .. })));
    }
}
