//! Property tests over arbitrary delivery sequences.

use std::collections::HashMap;

use proptest::prelude::*;

use cricket_core::engine::test_fixtures::create_test_team;
use cricket_core::engine::{DeliveryRecord, EngineConfig, MatchRunner, MatchSettings};
use cricket_core::models::{DeliveryOutcome, DismissalKind, MatchFormat};
use cricket_core::roster::InMemoryRoster;
use cricket_core::save::MatchSnapshot;

fn outcome_strategy() -> impl Strategy<Value = DeliveryOutcome> {
    prop_oneof![
        4 => Just(DeliveryOutcome::Dot),
        6 => prop::sample::select(vec![1u8, 2, 3, 4, 6]).prop_map(DeliveryOutcome::Runs),
        1 => (0u8..=4).prop_map(DeliveryOutcome::Wide),
        1 => (0u8..=6).prop_map(DeliveryOutcome::NoBall),
        1 => (1u8..=4).prop_map(DeliveryOutcome::Bye),
        1 => (1u8..=4).prop_map(DeliveryOutcome::LegBye),
        1 => prop::sample::select(vec![DismissalKind::Bowled, DismissalKind::Lbw])
            .prop_map(|kind| DeliveryOutcome::Wicket { kind, fielder: None, runs: 0 }),
        1 => (0usize..11).prop_map(|f| DeliveryOutcome::Wicket { kind: DismissalKind::Caught, fielder: Some(f), runs: 0 }),
        1 => ((0usize..11), (0u8..=2))
            .prop_map(|(f, runs)| DeliveryOutcome::Wicket { kind: DismissalKind::RunOut, fielder: Some(f), runs }),
        1 => ((0usize..11), (0u8..=2))
            .prop_map(|(f, runs)| DeliveryOutcome::NoBallRunOut { fielder: Some(f), runs }),
    ]
}

fn runner(seed: u64, rain: bool) -> MatchRunner {
    let mut settings = MatchSettings::new(MatchFormat::T20, seed).with_rain(rain);
    settings.rain_probability = Some(0.2875);
    settings.match_id = Some("PROP".into());
    MatchRunner::new(create_test_team("India", "IND"), create_test_team("Australia", "AUS"), settings, EngineConfig::default())
        .unwrap()
}

/// Feed outcomes, crossing the innings break, until the match ends or they run out.
fn play(r: &mut MatchRunner, outcomes: &[DeliveryOutcome], mut each: impl FnMut(&MatchRunner, &DeliveryRecord)) {
    for &outcome in outcomes {
        if r.is_finished() {
            break;
        }
        if r.innings().is_over() {
            r.step().unwrap();
            if r.is_finished() {
                break;
            }
        }
        let before = r.innings().max_overs();
        let record = r.deliver(outcome).unwrap();
        assert!(r.innings().max_overs() <= before);
        each(r, &record);
    }
}

fn normalized(mut snap: MatchSnapshot) -> MatchSnapshot {
    snap.timestamp = 0;
    snap
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Ball counter stays in 0..=5 and every completed over holds exactly six legal balls.
    #[test]
    fn prop_six_legal_balls_per_over(
        seed in any::<u64>(),
        outcomes in prop::collection::vec(outcome_strategy(), 1..400)
    ) {
        let mut r = runner(seed, false);
        let mut legal_in_over = 0u8;
        let mut ok = true;

        play(&mut r, &outcomes, |r, rec| {
            ok &= r.innings().balls_bowled_in_over() <= 5;
            if rec.outcome.is_legal() {
                legal_in_over += 1;
            }
            if rec.over_completed {
                ok &= legal_in_over == 6;
                legal_in_over = 0;
            }
            if rec.innings_end.is_some() {
                legal_in_over = 0;
            }
        });
        prop_assert!(ok);
    }

    /// Wickets never decrease and never pass the all-out mark.
    #[test]
    fn prop_wickets_monotonic(
        seed in any::<u64>(),
        outcomes in prop::collection::vec(outcome_strategy(), 1..400)
    ) {
        let mut r = runner(seed, false);
        let mut last = (1u8, 0u8);
        let mut ok = true;

        play(&mut r, &outcomes, |r, rec| {
            let inn = r.innings();
            if rec.inning_num == last.0 {
                ok &= rec.wickets >= last.1;
            }
            ok &= rec.wickets <= inn.all_out_at();
            if rec.wickets == inn.all_out_at() {
                ok &= inn.is_over();
            }
            last = (rec.inning_num, rec.wickets);
        });
        prop_assert!(ok);
    }

    /// Rain only shortens an innings, and never below the next over.
    #[test]
    fn prop_max_overs_never_grows(
        seed in any::<u64>(),
        outcomes in prop::collection::vec(outcome_strategy(), 1..400)
    ) {
        let mut r = runner(seed, true);
        let mut ok = true;

        play(&mut r, &outcomes, |r, rec| {
            if let Some(stop) = rec.rain {
                ok &= stop.to < stop.from;
                ok &= stop.to > stop.after_over;
                ok &= r.innings().max_overs() == stop.to;
            }
            ok &= r.innings().overs_completed() <= r.innings().max_overs();
        });
        prop_assert!(ok);
    }

    /// Nobody bowls consecutive overs or beyond the four-over cap.
    #[test]
    fn prop_bowler_rotation(
        seed in any::<u64>(),
        outcomes in prop::collection::vec(outcome_strategy(), 1..400)
    ) {
        let mut r = runner(seed, false);
        let mut over_bowler: HashMap<(u8, u16), usize> = HashMap::new();
        let mut legal: HashMap<(u8, usize), u16> = HashMap::new();
        let mut ok = true;

        play(&mut r, &outcomes, |_, rec| {
            let prev = over_bowler.insert((rec.inning_num, rec.over), rec.bowler);
            ok &= prev.map_or(true, |b| b == rec.bowler);
            if rec.over > 0 {
                if let Some(&before) = over_bowler.get(&(rec.inning_num, rec.over - 1)) {
                    ok &= before != rec.bowler;
                }
            }
            if rec.outcome.is_legal() {
                let count = legal.entry((rec.inning_num, rec.bowler)).or_default();
                *count += 1;
                ok &= *count <= 24;
            }
        });
        prop_assert!(ok);
    }

    /// Snapshot, resume, snapshot again: same state, same continuation.
    #[test]
    fn prop_snapshot_resume_roundtrip(
        seed in any::<u64>(),
        outcomes in prop::collection::vec(outcome_strategy(), 1..300),
        tail in 1usize..200
    ) {
        let roster = InMemoryRoster::with_teams([create_test_team("India", "IND"), create_test_team("Australia", "AUS")]).unwrap();
        let mut r = runner(seed, true);
        play(&mut r, &outcomes, |_, _| {});
        prop_assume!(!r.is_finished());

        let snap = r.snapshot();
        let mut resumed = MatchRunner::resume(snap.clone(), &roster, EngineConfig::default()).unwrap();
        prop_assert_eq!(resumed.innings().rain_probability(), r.innings().rain_probability());
        prop_assert_eq!(normalized(resumed.snapshot()), normalized(snap));

        // identical continuation from the engine's own resolver
        for _ in 0..tail {
            let a = r.step().unwrap();
            let b = resumed.step().unwrap();
            prop_assert_eq!(a, b);
            if r.is_finished() {
                break;
            }
        }
        prop_assert_eq!(normalized(resumed.snapshot()), normalized(r.snapshot()));
    }
}
