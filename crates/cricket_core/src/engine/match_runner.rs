//! Match Orchestrator
//!
//! Runs the toss, sequences both innings through [`InningsState`], sets the
//! chase target and produces the result. Every random draw of a match comes
//! from one `ChaCha8Rng` seeded from [`MatchSettings::seed`], so a seed fully
//! determines the match, and a snapshot (seed + stream position) resumes it
//! exactly where it stopped.
//!
//! ## Usage
//! ```rust,ignore
//! let mut runner = MatchRunner::new(india, australia, settings, EngineConfig::default())?;
//! loop {
//!     match runner.step()? {
//!         MatchProgress::Finished => break,
//!         MatchProgress::AwaitingBowler => runner.supply_bowler(pick(&runner.eligible_bowlers()))?,
//!         _ => {}
//!     }
//! }
//! let outcome = runner.outcome().cloned();
//! ```

use chrono::Utc;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::config::{EngineConfig, MatchSettings, SelectionMode};
use super::fielding::FieldingPlan;
use super::innings::{DeliveryRecord, InningsEnd, InningsPhase, InningsSetup, InningsState};
use super::resolver::OutcomeResolver;
use super::scorecard::{InningsCard, InningsSummary};
use super::shot::{realize_delivery, AutoRunCaller, DeliveryContext, RunCaller};
use super::toss::{run_toss, TossCall, TossDecision, TossResult};
use crate::ball_log::{BallLog, LogRow, NullBallLog};
use crate::error::{MatchError, Result};
use crate::models::{DeliveryOutcome, Fixture, MatchFormat, Team, TeamSide, MIN_ELIGIBLE};
use crate::roster::RosterProvider;
use crate::save::format::current_timestamp;
use crate::save::{migrate_snapshot, MatchSnapshot, SaveError, SaveManager, SNAPSHOT_VERSION};

// ============================================================================
// Results
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Margin {
    Runs(u16),
    Wickets(u8),
}

impl Margin {
    fn describe(&self) -> String {
        match *self {
            Margin::Runs(1) => "1 run".to_string(),
            Margin::Runs(n) => format!("{} runs", n),
            Margin::Wickets(1) => "1 wicket".to_string(),
            Margin::Wickets(n) => format!("{} wickets", n),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchResult {
    Won { winner: TeamSide, margin: Margin },
    Tied,
    Drawn,
}

impl MatchResult {
    /// Compare the two completed innings.
    pub fn decide(first: &InningsState, second: &InningsState) -> Self {
        let (defended, chased) = (first.total_runs(), second.total_runs());

        if chased > defended {
            let left = second.all_out_at().saturating_sub(second.wickets());
            return MatchResult::Won { winner: second.batting_side(), margin: Margin::Wickets(left) };
        }
        if chased == defended {
            return MatchResult::Tied;
        }
        if second.format().allows_draw() && second.end_reason() == Some(InningsEnd::OversComplete) {
            return MatchResult::Drawn;
        }
        MatchResult::Won { winner: first.batting_side(), margin: Margin::Runs(defended - chased) }
    }

    /// "India beat Australia by 5 wickets", "Match tied", "Match drawn"
    pub fn describe(&self, fixture: &Fixture) -> String {
        match *self {
            MatchResult::Won { winner, margin } => format!(
                "{} beat {} by {}",
                fixture.team(winner).name,
                fixture.team(winner.other()).name,
                margin.describe()
            ),
            MatchResult::Tied => "Match tied".to_string(),
            MatchResult::Drawn => "Match drawn".to_string(),
        }
    }

    pub fn winner(&self) -> Option<TeamSide> {
        match *self {
            MatchResult::Won { winner, .. } => Some(winner),
            _ => None,
        }
    }
}

/// Everything a front end needs once the match is over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub match_id: String,
    pub result: MatchResult,
    /// Human-readable result line
    pub summary: String,
    pub winner_name: Option<String>,
    /// `None` after resuming a save that predates toss records
    pub toss: Option<TossResult>,
    /// Empty when the toss is unknown
    pub toss_summary: String,
    pub innings: Vec<InningsSummary>,
    /// The delivery log or autosave failed during the match
    pub degraded: bool,
}

/// What a call to [`MatchRunner::step`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchProgress {
    Delivered(DeliveryRecord),
    AwaitingBatsman,
    AwaitingBowler,
    /// First innings closed; second innings ready with this target
    InningsBreak { target: u16 },
    Finished,
}

/// `{TAG_A}_VS_{TAG_B}_{unix_seconds}`
pub fn generate_match_id(tag_a: &str, tag_b: &str, unix_seconds: i64) -> String {
    format!("{}_VS_{}_{}", tag_a, tag_b, unix_seconds)
}

// ============================================================================
// Pre-toss validation
// ============================================================================

/// Check a squad can complete an innings of `format` with or against it.
pub fn validate_squad(team: &Team, format: MatchFormat) -> Result<()> {
    team.validate()?;
    let xi = team.playing_xi();

    let batsmen = xi.eligible_batsmen();
    if batsmen < MIN_ELIGIBLE {
        return Err(MatchError::InsufficientPlayers {
            team: team.name.clone(),
            kind: "batsmen",
            required: MIN_ELIGIBLE,
            found: batsmen,
        });
    }

    let bowlers = xi.eligible_bowlers();
    if bowlers < MIN_ELIGIBLE {
        return Err(MatchError::InsufficientPlayers {
            team: team.name.clone(),
            kind: "bowlers",
            required: MIN_ELIGIBLE,
            found: bowlers,
        });
    }

    // anyone may bowl once the nominal bowlers are used up
    if let Some(cap) = format.bowler_delivery_cap() {
        let balls = format.overs_per_side() as usize * 6;
        let per_player = cap as usize;
        let needed = balls.div_ceil(per_player);
        if batsmen < needed {
            return Err(MatchError::InsufficientPlayers {
                team: team.name.clone(),
                kind: "bowlers within the delivery cap",
                required: needed,
                found: batsmen,
            });
        }
    }
    Ok(())
}

// ============================================================================
// Runner
// ============================================================================

pub struct MatchRunner {
    settings: MatchSettings,
    config: EngineConfig,
    resolver: OutcomeResolver,
    fixture: Fixture,
    match_id: String,
    rng: ChaCha8Rng,
    toss: Option<TossResult>,
    first_innings: Option<InningsState>,
    innings: InningsState,
    outcome: Option<MatchOutcome>,
    ball_log: Box<dyn BallLog>,
    log_failed: bool,
    autosave: Option<SaveManager>,
    save_failed: bool,
    run_caller: Box<dyn RunCaller>,
}

impl MatchRunner {
    /// Validate both squads, toss, and open the first innings.
    pub fn new(team_a: Team, team_b: Team, settings: MatchSettings, config: EngineConfig) -> Result<Self> {
        settings.validate()?;
        config.validate()?;
        if team_a.tag == team_b.tag {
            return Err(MatchError::InvalidTeam(format!("{} cannot play itself", team_a.tag)));
        }
        validate_squad(&team_a, settings.format)?;
        validate_squad(&team_b, settings.format)?;

        let fixture = Fixture::new(team_a.playing_xi(), team_b.playing_xi());
        let match_id = settings
            .match_id
            .clone()
            .unwrap_or_else(|| generate_match_id(&team_a.tag, &team_b.tag, Utc::now().timestamp()));

        let mut rng = ChaCha8Rng::seed_from_u64(settings.seed);
        let toss = run_toss(settings.toss_call, settings.toss_choice, &mut rng);
        tracing::info!(
            match_id = %match_id,
            format = %settings.format,
            "{}",
            toss.describe(&fixture.team(toss.winner).name)
        );

        let innings = open_innings(1, toss.batting_first, 0, &fixture, &settings, &config)?;

        Ok(Self {
            resolver: OutcomeResolver::new(config.resolver.clone()),
            settings,
            config,
            fixture,
            match_id,
            rng,
            toss: Some(toss),
            first_innings: None,
            innings,
            outcome: None,
            ball_log: Box::new(NullBallLog),
            log_failed: false,
            autosave: None,
            save_failed: false,
            run_caller: Box::new(AutoRunCaller),
        })
    }

    /// Send every delivery to `log`.
    pub fn with_ball_log(mut self, log: Box<dyn BallLog>) -> Self {
        self.ball_log = log;
        self
    }

    /// Snapshot the match after every over and at the innings break.
    pub fn with_autosave(mut self, manager: SaveManager) -> Self {
        self.autosave = Some(manager);
        self
    }

    /// Replace the automatic run calls (exactly the safe runs).
    pub fn with_run_caller(mut self, caller: Box<dyn RunCaller>) -> Self {
        self.run_caller = caller;
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn match_id(&self) -> &str {
        &self.match_id
    }
    pub fn settings(&self) -> &MatchSettings {
        &self.settings
    }
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
    pub fn fixture(&self) -> &Fixture {
        &self.fixture
    }
    /// The two playing XIs, with career totals committed once finished.
    pub fn into_fixture(self) -> Fixture {
        self.fixture
    }
    pub fn toss(&self) -> Option<&TossResult> {
        self.toss.as_ref()
    }
    pub fn innings(&self) -> &InningsState {
        &self.innings
    }
    pub fn first_innings(&self) -> Option<&InningsState> {
        self.first_innings.as_ref()
    }
    pub fn outcome(&self) -> Option<&MatchOutcome> {
        self.outcome.as_ref()
    }
    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }
    pub fn is_degraded(&self) -> bool {
        self.log_failed || self.save_failed
    }

    pub fn batting_team(&self) -> &Team {
        self.fixture.team(self.innings.batting_side())
    }
    pub fn bowling_team(&self) -> &Team {
        self.fixture.team(self.innings.bowling_side())
    }

    /// Players who may bowl the next over
    pub fn eligible_bowlers(&self) -> Vec<usize> {
        self.innings.eligible_bowlers(self.bowling_team())
    }

    /// Batting-side players still to come in, in squad order
    pub fn available_batsmen(&self) -> Vec<usize> {
        let order = self.innings.batting_order();
        let batting = self.batting_team();
        (0..batting.players.len()).filter(|i| batting.players[*i].is_active && !order.contains(i)).collect()
    }

    // ========================================================================
    // Driving the match
    // ========================================================================

    /// Advance by one unit of work: a delivery, an innings transition, or a
    /// report that a selection is awaited.
    pub fn step(&mut self) -> Result<MatchProgress> {
        if self.outcome.is_some() {
            return Ok(MatchProgress::Finished);
        }
        if self.innings.is_over() {
            return self.close_innings();
        }
        if self.innings.awaiting_batsman() {
            return Ok(MatchProgress::AwaitingBatsman);
        }
        if self.innings.awaiting_bowler() {
            return Ok(MatchProgress::AwaitingBowler);
        }

        let outcome = self.resolve_delivery()?;
        let record = self.apply(outcome)?;
        Ok(MatchProgress::Delivered(record))
    }

    /// Apply an outcome decided outside the engine (scripted play, a front
    /// end's own resolver) to the current innings.
    pub fn deliver(&mut self, outcome: DeliveryOutcome) -> Result<DeliveryRecord> {
        if self.outcome.is_some() {
            return Err(MatchError::InningsOver);
        }
        self.apply(outcome)
    }

    /// Step until the match is over. Fails if a deferred selection is awaited.
    pub fn play_to_end(&mut self) -> Result<MatchOutcome> {
        loop {
            match self.step()? {
                MatchProgress::Finished => break,
                MatchProgress::AwaitingBatsman => return Err(MatchError::AwaitingSelection("batsman")),
                MatchProgress::AwaitingBowler => return Err(MatchError::AwaitingSelection("bowler")),
                MatchProgress::Delivered(_) | MatchProgress::InningsBreak { .. } => {}
            }
        }
        self.outcome.clone().ok_or(MatchError::InningsOver)
    }

    pub fn supply_batsman(&mut self, index: usize) -> Result<()> {
        let batting = self.fixture.team(self.innings.batting_side());
        self.innings.supply_batsman(batting, index)
    }

    pub fn supply_bowler(&mut self, index: usize) -> Result<()> {
        let bowling = self.fixture.team(self.innings.bowling_side());
        self.innings.supply_bowler(bowling, index)
    }

    /// Shorten the current innings (interruption decided outside the engine).
    pub fn reduce_max_overs(&mut self, new_max: u16) -> Result<u16> {
        self.innings.reduce_max_overs(new_max)
    }

    fn resolve_delivery(&mut self) -> Result<DeliveryOutcome> {
        let (Some(striker), Some(bowler)) = (self.innings.striker(), self.innings.bowler()) else {
            return Err(MatchError::AwaitingSelection("batsman"));
        };
        let (batting, bowling) = self.fixture.split(self.innings.batting_side());
        let batter = batting
            .players
            .get(striker)
            .ok_or(MatchError::IneligibleBatsman { index: striker, reason: "no such player" })?;
        let bowler_player = bowling
            .players
            .get(bowler)
            .ok_or(MatchError::IneligibleBowler { index: bowler, reason: "no such player" })?;

        let verdict = self.resolver.resolve(batter.batting_skill, bowler_player.bowling_skill, &mut self.rng);

        let mut plan = FieldingPlan::for_phase(self.innings.current_powerplay(), batter.batting_hand, &self.config.field);
        plan.assign_fielders(bowling, bowler);
        let ctx = DeliveryContext {
            striker: batter,
            bowler: bowler_player,
            bowling,
            plan: &plan,
            field: &self.config.field,
        };

        Ok(realize_delivery(verdict, &ctx, self.run_caller.as_mut(), &mut self.rng))
    }

    fn apply(&mut self, outcome: DeliveryOutcome) -> Result<DeliveryRecord> {
        let record = self.innings.advance_one_delivery(&mut self.fixture, outcome, &mut self.rng)?;

        tracing::debug!(
            inning = record.inning_num,
            over = record.over,
            ball = record.ball,
            outcome = record.outcome.log_code(),
            score = record.total_runs,
            wickets = record.wickets,
            "delivery"
        );
        if let Some(stop) = record.rain {
            tracing::info!(from = stop.from, to = stop.to, "overs reduced by rain");
        }

        self.log_delivery(&record);
        if record.over_completed || record.innings_end.is_some() {
            self.autosave_now();
        }
        Ok(record)
    }

    fn close_innings(&mut self) -> Result<MatchProgress> {
        if self.first_innings.is_none() {
            let target = self.innings.total_runs() + 1;
            let second = open_innings(2, self.innings.bowling_side(), target, &self.fixture, &self.settings, &self.config)?;
            let first = std::mem::replace(&mut self.innings, second);
            tracing::info!(
                match_id = %self.match_id,
                runs = first.total_runs(),
                wickets = first.wickets(),
                target,
                "innings break"
            );
            self.first_innings = Some(first);
            self.autosave_now();
            return Ok(MatchProgress::InningsBreak { target });
        }

        self.finish();
        Ok(MatchProgress::Finished)
    }

    fn finish(&mut self) {
        let Some(first) = self.first_innings.as_ref() else {
            return;
        };
        let result = MatchResult::decide(first, &self.innings);
        let innings = vec![first.summary(&self.fixture), self.innings.summary(&self.fixture)];

        for team in &mut self.fixture.teams {
            team.commit_match_stats();
        }

        if let Err(e) = self.ball_log.finish() {
            self.degrade_log(&e.to_string());
        }
        if let Some(manager) = &self.autosave {
            if let Err(e) = manager.delete(&self.match_id) {
                tracing::warn!(error = %e, "could not remove snapshot of finished match");
            }
        }

        let summary = result.describe(&self.fixture);
        tracing::info!(match_id = %self.match_id, "{}", summary);

        self.outcome = Some(MatchOutcome {
            match_id: self.match_id.clone(),
            result,
            winner_name: result.winner().map(|side| self.fixture.team(side).name.clone()),
            summary,
            toss: self.toss,
            toss_summary: self
                .toss
                .map(|toss| toss.describe(&self.fixture.team(toss.winner).name))
                .unwrap_or_default(),
            innings,
            degraded: self.is_degraded(),
        });
    }

    // ========================================================================
    // Resource sinks (degrade once, never abort)
    // ========================================================================

    fn log_delivery(&mut self, record: &DeliveryRecord) {
        if self.log_failed {
            return;
        }
        let (batting, bowling) = self.fixture.split(self.innings.batting_side());
        let row = LogRow::from_record(record, batting, bowling);
        if let Err(e) = self.ball_log.record(&row) {
            self.degrade_log(&e.to_string());
        }
    }

    fn degrade_log(&mut self, error: &str) {
        if !self.log_failed {
            tracing::warn!(match_id = %self.match_id, error, "delivery log failed; continuing without it");
            self.log_failed = true;
        }
    }

    fn autosave_now(&mut self) {
        if self.save_failed {
            return;
        }
        let Some(manager) = &self.autosave else {
            return;
        };
        if let Err(e) = manager.save(&self.snapshot()) {
            tracing::warn!(match_id = %self.match_id, error = %e, "autosave failed; continuing without snapshots");
            self.save_failed = true;
        }
    }

    // ========================================================================
    // Snapshots
    // ========================================================================

    pub fn snapshot(&self) -> MatchSnapshot {
        let inn = &self.innings;
        let (batting, bowling) = self.fixture.split(inn.batting_side());

        MatchSnapshot {
            version: SNAPSHOT_VERSION,
            timestamp: current_timestamp(),
            batting_team_tag: batting.tag.clone(),
            bowling_team_tag: bowling.tag.clone(),
            total_runs: inn.total_runs(),
            wickets: inn.wickets(),
            overs_completed: inn.overs_completed(),
            balls_bowled_in_over: inn.balls_bowled_in_over(),
            current_powerplay: inn.current_powerplay().number(),
            striker_idx: inn.striker(),
            non_striker_idx: inn.non_striker(),
            bowler_idx: inn.bowler(),
            max_overs: inn.max_overs(),
            target: inn.target(),
            rain_percentage: (inn.rain_probability() * 100.0).round().clamp(0.0, 100.0) as u8,
            rain_probability: Some(inn.rain_probability()),
            match_id: self.match_id.clone(),
            format: self.settings.format.code().to_string(),
            inning_num: inn.inning_num(),
            team_a_tag: self.fixture.teams[0].tag.clone(),
            team_b_tag: self.fixture.teams[1].tag.clone(),
            seed: self.settings.seed,
            rng_word_pos: u64::try_from(self.rng.get_word_pos()).unwrap_or(u64::MAX),
            previous_bowler_idx: inn.previous_bowler(),
            awaiting_batsman: inn.awaiting_batsman(),
            awaiting_bowler: inn.awaiting_bowler(),
            next_batsman_idx: inn.next_batsman(batting),
            batting_order: inn.batting_order().to_vec(),
            dismissed: inn.dismissed().to_vec(),
            bowler_deliveries: inn.bowler_deliveries().to_vec(),
            free_hit: inn.is_free_hit(),
            over_runs_conceded: inn.over_runs_conceded,
            batsman_selection: self.settings.batsman_selection,
            bowler_selection: self.settings.bowler_selection,
            card: Some(inn.card().clone()),
            first_innings: self.first_innings.clone(),
            toss: self.toss,
        }
    }

    /// Rebuild a runner from a snapshot, re-resolving both teams by tag.
    pub fn resume(
        snapshot: MatchSnapshot,
        roster: &dyn RosterProvider,
        config: EngineConfig,
    ) -> std::result::Result<Self, SaveError> {
        let snap = migrate_snapshot(snapshot)?;
        snap.validate()?;
        config.validate()?;

        let resolve = |tag: &str| {
            roster.team_by_tag(tag).ok_or_else(|| SaveError::UnresolvedTeam { tag: tag.to_string() })
        };
        for tag in [&snap.batting_team_tag, &snap.bowling_team_tag] {
            if *tag != snap.team_a_tag && *tag != snap.team_b_tag {
                return Err(SaveError::Invalid(format!("team {} is not part of this match", tag)));
            }
        }
        let team_a = resolve(&snap.team_a_tag)?;
        let team_b = resolve(&snap.team_b_tag)?;

        let format = snap.match_format()?;
        let rain_probability = snap.rain_chance();
        let settings = MatchSettings {
            format,
            rain_enabled: rain_probability > 0.0,
            rain_probability: Some(rain_probability),
            seed: snap.seed,
            batsman_selection: snap.batsman_selection,
            bowler_selection: snap.bowler_selection,
            match_id: Some(snap.match_id.clone()),
            toss_call: snap.toss.map_or(TossCall::Heads, |t| t.call),
            toss_choice: snap.toss.map_or(TossDecision::Bat, |t| t.decision),
        };

        let mut fixture = Fixture::new(team_a.playing_xi(), team_b.playing_xi());
        let batting_side = fixture
            .side_of_tag(&snap.batting_team_tag)
            .ok_or_else(|| SaveError::UnresolvedTeam { tag: snap.batting_team_tag.clone() })?;

        let mut innings = restore_innings(&snap, batting_side, &fixture, &settings, &config)?;
        let first_innings = match (snap.inning_num, snap.first_innings.clone()) {
            (1, _) => None,
            (_, Some(first)) => Some(first),
            // older snapshots only know the target
            (_, None) => Some(stub_first_innings(&snap, batting_side.other(), &fixture, &settings, &config)),
        };

        if let Some(first) = &first_innings {
            first.restore_match_stats(&mut fixture);
        }
        innings.restore_match_stats(&mut fixture);
        innings.begin(&fixture)?;

        let mut rng = ChaCha8Rng::seed_from_u64(snap.seed);
        rng.set_word_pos(snap.rng_word_pos as u128);

        tracing::info!(match_id = %snap.match_id, "resumed at {}", snap.score_line());

        Ok(Self {
            resolver: OutcomeResolver::new(config.resolver.clone()),
            settings,
            config,
            fixture,
            match_id: snap.match_id,
            rng,
            toss: snap.toss,
            first_innings,
            innings,
            outcome: None,
            ball_log: Box::new(NullBallLog),
            log_failed: false,
            autosave: None,
            save_failed: false,
            run_caller: Box::new(AutoRunCaller),
        })
    }
}

/// Convenience: play a whole match with automatic selections.
pub fn play_match(team_a: Team, team_b: Team, settings: MatchSettings, config: EngineConfig) -> Result<MatchOutcome> {
    let mut settings = settings;
    settings.batsman_selection = SelectionMode::Automatic;
    settings.bowler_selection = SelectionMode::Automatic;
    MatchRunner::new(team_a, team_b, settings, config)?.play_to_end()
}

fn innings_setup(
    inning_num: u8,
    batting_side: TeamSide,
    target: u16,
    settings: &MatchSettings,
    config: &EngineConfig,
) -> InningsSetup {
    InningsSetup {
        inning_num,
        batting_side,
        format: settings.format,
        max_overs: settings.format.overs_per_side(),
        target,
        rain_probability: settings.rain_probability(&config.weather),
        batsman_selection: settings.batsman_selection,
        bowler_selection: settings.bowler_selection,
    }
}

fn open_innings(
    inning_num: u8,
    batting_side: TeamSide,
    target: u16,
    fixture: &Fixture,
    settings: &MatchSettings,
    config: &EngineConfig,
) -> Result<InningsState> {
    let setup = innings_setup(inning_num, batting_side, target, settings, config);
    let mut innings = InningsState::new(setup, fixture, &config.weather);
    innings.begin(fixture)?;
    tracing::info!(inning = inning_num, batting = %fixture.team(batting_side).name, target, "innings start");
    Ok(innings)
}

fn restore_innings(
    snap: &MatchSnapshot,
    batting_side: TeamSide,
    fixture: &Fixture,
    settings: &MatchSettings,
    config: &EngineConfig,
) -> std::result::Result<InningsState, SaveError> {
    let (batting, bowling) = fixture.split(batting_side);
    let invalid = |what: String| SaveError::Invalid(what);

    let check_bat = |idx: Option<usize>| match idx {
        Some(i) if i >= batting.players.len() => Err(invalid(format!("batsman index {}", i))),
        _ => Ok(()),
    };
    check_bat(snap.striker_idx)?;
    check_bat(snap.non_striker_idx)?;
    for idx in [snap.bowler_idx, snap.previous_bowler_idx].into_iter().flatten() {
        if idx >= bowling.players.len() {
            return Err(invalid(format!("bowler index {}", idx)));
        }
    }
    if snap.bowler_deliveries.len() > bowling.players.len() {
        return Err(invalid("more bowler tallies than bowlers".into()));
    }

    let mut setup = innings_setup(snap.inning_num, batting_side, snap.target, settings, config);
    setup.max_overs = snap.max_overs;
    let mut inn = InningsState::new(setup, fixture, &config.weather);

    inn.total_runs = snap.total_runs;
    inn.wickets = snap.wickets;
    inn.overs_completed = snap.overs_completed;
    inn.balls_bowled_in_over = snap.balls_bowled_in_over;
    inn.striker = snap.striker_idx;
    inn.non_striker = snap.non_striker_idx;
    inn.bowler = snap.bowler_idx;
    inn.previous_bowler = snap.previous_bowler_idx;
    inn.current_powerplay = snap.powerplay()?;
    inn.batting_order = snap.batting_order.clone();
    inn.dismissed = snap.dismissed.clone();
    for (slot, balls) in inn.bowler_deliveries.iter_mut().zip(&snap.bowler_deliveries) {
        *slot = *balls;
    }
    inn.free_hit = snap.free_hit;
    inn.over_runs_conceded = snap.over_runs_conceded;
    inn.awaiting_batsman = snap.awaiting_batsman;
    inn.awaiting_bowler = snap.awaiting_bowler;
    if let Some(card) = &snap.card {
        if card.batting.len() != batting.players.len() || card.bowling.len() != bowling.players.len() {
            return Err(invalid("scorecard does not match the squads".into()));
        }
        inn.card = card.clone();
    } else {
        inn.card = InningsCard::new(batting.players.len(), bowling.players.len());
    }

    inn.phase = if inn.awaiting_bowler && inn.balls_bowled_in_over == 0 && inn.overs_completed > 0 {
        InningsPhase::EndOfOverPending
    } else {
        InningsPhase::InProgress
    };
    inn.check_termination();
    Ok(inn)
}

/// Completed first innings known only by its total.
fn stub_first_innings(
    snap: &MatchSnapshot,
    batting_side: TeamSide,
    fixture: &Fixture,
    settings: &MatchSettings,
    config: &EngineConfig,
) -> InningsState {
    let setup = innings_setup(1, batting_side, 0, settings, config);
    let mut first = InningsState::new(setup, fixture, &config.weather);
    first.total_runs = snap.target.saturating_sub(1);
    first.overs_completed = first.max_overs;
    first.awaiting_batsman = false;
    first.awaiting_bowler = false;
    first.phase = InningsPhase::InningsOver;
    first.end_reason = Some(InningsEnd::OversComplete);
    first
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ball_log::{LogError, MemoryBallLog};
    use crate::engine::test_fixtures::{create_short_team, create_test_team, create_test_team_with_skills};
    use crate::models::DismissalKind;
    use crate::roster::InMemoryRoster;
    use tempfile::TempDir;

    fn settings(format: MatchFormat, seed: u64) -> MatchSettings {
        let mut s = MatchSettings::new(format, seed);
        s.match_id = Some("IND_VS_AUS_TEST".into());
        s
    }

    fn runner(format: MatchFormat, seed: u64) -> MatchRunner {
        MatchRunner::new(
            create_test_team("India", "IND"),
            create_test_team("Australia", "AUS"),
            settings(format, seed),
            EngineConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_match_id_format() {
        assert_eq!(generate_match_id("IND", "AUS", 1_700_000_000), "IND_VS_AUS_1700000000");
        let r = MatchRunner::new(
            create_test_team("India", "IND"),
            create_test_team("Australia", "AUS"),
            MatchSettings::new(MatchFormat::T20, 1),
            EngineConfig::default(),
        )
        .unwrap();
        assert!(r.match_id().starts_with("IND_VS_AUS_"));
    }

    #[test]
    fn test_short_squad_rejected_before_toss() {
        let err = MatchRunner::new(
            create_short_team("Minnows", "MIN", 1),
            create_test_team("India", "IND"),
            MatchSettings::new(MatchFormat::T20, 1),
            EngineConfig::default(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, MatchError::InsufficientPlayers { kind: "batsmen", .. }));
        assert!(err.is_configuration());

        // 3 players cannot cover 120 balls at 24 each
        let err = validate_squad(&create_short_team("Minnows", "MIN", 3), MatchFormat::T20).unwrap_err();
        assert!(matches!(err, MatchError::InsufficientPlayers { required: 5, found: 3, .. }));
        assert!(validate_squad(&create_short_team("Minnows", "MIN", 3), MatchFormat::Test).is_ok());
    }

    #[test]
    fn test_same_team_rejected() {
        let err = MatchRunner::new(
            create_test_team("India", "IND"),
            create_test_team("India", "IND"),
            MatchSettings::new(MatchFormat::T20, 1),
            EngineConfig::default(),
        );
        assert!(matches!(err, Err(MatchError::InvalidTeam(_))));
    }

    #[test]
    fn test_full_t20_match() {
        let mut r = runner(MatchFormat::T20, 42);
        let outcome = r.play_to_end().unwrap();

        assert_eq!(outcome.innings.len(), 2);
        let (first, second) = (&outcome.innings[0], &outcome.innings[1]);
        assert_eq!(second.target, first.runs + 1);
        assert!(first.legal_balls <= 120);
        assert!(second.legal_balls <= 120);
        assert_ne!(first.batting_team, second.batting_team);
        assert!(!outcome.degraded);

        match outcome.result {
            MatchResult::Won { winner, margin: Margin::Runs(n) } => {
                assert_eq!(n, first.runs - second.runs);
                assert_eq!(r.fixture().team(winner).name, first.batting_team);
            }
            MatchResult::Won { margin: Margin::Wickets(_), .. } => assert!(second.runs > first.runs),
            MatchResult::Tied => assert_eq!(first.runs, second.runs),
            MatchResult::Drawn => panic!("limited-overs matches cannot be drawn"),
        }
        assert!(outcome.summary.contains(" beat ") || outcome.summary == "Match tied");

        // careers folded in exactly once
        assert!(r.fixture().teams.iter().flat_map(|t| &t.players).all(|p| p.career.matches_played == 1));
        assert_eq!(r.step().unwrap(), MatchProgress::Finished);
    }

    #[test]
    fn test_same_seed_same_match() {
        let a = runner(MatchFormat::T20, 7).play_to_end().unwrap();
        let b = runner(MatchFormat::T20, 7).play_to_end().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_innings_break_reports_target() {
        let mut r = runner(MatchFormat::T20, 3);
        let target = loop {
            if let MatchProgress::InningsBreak { target } = r.step().unwrap() {
                break target;
            }
        };
        let first = r.first_innings().unwrap();
        assert_eq!(target, first.total_runs() + 1);
        assert_eq!(r.innings().inning_num(), 2);
        assert_eq!(r.innings().batting_side(), first.bowling_side());
        assert_eq!(r.innings().target(), target);
    }

    #[test]
    fn test_scripted_chase_ends_mid_over() {
        let mut r = runner(MatchFormat::T20, 1);
        // first innings: 20 overs of singles = 120
        while r.first_innings().is_none() {
            if r.innings().is_over() {
                r.step().unwrap();
            } else {
                r.deliver(DeliveryOutcome::Runs(1)).unwrap();
            }
        }
        assert_eq!(r.innings().target(), 121);

        for _ in 0..118 {
            r.deliver(DeliveryOutcome::Runs(1)).unwrap();
        }
        // level with the target is not enough
        assert!(!r.innings().is_over());
        assert_eq!(r.innings().total_runs(), 118);
        let rec = r.deliver(DeliveryOutcome::Runs(4)).unwrap();
        assert_eq!(rec.innings_end, Some(InningsEnd::TargetReached));
        assert_ne!(rec.ball, 6);
        assert_eq!(r.step().unwrap(), MatchProgress::Finished);

        let outcome = r.outcome().unwrap();
        assert!(matches!(outcome.result, MatchResult::Won { margin: Margin::Wickets(10), .. }));
        assert!(outcome.summary.ends_with("by 10 wickets"));
    }

    #[test]
    fn test_result_decisions() {
        let fixture = crate::engine::test_fixtures::create_test_fixture();
        let weather = crate::engine::config::WeatherConfig::default();
        let setup = |n, side, target, format| InningsSetup {
            inning_num: n,
            batting_side: side,
            format,
            max_overs: 20,
            target,
            rain_probability: 0.0,
            batsman_selection: SelectionMode::Automatic,
            bowler_selection: SelectionMode::Automatic,
        };
        let mut first = InningsState::new(setup(1, TeamSide::A, 0, MatchFormat::T20), &fixture, &weather);
        first.total_runs = 150;
        let mut second = InningsState::new(setup(2, TeamSide::B, 151, MatchFormat::T20), &fixture, &weather);

        second.total_runs = 140;
        second.wickets = 10;
        let r = MatchResult::decide(&first, &second);
        assert_eq!(r, MatchResult::Won { winner: TeamSide::A, margin: Margin::Runs(10) });
        assert_eq!(r.describe(&fixture), "India beat Australia by 10 runs");

        second.total_runs = 152;
        second.wickets = 9;
        let r = MatchResult::decide(&first, &second);
        assert_eq!(r.describe(&fixture), "Australia beat India by 1 wicket");

        second.total_runs = 150;
        assert_eq!(MatchResult::decide(&first, &second), MatchResult::Tied);

        let mut test_second = InningsState::new(setup(2, TeamSide::B, 151, MatchFormat::Test), &fixture, &weather);
        test_second.total_runs = 120;
        test_second.end_reason = Some(InningsEnd::OversComplete);
        assert_eq!(MatchResult::decide(&first, &test_second), MatchResult::Drawn);
        test_second.end_reason = Some(InningsEnd::AllOut);
        assert_eq!(MatchResult::decide(&first, &test_second).winner(), Some(TeamSide::A));
    }

    #[test]
    fn test_deferred_selection_flow() {
        let mut s = settings(MatchFormat::T20, 9);
        s.batsman_selection = SelectionMode::Deferred;
        s.bowler_selection = SelectionMode::Deferred;
        let mut r = MatchRunner::new(create_test_team("India", "IND"), create_test_team("Australia", "AUS"), s, EngineConfig::default())
            .unwrap();

        assert_eq!(r.step().unwrap(), MatchProgress::AwaitingBatsman);
        assert!(matches!(r.play_to_end(), Err(MatchError::AwaitingSelection("batsman"))));

        let mut overs_seen = 0;
        loop {
            match r.step().unwrap() {
                MatchProgress::AwaitingBatsman => {
                    let next = r.available_batsmen()[0];
                    r.supply_batsman(next).unwrap();
                }
                MatchProgress::AwaitingBowler => {
                    let eligible = r.eligible_bowlers();
                    assert!(!eligible.contains(&r.innings().previous_bowler().unwrap_or(usize::MAX)));
                    // always the last eligible player
                    r.supply_bowler(*eligible.last().unwrap()).unwrap();
                    overs_seen += 1;
                }
                MatchProgress::Finished => break,
                _ => {}
            }
        }
        assert!(overs_seen > 0);
        assert!(r.is_finished());
    }

    #[test]
    fn test_failing_log_degrades_once() {
        struct Broken(u32);
        impl BallLog for Broken {
            fn record(&mut self, _row: &LogRow) -> std::result::Result<(), LogError> {
                self.0 += 1;
                Err(LogError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk full")))
            }
        }

        let mut r = runner(MatchFormat::T20, 5).with_ball_log(Box::new(Broken(0)));
        let outcome = r.play_to_end().unwrap();
        assert!(outcome.degraded);
        assert_eq!(outcome.innings.len(), 2);
    }

    #[test]
    fn test_memory_log_sees_every_delivery() {
        use std::cell::RefCell;
        use std::rc::Rc;

        struct Shared(Rc<RefCell<MemoryBallLog>>);
        impl BallLog for Shared {
            fn record(&mut self, row: &LogRow) -> std::result::Result<(), LogError> {
                self.0.borrow_mut().record(row)
            }
        }

        let log = Rc::new(RefCell::new(MemoryBallLog::default()));
        let mut r = runner(MatchFormat::T20, 12).with_ball_log(Box::new(Shared(log.clone())));
        let mut deliveries = 0;
        while r.step().unwrap() != MatchProgress::Finished {
            deliveries += 1;
        }
        let rows = &log.borrow().rows;
        // two non-delivery steps: the innings break and the final close
        assert_eq!(rows.len(), deliveries - 1);
        assert!(rows.iter().all(|row| (1..=6).contains(&row.ball)));
        assert!(rows.iter().any(|row| row.inning == 2));
    }

    fn resume_and_finish(snap: MatchSnapshot) -> MatchOutcome {
        let roster = InMemoryRoster::with_teams([create_test_team("India", "IND"), create_test_team("Australia", "AUS")])
            .unwrap();
        let mut resumed = MatchRunner::resume(snap, &roster, EngineConfig::default()).unwrap();
        resumed.play_to_end().unwrap()
    }

    #[test]
    fn test_resume_matches_uninterrupted_play() {
        let uninterrupted = runner(MatchFormat::T20, 99).play_to_end().unwrap();

        // mid first innings
        let mut r = runner(MatchFormat::T20, 99);
        for _ in 0..60 {
            r.step().unwrap();
        }
        let outcome = resume_and_finish(r.snapshot());
        assert_eq!(outcome.innings, uninterrupted.innings);
        assert_eq!(outcome.summary, uninterrupted.summary);

        // early in the chase
        let mut r = runner(MatchFormat::T20, 99);
        while !matches!(r.step().unwrap(), MatchProgress::InningsBreak { .. }) {}
        for _ in 0..15 {
            r.step().unwrap();
        }
        assert_eq!(r.snapshot().inning_num, 2);
        let outcome = resume_and_finish(r.snapshot());
        assert_eq!(outcome.innings, uninterrupted.innings);
        assert_eq!(outcome.result, uninterrupted.result);
    }

    #[test]
    fn test_resume_unknown_tag_fails() {
        let snap = runner(MatchFormat::T20, 2).snapshot();
        let roster = InMemoryRoster::with_teams([create_test_team("India", "IND")]).unwrap();
        assert!(matches!(
            MatchRunner::resume(snap, &roster, EngineConfig::default()),
            Err(SaveError::UnresolvedTeam { tag }) if tag == "AUS"
        ));
    }

    #[test]
    fn test_resume_keeps_fractional_rain_chance() {
        let rainy = || {
            let mut s = settings(MatchFormat::T20, 31).with_rain(true);
            s.rain_probability = Some(0.124);
            MatchRunner::new(create_test_team("India", "IND"), create_test_team("Australia", "AUS"), s, EngineConfig::default())
                .unwrap()
        };
        let uninterrupted = rainy().play_to_end().unwrap();

        let mut r = rainy();
        for _ in 0..40 {
            r.step().unwrap();
        }
        let snap = r.snapshot();
        assert_eq!(snap.rain_percentage, 12);

        let roster = InMemoryRoster::with_teams([create_test_team("India", "IND"), create_test_team("Australia", "AUS")])
            .unwrap();
        let mut resumed = MatchRunner::resume(snap, &roster, EngineConfig::default()).unwrap();
        assert_eq!(resumed.innings().rain_probability(), 0.124);
        assert_eq!(resumed.play_to_end().unwrap().innings, uninterrupted.innings);
    }

    #[test]
    fn test_resume_without_toss_record_reports_no_toss() {
        let mut r = runner(MatchFormat::T20, 17);
        for _ in 0..10 {
            r.step().unwrap();
        }
        let mut snap = r.snapshot();
        snap.toss = None;

        let outcome = resume_and_finish(snap);
        assert_eq!(outcome.toss, None);
        assert!(outcome.toss_summary.is_empty());
        assert!(runner(MatchFormat::T20, 17).play_to_end().unwrap().toss_summary.contains("won the toss"));
    }

    #[test]
    fn test_autosave_written_and_removed() {
        let dir = TempDir::new().unwrap();
        let manager = SaveManager::new(dir.path());
        let mut r = runner(MatchFormat::T20, 4).with_autosave(manager.clone());

        // one over
        let mut completed = false;
        while !completed {
            if let MatchProgress::Delivered(rec) = r.step().unwrap() {
                completed = rec.over_completed;
            }
        }
        let saved = manager.load("IND_VS_AUS_TEST").unwrap();
        assert_eq!(saved.overs_completed, 1);
        assert_eq!(saved.balls_bowled_in_over, 0);

        r.play_to_end().unwrap();
        assert!(!manager.exists("IND_VS_AUS_TEST"));
    }

    #[test]
    fn test_skill_gap_shapes_scores() {
        let strong = create_test_team_with_skills("Strong", "STR", 95, 95);
        let weak = create_test_team_with_skills("Weak", "WEK", 10, 10);
        let mut wins = 0;
        for seed in 0..10 {
            let outcome = play_match(strong.clone(), weak.clone(), MatchSettings::new(MatchFormat::T20, seed), EngineConfig::default())
                .unwrap();
            if outcome.result.winner() == Some(TeamSide::A) {
                wins += 1;
            }
        }
        assert!(wins >= 8, "strong side won only {} of 10", wins);
    }

    #[test]
    fn test_over_calling_runner_keeps_overs_and_extras_straight() {
        use crate::engine::shot::RunCallContext;

        let mut config = EngineConfig::default();
        config.resolver.no_ball_pct = 30.0;
        let mut r = MatchRunner::new(
            create_test_team("India", "IND"),
            create_test_team("Australia", "AUS"),
            settings(MatchFormat::T20, 21),
            config,
        )
        .unwrap()
        .with_run_caller(Box::new(|c: &RunCallContext| c.safe_runs + 1));

        let mut legal_in_over = 0u8;
        let mut no_balls = [0u16; 2];
        let mut no_ball_run_outs = 0;
        loop {
            match r.step().unwrap() {
                MatchProgress::Finished => break,
                MatchProgress::Delivered(rec) => {
                    if rec.outcome.is_legal() {
                        legal_in_over += 1;
                    }
                    assert!(legal_in_over <= 6);
                    if rec.over_completed {
                        assert_eq!(legal_in_over, 6);
                    }
                    if rec.over_completed || rec.innings_end.is_some() {
                        legal_in_over = 0;
                    }
                    if rec.outcome.is_no_ball() {
                        no_balls[rec.inning_num as usize - 1] += 1;
                    }
                    if matches!(rec.outcome, DeliveryOutcome::NoBallRunOut { .. }) {
                        no_ball_run_outs += 1;
                    }
                }
                _ => {}
            }
        }

        assert!(no_ball_run_outs > 0);
        let outcome = r.outcome().unwrap();
        for (summary, counted) in outcome.innings.iter().zip(no_balls) {
            assert_eq!(summary.extras.no_balls, counted);
        }
    }

    #[test]
    fn test_free_hit_through_runner() {
        let mut r = runner(MatchFormat::Odi, 8);
        r.deliver(DeliveryOutcome::NoBall(0)).unwrap();
        let rec = r.deliver(DeliveryOutcome::Wicket { kind: DismissalKind::Lbw, fielder: None, runs: 0 }).unwrap();
        assert_eq!(rec.outcome, DeliveryOutcome::Dot);
        assert_eq!(r.innings().wickets(), 0);
    }
}
