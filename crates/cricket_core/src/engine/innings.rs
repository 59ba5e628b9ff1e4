//! Innings State Machine
//!
//! Owns one innings' mutable state and applies resolved deliveries to it.
//!
//! ```text
//! InProgress ──(6th legal ball)──> EndOfOverPending ──(bowler chosen)──> InProgress
//!      │                                   │
//!      └──(all out / overs done / chase)───┴──> InningsOver
//! ```
//!
//! `advance_one_delivery` is all-or-nothing: every check that can fail runs
//! before the state or any player counter is touched.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::config::{SelectionMode, WeatherConfig};
use super::rotation::{self, BowlingLimits};
use super::scorecard::{
    describe_dismissal, overs_display, required_run_rate, run_rate, BattingSummaryLine,
    BowlingSummaryLine, Dismissal, FallOfWicket, InningsCard, InningsSummary,
};
use crate::error::{MatchError, Result};
use crate::models::{DeliveryOutcome, DismissalKind, Fixture, MatchFormat, PowerplayPhase, Team, TeamSide};

pub const BALLS_PER_OVER: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InningsPhase {
    InProgress,
    /// Over complete, next bowler not chosen yet
    EndOfOverPending,
    InningsOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InningsEnd {
    AllOut,
    OversComplete,
    TargetReached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RainStoppage {
    pub after_over: u16,
    pub from: u16,
    pub to: u16,
}

/// Everything that happened on one delivery, for logging and display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub inning_num: u8,
    /// Over the ball was bowled in (0-based)
    pub over: u16,
    /// Legal-ball slot within the over (1-6); re-bowled extras share a slot
    pub ball: u8,
    pub bowler: usize,
    pub striker: usize,
    pub non_striker: usize,
    pub outcome: DeliveryOutcome,
    /// The delivery was a free hit
    pub free_hit: bool,
    pub batsman_out: Option<usize>,
    pub total_runs: u16,
    pub wickets: u8,
    pub over_completed: bool,
    pub rain: Option<RainStoppage>,
    pub innings_end: Option<InningsEnd>,
}

/// Parameters fixed when an innings starts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InningsSetup {
    pub inning_num: u8,
    pub batting_side: TeamSide,
    pub format: MatchFormat,
    pub max_overs: u16,
    /// 0 in the first innings
    pub target: u16,
    pub rain_probability: f32,
    pub batsman_selection: SelectionMode,
    pub bowler_selection: SelectionMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InningsState {
    pub(crate) inning_num: u8,
    pub(crate) batting_side: TeamSide,
    pub(crate) format: MatchFormat,

    pub(crate) total_runs: u16,
    pub(crate) wickets: u8,
    pub(crate) all_out_at: u8,
    pub(crate) overs_completed: u16,
    pub(crate) balls_bowled_in_over: u8,

    pub(crate) striker: Option<usize>,
    pub(crate) non_striker: Option<usize>,
    pub(crate) bowler: Option<usize>,
    pub(crate) previous_bowler: Option<usize>,
    pub(crate) current_powerplay: PowerplayPhase,

    pub(crate) max_overs: u16,
    pub(crate) target: u16,
    pub(crate) rain_probability: f32,
    pub(crate) overs_lost_min: u16,
    pub(crate) overs_lost_max: u16,

    /// Batsmen in the order they came in
    pub(crate) batting_order: Vec<usize>,
    pub(crate) dismissed: Vec<usize>,
    /// Legal deliveries per bowling-team player
    pub(crate) bowler_deliveries: Vec<u16>,
    pub(crate) over_runs_conceded: u16,
    pub(crate) free_hit: bool,

    pub(crate) batsman_selection: SelectionMode,
    pub(crate) bowler_selection: SelectionMode,
    pub(crate) awaiting_batsman: bool,
    pub(crate) awaiting_bowler: bool,

    pub(crate) phase: InningsPhase,
    pub(crate) end_reason: Option<InningsEnd>,
    pub(crate) card: InningsCard,
}

impl InningsState {
    /// Fresh innings with openers and bowler unset.
    pub fn new(setup: InningsSetup, fixture: &Fixture, weather: &WeatherConfig) -> Self {
        let (batting, bowling) = fixture.split(setup.batting_side);
        Self {
            inning_num: setup.inning_num,
            batting_side: setup.batting_side,
            format: setup.format,
            total_runs: 0,
            wickets: 0,
            all_out_at: batting.all_out_wickets(),
            overs_completed: 0,
            balls_bowled_in_over: 0,
            striker: None,
            non_striker: None,
            bowler: None,
            previous_bowler: None,
            current_powerplay: setup.format.phase_for(0),
            max_overs: setup.max_overs,
            target: setup.target,
            rain_probability: setup.rain_probability,
            overs_lost_min: weather.min_overs_lost,
            overs_lost_max: weather.max_overs_lost,
            batting_order: Vec::new(),
            dismissed: Vec::new(),
            bowler_deliveries: vec![0; bowling.players.len()],
            over_runs_conceded: 0,
            free_hit: false,
            batsman_selection: setup.batsman_selection,
            bowler_selection: setup.bowler_selection,
            awaiting_batsman: true,
            awaiting_bowler: true,
            phase: InningsPhase::InProgress,
            end_reason: None,
            card: InningsCard::new(batting.players.len(), bowling.players.len()),
        }
    }

    /// Fill whatever the engine chooses itself (openers, first bowler).
    pub fn begin(&mut self, fixture: &Fixture) -> Result<()> {
        self.check_termination();
        if self.is_over() {
            return Ok(());
        }
        let (batting, bowling) = fixture.split(self.batting_side);
        self.fill_automatic(batting, bowling)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn inning_num(&self) -> u8 {
        self.inning_num
    }
    pub fn batting_side(&self) -> TeamSide {
        self.batting_side
    }
    pub fn bowling_side(&self) -> TeamSide {
        self.batting_side.other()
    }
    pub fn format(&self) -> MatchFormat {
        self.format
    }
    pub fn total_runs(&self) -> u16 {
        self.total_runs
    }
    pub fn wickets(&self) -> u8 {
        self.wickets
    }
    pub fn all_out_at(&self) -> u8 {
        self.all_out_at
    }
    pub fn overs_completed(&self) -> u16 {
        self.overs_completed
    }
    pub fn balls_bowled_in_over(&self) -> u8 {
        self.balls_bowled_in_over
    }
    pub fn striker(&self) -> Option<usize> {
        self.striker
    }
    pub fn non_striker(&self) -> Option<usize> {
        self.non_striker
    }
    pub fn bowler(&self) -> Option<usize> {
        self.bowler
    }
    pub fn previous_bowler(&self) -> Option<usize> {
        self.previous_bowler
    }
    pub fn max_overs(&self) -> u16 {
        self.max_overs
    }
    pub fn target(&self) -> u16 {
        self.target
    }
    pub fn rain_probability(&self) -> f32 {
        self.rain_probability
    }
    pub fn phase(&self) -> InningsPhase {
        self.phase
    }
    pub fn end_reason(&self) -> Option<InningsEnd> {
        self.end_reason
    }
    pub fn is_over(&self) -> bool {
        self.phase == InningsPhase::InningsOver
    }
    pub fn is_free_hit(&self) -> bool {
        self.free_hit
    }
    pub fn awaiting_batsman(&self) -> bool {
        self.awaiting_batsman
    }
    pub fn awaiting_bowler(&self) -> bool {
        self.awaiting_bowler
    }
    pub fn batting_order(&self) -> &[usize] {
        &self.batting_order
    }
    pub fn dismissed(&self) -> &[usize] {
        &self.dismissed
    }
    pub fn bowler_deliveries(&self) -> &[u16] {
        &self.bowler_deliveries
    }
    pub fn card(&self) -> &InningsCard {
        &self.card
    }

    /// Fielding-restriction phase for the next delivery, from `overs_completed`.
    pub fn current_powerplay(&self) -> PowerplayPhase {
        self.format.phase_for(self.overs_completed)
    }

    pub fn legal_balls(&self) -> u16 {
        self.overs_completed * BALLS_PER_OVER as u16 + self.balls_bowled_in_over as u16
    }

    pub fn balls_remaining(&self) -> u16 {
        (self.max_overs * BALLS_PER_OVER as u16).saturating_sub(self.legal_balls())
    }

    pub fn run_rate(&self) -> Option<f32> {
        run_rate(self.total_runs, self.legal_balls())
    }

    pub fn required_run_rate(&self) -> Option<f32> {
        if self.target == 0 {
            return None;
        }
        required_run_rate(self.target, self.total_runs, self.balls_remaining())
    }

    pub fn bowling_limits(&self) -> BowlingLimits<'_> {
        BowlingLimits {
            previous: self.previous_bowler,
            deliveries: &self.bowler_deliveries,
            cap: self.format.bowler_delivery_cap(),
        }
    }

    /// Ready to bowl, or why not.
    pub fn can_deliver(&self) -> Result<()> {
        if self.is_over() {
            return Err(MatchError::InningsOver);
        }
        if self.awaiting_batsman || self.striker.is_none() || self.non_striker.is_none() {
            return Err(MatchError::AwaitingSelection("batsman"));
        }
        if self.awaiting_bowler || self.bowler.is_none() {
            return Err(MatchError::AwaitingSelection("bowler"));
        }
        Ok(())
    }

    // ========================================================================
    // Delivery
    // ========================================================================

    /// Apply one resolved delivery.
    pub fn advance_one_delivery<R: Rng + ?Sized>(
        &mut self,
        fixture: &mut Fixture,
        outcome: DeliveryOutcome,
        rng: &mut R,
    ) -> Result<DeliveryRecord> {
        self.check_termination();
        self.can_deliver()?;

        let (striker, non_striker, bowler) = match (self.striker, self.non_striker, self.bowler) {
            (Some(s), Some(n), Some(b)) => (s, n, b),
            _ => return Err(MatchError::AwaitingSelection("batsman")),
        };

        let (batting, bowling) = fixture.split(self.batting_side);
        if let Some((_, Some(f))) = outcome.wicket() {
            if f >= bowling.players.len() {
                return Err(MatchError::InvalidFielder(f));
            }
        }

        let mut next = self.clone();
        let was_free_hit = next.free_hit;
        let outcome = match outcome {
            DeliveryOutcome::Wicket { kind, runs, .. } if was_free_hit && !kind.stands_on_free_hit() => {
                tracing::debug!(inning = self.inning_num, "free hit: dismissal void");
                if runs > 0 {
                    DeliveryOutcome::Runs(runs)
                } else {
                    DeliveryOutcome::Dot
                }
            }
            other => other,
        };

        let over = next.overs_completed;
        let ball = next.balls_bowled_in_over + 1;
        next.current_powerplay = next.format.phase_for(next.overs_completed);

        // --- runs ---
        let legal = outcome.is_legal();
        let batsman_runs = outcome.batsman_runs();
        let bowler_runs = outcome.bowler_runs();
        next.total_runs += outcome.team_runs();
        next.card.extras.record(&outcome);

        let faced = !matches!(outcome, DeliveryOutcome::Wide(_));
        let line = &mut next.card.batting[striker];
        if faced {
            line.balls += 1;
        }
        line.runs += batsman_runs;
        match batsman_runs {
            4 => line.fours += 1,
            6 => line.sixes += 1,
            _ => {}
        }

        let figures = &mut next.card.bowling[bowler];
        figures.runs += bowler_runs;
        if matches!(outcome, DeliveryOutcome::Wide(_)) {
            figures.wides += 1;
        } else if outcome.is_no_ball() {
            figures.no_balls += 1;
        }
        next.over_runs_conceded += bowler_runs;

        if legal {
            figures.balls += 1;
            next.bowler_deliveries[bowler] += 1;
            next.balls_bowled_in_over += 1;
        }

        if outcome.runs_run() % 2 == 1 {
            std::mem::swap(&mut next.striker, &mut next.non_striker);
        }

        // --- wicket ---
        let mut batsman_out = None;
        if let Some((kind, fielder)) = outcome.wicket() {
            next.wickets += 1;
            batsman_out = Some(striker);
            next.dismissed.push(striker);
            next.card.batting[striker].dismissal = Some(Dismissal { kind, bowler, fielder });
            if kind.credits_bowler() {
                next.card.bowling[bowler].wickets += 1;
            }
            next.card.fall_of_wickets.push(FallOfWicket {
                wicket: next.wickets,
                runs: next.total_runs,
                batsman: striker,
                balls: next.legal_balls(),
            });

            if next.striker == Some(striker) {
                next.striker = None;
            } else {
                next.non_striker = None;
            }
            next.awaiting_batsman = true;
        }

        next.free_hit = match outcome {
            DeliveryOutcome::Wide(_) => was_free_hit,
            other => other.is_no_ball(),
        };

        // --- end of over ---
        let over_completed = next.balls_bowled_in_over >= BALLS_PER_OVER;
        if over_completed {
            next.overs_completed += 1;
            next.balls_bowled_in_over = 0;
            std::mem::swap(&mut next.striker, &mut next.non_striker);
            if next.over_runs_conceded == 0 {
                next.card.bowling[bowler].maidens += 1;
            }
            next.over_runs_conceded = 0;
            next.previous_bowler = Some(bowler);
            next.bowler = None;
            next.awaiting_bowler = true;
            next.phase = InningsPhase::EndOfOverPending;
        }

        next.check_termination();

        let mut rain = None;
        if !next.is_over() {
            next.fill_automatic(batting, bowling)?;
            if over_completed {
                rain = next.rain_check(rng);
            }
        }

        let record = DeliveryRecord {
            inning_num: next.inning_num,
            over,
            ball,
            bowler,
            striker,
            non_striker,
            outcome,
            free_hit: was_free_hit,
            batsman_out,
            total_runs: next.total_runs,
            wickets: next.wickets,
            over_completed,
            rain,
            innings_end: next.end_reason,
        };

        // --- commit ---
        let (batting, bowling) = fixture.split_mut(self.batting_side);
        credit_delivery(batting, bowling, striker, bowler, &outcome);
        *self = next;

        if let Some(end) = self.end_reason {
            tracing::info!(
                inning = self.inning_num,
                runs = self.total_runs,
                wickets = self.wickets,
                overs = %overs_display(self.legal_balls()),
                reason = ?end,
                "innings over"
            );
        }
        Ok(record)
    }

    pub(crate) fn check_termination(&mut self) {
        if self.is_over() {
            return;
        }
        let reason = if self.target > 0 && self.total_runs > self.target {
            InningsEnd::TargetReached
        } else if self.wickets >= self.all_out_at {
            InningsEnd::AllOut
        } else if self.overs_completed >= self.max_overs {
            InningsEnd::OversComplete
        } else {
            return;
        };

        self.phase = InningsPhase::InningsOver;
        self.end_reason = Some(reason);
        self.awaiting_batsman = false;
        self.awaiting_bowler = false;
    }

    // ========================================================================
    // Selection
    // ========================================================================

    fn fill_automatic(&mut self, batting: &Team, bowling: &Team) -> Result<()> {
        if self.awaiting_batsman && self.batsman_selection == SelectionMode::Automatic {
            while self.striker.is_none() || self.non_striker.is_none() {
                let next = self.next_batsman(batting).ok_or_else(|| MatchError::InsufficientPlayers {
                    team: batting.name.clone(),
                    kind: "batsmen",
                    required: self.batting_order.len() + 1,
                    found: self.batting_order.len(),
                })?;
                self.place_batsman(next);
            }
        }

        if self.awaiting_bowler && self.bowler_selection == SelectionMode::Automatic {
            let next = rotation::select_next_bowler(bowling, &self.bowling_limits())?;
            self.set_bowler(next);
        }
        Ok(())
    }

    /// Lowest squad position that has not batted yet.
    pub fn next_batsman(&self, batting: &Team) -> Option<usize> {
        (0..batting.players.len())
            .find(|&i| batting.players[i].is_active && !self.batting_order.contains(&i))
    }

    fn place_batsman(&mut self, index: usize) {
        if self.striker.is_none() {
            self.striker = Some(index);
        } else {
            self.non_striker = Some(index);
        }
        self.batting_order.push(index);
        if self.striker.is_some() && self.non_striker.is_some() {
            self.awaiting_batsman = false;
        }
    }

    fn set_bowler(&mut self, index: usize) {
        self.bowler = Some(index);
        self.awaiting_bowler = false;
        if self.phase == InningsPhase::EndOfOverPending {
            self.phase = InningsPhase::InProgress;
        }
    }

    /// Supply a batsman while one is awaited.
    pub fn supply_batsman(&mut self, batting: &Team, index: usize) -> Result<()> {
        if self.is_over() {
            return Err(MatchError::InningsOver);
        }
        let reject = |reason| Err(MatchError::IneligibleBatsman { index, reason });
        if !self.awaiting_batsman {
            return reject("no batsman is awaited");
        }
        match batting.players.get(index) {
            None => return reject("no such player"),
            Some(p) if !p.is_active => return reject("player is inactive"),
            Some(_) => {}
        }
        if self.dismissed.contains(&index) {
            return reject("already dismissed");
        }
        if self.striker == Some(index) || self.non_striker == Some(index) {
            return reject("already at the crease");
        }
        if self.batting_order.contains(&index) {
            return reject("already batted");
        }

        self.place_batsman(index);
        Ok(())
    }

    /// Supply the bowler for the next over while one is awaited.
    pub fn supply_bowler(&mut self, bowling: &Team, index: usize) -> Result<()> {
        if self.is_over() {
            return Err(MatchError::InningsOver);
        }
        if !self.awaiting_bowler {
            return Err(MatchError::IneligibleBowler { index, reason: "no bowler is awaited" });
        }
        rotation::check_bowler(bowling, index, &self.bowling_limits())?;
        self.set_bowler(index);
        Ok(())
    }

    /// Who may bowl the next over
    pub fn eligible_bowlers(&self, bowling: &Team) -> Vec<usize> {
        rotation::eligible_bowlers(bowling, &self.bowling_limits())
    }

    // ========================================================================
    // Weather
    // ========================================================================

    /// Shorten the innings to `new_max` overs. Increases are rejected;
    /// reductions below `overs_completed + 1` are clamped to it.
    /// Returns the resulting maximum.
    pub fn reduce_max_overs(&mut self, new_max: u16) -> Result<u16> {
        if self.is_over() {
            return Err(MatchError::InningsOver);
        }
        if new_max > self.max_overs {
            return Err(MatchError::InvalidOversChange { current: self.max_overs, requested: new_max });
        }

        let floor = self.overs_completed + 1;
        let applied = new_max.max(floor).min(self.max_overs);
        if applied != new_max {
            tracing::warn!(requested = new_max, applied, floor, "overs reduction clamped");
        }
        self.max_overs = applied;
        Ok(applied)
    }

    /// End-of-over stoppage check.
    fn rain_check<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<RainStoppage> {
        if self.is_over() || self.rain_probability <= 0.0 {
            return None;
        }
        let roll: u32 = rng.gen_range(0..100);
        if roll as f32 >= self.rain_probability * 100.0 {
            return None;
        }

        let lost = rng.gen_range(self.overs_lost_min..=self.overs_lost_max);
        let from = self.max_overs;
        let to = self.reduce_max_overs(from.saturating_sub(lost)).ok()?;
        if to == from {
            return None;
        }
        tracing::info!(inning = self.inning_num, after_over = self.overs_completed, from, to, "rain stoppage");
        Some(RainStoppage { after_over: self.overs_completed, from, to })
    }

    // ========================================================================
    // Scorecard
    // ========================================================================

    pub fn summary(&self, fixture: &Fixture) -> InningsSummary {
        let (batting, bowling) = fixture.split(self.batting_side);
        let name = |team: &Team, i: usize| team.players.get(i).map(|p| p.name.clone()).unwrap_or_default();

        let batting_lines = self
            .batting_order
            .iter()
            .filter_map(|&i| self.card.batting.get(i).map(|line| (i, line)))
            .map(|(i, line)| BattingSummaryLine {
                name: name(batting, i),
                runs: line.runs,
                balls: line.balls,
                fours: line.fours,
                sixes: line.sixes,
                how_out: describe_dismissal(line, bowling),
            })
            .collect();

        let bowling_lines = self
            .card
            .bowling
            .iter()
            .enumerate()
            .filter(|(_, line)| line.balls > 0 || line.wides > 0 || line.no_balls > 0)
            .map(|(i, line)| BowlingSummaryLine {
                name: name(bowling, i),
                overs: overs_display(line.balls),
                maidens: line.maidens,
                runs: line.runs,
                wickets: line.wickets,
                economy: line.economy(),
            })
            .collect();

        InningsSummary {
            inning_num: self.inning_num,
            batting_team: batting.name.clone(),
            bowling_team: bowling.name.clone(),
            runs: self.total_runs,
            wickets: self.wickets,
            overs: overs_display(self.legal_balls()),
            legal_balls: self.legal_balls(),
            max_overs: self.max_overs,
            target: self.target,
            extras: self.card.extras,
            run_rate: self.run_rate(),
            batting: batting_lines,
            bowling: bowling_lines,
            fall_of_wickets: self.card.fall_of_wickets.clone(),
        }
    }

    /// Re-derive player match counters from this innings' scorecard
    /// (used when resuming a saved match).
    pub fn restore_match_stats(&self, fixture: &mut Fixture) {
        let (batting, bowling) = fixture.split_mut(self.batting_side);

        for (i, line) in self.card.batting.iter().enumerate() {
            if let Some(p) = batting.players.get_mut(i) {
                p.match_stats.balls_faced += line.balls as u32;
                p.match_stats.runs_scored += line.runs as u32;
            }
            if let Some(d) = line.dismissal {
                if let Some(f) = d.fielder.and_then(|f| bowling.players.get_mut(f)) {
                    match d.kind {
                        DismissalKind::Stumped => f.match_stats.stumpings += 1,
                        DismissalKind::RunOut => f.match_stats.run_outs += 1,
                        _ => {}
                    }
                }
            }
        }
        for (i, line) in self.card.bowling.iter().enumerate() {
            if let Some(p) = bowling.players.get_mut(i) {
                p.match_stats.balls_bowled += line.balls as u32;
                p.match_stats.runs_conceded += line.runs as u32;
                p.match_stats.wickets += line.wickets as u32;
            }
        }
    }
}

/// Per-delivery player counters. Indices were validated before this runs.
fn credit_delivery(batting: &mut Team, bowling: &mut Team, striker: usize, bowler: usize, outcome: &DeliveryOutcome) {
    if let Some(p) = batting.players.get_mut(striker) {
        if !matches!(outcome, DeliveryOutcome::Wide(_)) {
            p.match_stats.balls_faced += 1;
        }
        p.match_stats.runs_scored += outcome.batsman_runs() as u32;
    }

    if let Some(p) = bowling.players.get_mut(bowler) {
        if outcome.is_legal() {
            p.match_stats.balls_bowled += 1;
        }
        p.match_stats.runs_conceded += outcome.bowler_runs() as u32;
        if outcome.dismissal().is_some_and(|k| k.credits_bowler()) {
            p.match_stats.wickets += 1;
        }
    }

    if let Some((kind, Some(f))) = outcome.wicket() {
        if let Some(p) = bowling.players.get_mut(f) {
            match kind {
                DismissalKind::Stumped => p.match_stats.stumpings += 1,
                DismissalKind::RunOut => p.match_stats.run_outs += 1,
                _ => {}
            }
        }
    }
}
