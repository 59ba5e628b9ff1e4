//! Shot placement and fielding response
//!
//! Turns a `BallVerdict` into a fully resolved `DeliveryOutcome`. Scoring
//! shots are placed on the field from shot quality; the nearest fielder's
//! effective distance decides between a catch, a boundary and the number of
//! runs that can be run safely. How many runs are actually attempted is up
//! to a `RunCaller`.

use nalgebra::Vector2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::config::FieldConfig;
use super::fielding::FieldingPlan;
use super::probability::{effective_fielding_distance, shot_distance};
use super::resolver::BallVerdict;
use crate::models::{DeliveryOutcome, DismissalKind, Player, Team};

// ============================================================================
// Shot
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shot {
    /// `(bat - bowl) + timing`
    pub quality: i32,
    /// Radians from straight down the ground, positive to the off side
    pub angle: f32,
    pub distance: f32,
    pub landing: Vector2<f32>,
}

/// Where the ball went and who stopped it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FieldingResult {
    Boundary(u8),
    Caught { fielder: usize },
    /// `safe_runs` can be completed before `fielder` returns the ball
    InField { fielder: Option<usize>, safe_runs: u8 },
}

pub fn play_shot<R: Rng + ?Sized>(bat_skill: u8, bowl_skill: u8, cfg: &FieldConfig, rng: &mut R) -> Shot {
    let timing = if cfg.timing_spread > 0 {
        rng.gen_range(-cfg.timing_spread..=cfg.timing_spread)
    } else {
        0
    };
    let quality = (bat_skill as i32 - bowl_skill as i32) + timing;

    let angle = (rng.gen_range(-135..=135) as f32).to_radians();
    let boost = if cfg.shot_boost_max > 0.0 { rng.gen_range(0.0..cfg.shot_boost_max) } else { 0.0 };
    let distance = shot_distance(cfg.shot_distance_scale, quality) + boost;
    let landing = Vector2::new(angle.sin(), angle.cos()) * distance;

    Shot { quality, angle, distance, landing }
}

/// Boundary, catch or runs for a placed shot. A mistimed shot (negative
/// quality) landing within reach of a fielder is caught.
pub fn field_shot(shot: &Shot, plan: &FieldingPlan, bowling: &Team, cfg: &FieldConfig) -> FieldingResult {
    if shot.distance > cfg.boundary_radius {
        let runs = if shot.distance > cfg.six_radius() { 6 } else { 4 };
        return FieldingResult::Boundary(runs);
    }

    let Some((fielder, raw)) = plan.nearest_fielder(shot.landing) else {
        // nobody to stop it
        return FieldingResult::InField { fielder: None, safe_runs: cfg.max_running_runs };
    };

    let skill = bowling.players.get(fielder).map(|p| p.fielding_skill).unwrap_or(0);
    let effective = effective_fielding_distance(raw, skill, cfg.reach_per_skill);

    if effective < cfg.catch_radius && shot.quality < 0 {
        return FieldingResult::Caught { fielder };
    }

    let safe_runs = (effective.max(0.0) / cfg.run_distance).floor() as u8;
    FieldingResult::InField { fielder: Some(fielder), safe_runs: safe_runs.min(cfg.max_running_runs) }
}

// ============================================================================
// Run calling
// ============================================================================

/// What the batsmen know when deciding how many to run
#[derive(Debug, Clone, Copy)]
pub struct RunCallContext {
    pub safe_runs: u8,
    pub max_runs: u8,
    pub fielder: Option<usize>,
}

/// The "run" signal, repeated until the batsmen stop.
pub trait RunCaller {
    /// Number of runs the batsmen attempt, `0..=max_runs`.
    fn call_runs(&mut self, ctx: &RunCallContext) -> u8;
}

/// Runs exactly what is safe.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoRunCaller;

impl RunCaller for AutoRunCaller {
    fn call_runs(&mut self, ctx: &RunCallContext) -> u8 {
        ctx.safe_runs
    }
}

impl<F> RunCaller for F
where
    F: FnMut(&RunCallContext) -> u8,
{
    fn call_runs(&mut self, ctx: &RunCallContext) -> u8 {
        self(ctx)
    }
}

// ============================================================================
// Verdict -> outcome
// ============================================================================

/// Everything shot placement needs about the current delivery
pub struct DeliveryContext<'a> {
    pub striker: &'a Player,
    pub bowler: &'a Player,
    pub bowling: &'a Team,
    pub plan: &'a FieldingPlan,
    pub field: &'a FieldConfig,
}

/// Resolve run values, fielders and run outs for a verdict.
pub fn realize_delivery<R: Rng + ?Sized>(
    verdict: BallVerdict,
    ctx: &DeliveryContext,
    caller: &mut dyn RunCaller,
    rng: &mut R,
) -> DeliveryOutcome {
    match verdict {
        BallVerdict::Dot => DeliveryOutcome::Dot,
        BallVerdict::Wicket(DismissalKind::Stumped) => {
            DeliveryOutcome::Wicket { kind: DismissalKind::Stumped, fielder: ctx.bowling.wicketkeeper(), runs: 0 }
        }
        BallVerdict::Wicket(kind) => DeliveryOutcome::Wicket { kind, fielder: None, runs: 0 },
        BallVerdict::Scoring => {
            let shot = play_shot(ctx.striker.batting_skill, ctx.bowler.bowling_skill, ctx.field, rng);
            match field_shot(&shot, ctx.plan, ctx.bowling, ctx.field) {
                FieldingResult::Boundary(runs) => DeliveryOutcome::Runs(runs),
                FieldingResult::Caught { fielder } => {
                    DeliveryOutcome::Wicket { kind: DismissalKind::Caught, fielder: Some(fielder), runs: 0 }
                }
                FieldingResult::InField { fielder, safe_runs } => {
                    run_between_wickets(safe_runs, fielder, ctx.field, caller, false)
                }
            }
        }
        BallVerdict::NoBall => {
            // no catch off a no-ball
            let shot = play_shot(ctx.striker.batting_skill, ctx.bowler.bowling_skill, ctx.field, rng);
            match field_shot(&shot, ctx.plan, ctx.bowling, ctx.field) {
                FieldingResult::Boundary(runs) => DeliveryOutcome::NoBall(runs),
                FieldingResult::Caught { .. } => DeliveryOutcome::NoBall(0),
                FieldingResult::InField { fielder, safe_runs } => {
                    run_between_wickets(safe_runs, fielder, ctx.field, caller, true)
                }
            }
        }
        BallVerdict::Wide => DeliveryOutcome::Wide(if rng.gen_range(0..100) < 10 { 1 } else { 0 }),
        BallVerdict::Bye => DeliveryOutcome::Bye(rng.gen_range(1..=2)),
        BallVerdict::LegBye => DeliveryOutcome::LegBye(rng.gen_range(1..=2)),
    }
}

/// Apply the run call. Calling past the safe count runs the batsman out
/// after the safe runs are completed. Off a no-ball the penalty and the
/// re-bowl still stand.
fn run_between_wickets(
    safe_runs: u8,
    fielder: Option<usize>,
    cfg: &FieldConfig,
    caller: &mut dyn RunCaller,
    no_ball: bool,
) -> DeliveryOutcome {
    let ctx = RunCallContext { safe_runs, max_runs: cfg.max_running_runs, fielder };
    let called = caller.call_runs(&ctx).min(cfg.max_running_runs);

    match (no_ball, called > safe_runs) {
        (true, true) => DeliveryOutcome::NoBallRunOut { fielder, runs: safe_runs },
        (true, false) => DeliveryOutcome::NoBall(called),
        (false, true) => DeliveryOutcome::Wicket { kind: DismissalKind::RunOut, fielder, runs: safe_runs },
        (false, false) if called == 0 => DeliveryOutcome::Dot,
        (false, false) => DeliveryOutcome::Runs(called),
    }
}
