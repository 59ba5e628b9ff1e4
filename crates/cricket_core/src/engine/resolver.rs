//! Outcome Resolver
//!
//! Maps (striker batting skill, bowler bowling skill) to a `BallVerdict`.
//! The verdict says *what kind* of delivery it was; run values for scoring
//! shots are decided afterwards by shot placement (`engine::shot`).
//!
//! Draw order per delivery:
//! 1. extras (wide, no-ball, bye, leg-bye) when their rates are non-zero
//! 2. no-contact dot (`no_contact_chance`) when enabled
//! 3. scoring (`run_chance`)
//! 4. wicket (`out_chance`), otherwise a dot

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::config::ResolverConfig;
use super::probability::{no_contact_chance, out_chance, run_chance};
use crate::models::DismissalKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallVerdict {
    Dot,
    /// Bat on ball; runs decided by placement
    Scoring,
    Wicket(DismissalKind),
    Wide,
    NoBall,
    Bye,
    LegBye,
}

#[derive(Debug, Clone)]
pub struct OutcomeResolver {
    cfg: ResolverConfig,
}

impl OutcomeResolver {
    pub fn new(cfg: ResolverConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.cfg
    }

    /// Resolve one delivery. Skills must already be validated to `1..=100`.
    pub fn resolve<R: Rng + ?Sized>(&self, bat_skill: u8, bowl_skill: u8, rng: &mut R) -> BallVerdict {
        if let Some(extra) = self.roll_extra(rng) {
            return extra;
        }

        if self.cfg.no_contact && roll(rng) < no_contact_chance(&self.cfg, bat_skill, bowl_skill) {
            return BallVerdict::Dot;
        }

        if roll(rng) < run_chance(&self.cfg, bat_skill, bowl_skill) {
            return BallVerdict::Scoring;
        }

        if roll(rng) < out_chance(&self.cfg, bat_skill, bowl_skill) {
            return BallVerdict::Wicket(self.pick_dismissal(rng));
        }

        BallVerdict::Dot
    }

    fn roll_extra<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<BallVerdict> {
        let total = self.cfg.extras_pct();
        if total <= 0.0 {
            return None;
        }

        let r: f32 = rng.gen_range(0.0..100.0);
        let mut edge = self.cfg.wide_pct;
        if r < edge {
            return Some(BallVerdict::Wide);
        }
        edge += self.cfg.no_ball_pct;
        if r < edge {
            return Some(BallVerdict::NoBall);
        }
        edge += self.cfg.bye_pct;
        if r < edge {
            return Some(BallVerdict::Bye);
        }
        edge += self.cfg.leg_bye_pct;
        if r < edge {
            return Some(BallVerdict::LegBye);
        }
        None
    }

    fn pick_dismissal<R: Rng + ?Sized>(&self, rng: &mut R) -> DismissalKind {
        let w = &self.cfg.dismissal_weights;
        let total = w.total().max(1);
        let mut r = rng.gen_range(0..total);

        for (kind, weight) in [
            (DismissalKind::Bowled, w.bowled),
            (DismissalKind::Caught, w.caught),
            (DismissalKind::Lbw, w.lbw),
            (DismissalKind::Stumped, w.stumped),
        ] {
            if r < weight {
                return kind;
            }
            r -= weight;
        }
        DismissalKind::Bowled
    }
}

/// Uniform integer in `[0, 100)`
#[inline]
fn roll<R: Rng + ?Sized>(rng: &mut R) -> i32 {
    rng.gen_range(0..100)
}
