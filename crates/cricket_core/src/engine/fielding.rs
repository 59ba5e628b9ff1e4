//! Fielding templates and powerplay restrictions
//!
//! Positions are normalized to the fielding radius with the pitch at the
//! origin, +y straight down the ground and +x on the off side of a
//! right-handed batsman. Left-handers get the x axis mirrored.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use super::config::FieldConfig;
use crate::models::{BattingHand, PowerplayPhase, Team};

pub const NUM_FIELDERS: usize = 9;

// ============================================================================
// Templates
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldTemplate {
    PowerplayAggressive,
    PowerplayDefensive,
    MiddleNormal,
    MiddleDefensive,
    DeathDefensive,
}

const PP_AGGRESSIVE: [(f32, f32); NUM_FIELDERS] = [
    (0.30, -0.40),  // first slip
    (0.20, -0.45),  // second slip
    (-0.15, 0.10),  // short mid-wicket
    (0.15, 0.10),   // short cover
    (-0.50, 0.40),  // square leg
    (0.50, 0.40),   // point
    (-0.80, 0.60),  // fine leg
    (0.80, 0.60),   // third man
    (0.00, 0.55),   // mid-off
];

const PP_DEFENSIVE: [(f32, f32); NUM_FIELDERS] = [
    (0.25, -0.45),  // fly slip
    (0.35, -0.35),  // gully
    (-0.20, 0.15),  // mid-wicket
    (0.20, 0.15),   // cover
    (-0.40, 0.40),  // square leg
    (0.40, 0.40),   // point
    (-0.75, 0.65),  // deep square leg
    (0.75, 0.65),   // deep point
    (0.00, 0.70),   // long-off
];

const MO_NORMAL: [(f32, f32); NUM_FIELDERS] = [
    (-0.35, 0.15),  // mid-wicket
    (0.35, 0.15),   // cover
    (-0.20, 0.30),  // square leg
    (0.20, 0.30),   // point
    (-0.75, 0.65),  // deep square leg
    (0.75, 0.65),   // deep cover
    (0.00, 0.70),   // long-off
    (0.00, -0.30),  // short fine leg
    (0.00, 0.20),   // mid-on
];

const MO_DEFENSIVE: [(f32, f32); NUM_FIELDERS] = [
    (-0.45, 0.25),  // mid-wicket
    (0.45, 0.25),   // cover
    (-0.20, 0.40),  // square leg
    (0.20, 0.40),   // point
    (-0.80, 0.70),  // deep square leg
    (0.80, 0.70),   // deep point
    (0.00, 0.80),   // long-off
    (0.00, 0.60),   // long-on
    (0.00, -0.10),  // short fine leg
];

const DO_DEFENSIVE: [(f32, f32); NUM_FIELDERS] = [
    (-0.90, 0.70),  // deep square leg
    (-0.70, 0.60),  // deep mid-wicket
    (0.70, 0.60),   // deep extra cover
    (0.90, 0.70),   // deep point
    (0.00, 0.85),   // long-off
    (0.00, 0.75),   // long-on
    (-0.15, 0.40),  // short mid-wicket
    (0.15, 0.40),   // short cover
    (0.00, -0.05),  // fine leg
];

impl FieldTemplate {
    /// Default template per phase
    pub fn for_phase(phase: PowerplayPhase) -> Self {
        match phase {
            PowerplayPhase::One => FieldTemplate::PowerplayAggressive,
            PowerplayPhase::Two => FieldTemplate::MiddleNormal,
            PowerplayPhase::Three => FieldTemplate::DeathDefensive,
        }
    }

    fn raw(&self) -> &'static [(f32, f32); NUM_FIELDERS] {
        match self {
            FieldTemplate::PowerplayAggressive => &PP_AGGRESSIVE,
            FieldTemplate::PowerplayDefensive => &PP_DEFENSIVE,
            FieldTemplate::MiddleNormal => &MO_NORMAL,
            FieldTemplate::MiddleDefensive => &MO_DEFENSIVE,
            FieldTemplate::DeathDefensive => &DO_DEFENSIVE,
        }
    }

    /// Normalized positions, mirrored for a left-handed striker.
    pub fn positions(&self, hand: BattingHand) -> [Vector2<f32>; NUM_FIELDERS] {
        let mirror = if hand == BattingHand::Left { -1.0 } else { 1.0 };
        let raw = self.raw();
        std::array::from_fn(|i| Vector2::new(raw[i].0 * mirror, raw[i].1))
    }
}

/// Normalized template for the phase, mirrored for left-handers.
pub fn select_fielding_template(phase: PowerplayPhase, hand: BattingHand) -> [Vector2<f32>; NUM_FIELDERS] {
    FieldTemplate::for_phase(phase).positions(hand)
}

// ============================================================================
// Fielding plan
// ============================================================================

/// Fielder positions for the current delivery, in field units, with the
/// powerplay cap already enforced.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldingPlan {
    pub template: FieldTemplate,
    pub phase: PowerplayPhase,
    pub positions: [Vector2<f32>; NUM_FIELDERS],
    /// Bowling-team player index standing at each position
    pub fielders: Vec<usize>,
    inner_circle_radius: f32,
}

impl FieldingPlan {
    pub fn for_phase(phase: PowerplayPhase, hand: BattingHand, cfg: &FieldConfig) -> Self {
        Self::with_template(FieldTemplate::for_phase(phase), phase, hand, cfg)
    }

    pub fn with_template(
        template: FieldTemplate,
        phase: PowerplayPhase,
        hand: BattingHand,
        cfg: &FieldConfig,
    ) -> Self {
        let normalized = template.positions(hand);
        let positions = std::array::from_fn(|i| normalized[i] * cfg.fielder_radius);
        let mut plan = Self {
            template,
            phase,
            positions,
            fielders: Vec::new(),
            inner_circle_radius: cfg.inner_circle_radius,
        };
        plan.enforce_restriction();
        plan
    }

    pub fn count_outside_circle(&self) -> usize {
        self.positions.iter().filter(|p| p.norm() > self.inner_circle_radius).count()
    }

    /// Bring the outfielders closest to the ring inside it until the phase
    /// cap holds. Returns how many fielders were moved.
    pub fn enforce_restriction(&mut self) -> usize {
        let cap = self.phase.max_outside_circle();
        let mut moved = 0;

        while self.count_outside_circle() > cap {
            let nearest_out = self
                .positions
                .iter()
                .enumerate()
                .filter(|(_, p)| p.norm() > self.inner_circle_radius)
                .min_by(|(_, a), (_, b)| a.norm().total_cmp(&b.norm()))
                .map(|(i, _)| i);

            let Some(i) = nearest_out else { break };
            let pos = self.positions[i];
            self.positions[i] = pos.normalize() * (self.inner_circle_radius * 0.95);
            moved += 1;
        }
        moved
    }

    /// Staff the positions with bowling-team players, skipping the bowler
    /// and the wicketkeeper (who stands behind the stumps).
    pub fn assign_fielders(&mut self, bowling: &Team, bowler: usize) {
        let keeper = bowling.wicketkeeper();
        self.fielders = (0..bowling.players.len())
            .filter(|&i| i != bowler && Some(i) != keeper)
            .take(NUM_FIELDERS)
            .collect();
    }

    /// Nearest staffed position to `point`: (player index, distance)
    pub fn nearest_fielder(&self, point: Vector2<f32>) -> Option<(usize, f32)> {
        self.fielders
            .iter()
            .zip(self.positions.iter())
            .map(|(&player, pos)| (player, (pos - point).norm()))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}
