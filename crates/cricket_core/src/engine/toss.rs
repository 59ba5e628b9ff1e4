//! Coin toss before the first innings.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::TeamSide;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TossCall {
    #[default]
    Heads,
    Tails,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TossDecision {
    #[default]
    Bat,
    Field,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TossResult {
    pub call: TossCall,
    pub landed: TossCall,
    pub winner: TeamSide,
    pub decision: TossDecision,
    pub batting_first: TeamSide,
}

impl TossResult {
    /// "India won the toss and elected to bat"
    pub fn describe(&self, winner_name: &str) -> String {
        let choice = match self.decision {
            TossDecision::Bat => "bat",
            TossDecision::Field => "field",
        };
        format!("{} won the toss and elected to {}", winner_name, choice)
    }
}

fn coin<R: Rng + ?Sized>(rng: &mut R) -> TossCall {
    if rng.gen_bool(0.5) {
        TossCall::Heads
    } else {
        TossCall::Tails
    }
}

fn random_decision<R: Rng + ?Sized>(rng: &mut R) -> TossDecision {
    if rng.gen_bool(0.5) {
        TossDecision::Bat
    } else {
        TossDecision::Field
    }
}

/// Side A calls. If A wins, `choice` is applied; otherwise B decides at random.
pub fn run_toss<R: Rng + ?Sized>(call: TossCall, choice: TossDecision, rng: &mut R) -> TossResult {
    let landed = coin(rng);
    let (winner, decision) = if landed == call {
        (TeamSide::A, choice)
    } else {
        (TeamSide::B, random_decision(rng))
    };

    let batting_first = match decision {
        TossDecision::Bat => winner,
        TossDecision::Field => winner.other(),
    };

    tracing::debug!(?call, ?landed, ?winner, ?decision, "toss");
    TossResult { call, landed, winner, decision, batting_first }
}
