use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MatchError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum MatchFormat {
    #[serde(rename = "T20")]
    T20,
    #[default]
    #[serde(rename = "ODI")]
    Odi,
    #[serde(rename = "TEST")]
    Test,
}

impl MatchFormat {
    pub fn overs_per_side(&self) -> u16 {
        match self {
            MatchFormat::T20 => 20,
            MatchFormat::Odi => 50,
            MatchFormat::Test => 90,
        }
    }

    /// Legal deliveries one bowler may bowl in an innings (`None` = unlimited)
    pub fn bowler_delivery_cap(&self) -> Option<u16> {
        match self {
            MatchFormat::T20 => Some(4 * 6),
            MatchFormat::Odi => Some(10 * 6),
            MatchFormat::Test => None,
        }
    }

    /// Over numbers at which Phase 2 and Phase 3 begin
    pub fn powerplay_thresholds(&self) -> Option<(u16, u16)> {
        match self {
            MatchFormat::T20 => Some((6, 15)),
            MatchFormat::Odi => Some((10, 40)),
            MatchFormat::Test => None,
        }
    }

    /// Fielding-restriction phase for the over about to be bowled.
    /// Always derived from `overs_completed`, never cached.
    pub fn phase_for(&self, overs_completed: u16) -> PowerplayPhase {
        match self.powerplay_thresholds() {
            Some((p2, _)) if overs_completed < p2 => PowerplayPhase::One,
            Some((_, p3)) if overs_completed < p3 => PowerplayPhase::Two,
            _ => PowerplayPhase::Three,
        }
    }

    /// Unlimited formats can end without a winner
    pub fn allows_draw(&self) -> bool {
        matches!(self, MatchFormat::Test)
    }

    pub fn code(&self) -> &'static str {
        match self {
            MatchFormat::T20 => "T20",
            MatchFormat::Odi => "ODI",
            MatchFormat::Test => "TEST",
        }
    }
}

impl fmt::Display for MatchFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for MatchFormat {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "T20" => Ok(MatchFormat::T20),
            "ODI" => Ok(MatchFormat::Odi),
            "TEST" => Ok(MatchFormat::Test),
            other => Err(MatchError::InvalidConfig(format!("unknown match format '{}'", other))),
        }
    }
}

/// Fielding-restriction phase
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PowerplayPhase {
    One,
    Two,
    Three,
}

impl PowerplayPhase {
    /// Fielders allowed outside the inner circle
    pub fn max_outside_circle(&self) -> usize {
        match self {
            PowerplayPhase::One => 2,
            PowerplayPhase::Two => 4,
            PowerplayPhase::Three => 5,
        }
    }

    pub fn number(&self) -> u8 {
        match self {
            PowerplayPhase::One => 1,
            PowerplayPhase::Two => 2,
            PowerplayPhase::Three => 3,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(PowerplayPhase::One),
            2 => Some(PowerplayPhase::Two),
            3 => Some(PowerplayPhase::Three),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_odi_phase_boundaries() {
        let f = MatchFormat::Odi;
        assert_eq!(f.phase_for(0), PowerplayPhase::One);
        assert_eq!(f.phase_for(9), PowerplayPhase::One);
        assert_eq!(f.phase_for(10), PowerplayPhase::Two);
        assert_eq!(f.phase_for(39), PowerplayPhase::Two);
        assert_eq!(f.phase_for(40), PowerplayPhase::Three);
        assert_eq!(f.phase_for(49), PowerplayPhase::Three);
    }

    #[test]
    fn test_t20_and_test_phases() {
        assert_eq!(MatchFormat::T20.phase_for(5), PowerplayPhase::One);
        assert_eq!(MatchFormat::T20.phase_for(6), PowerplayPhase::Two);
        assert_eq!(MatchFormat::T20.phase_for(15), PowerplayPhase::Three);
        assert_eq!(MatchFormat::Test.phase_for(0), PowerplayPhase::Three);
    }

    #[test]
    fn test_caps_and_parse() {
        assert_eq!(MatchFormat::Odi.bowler_delivery_cap(), Some(60));
        assert_eq!(MatchFormat::T20.bowler_delivery_cap(), Some(24));
        assert_eq!(MatchFormat::Test.bowler_delivery_cap(), None);
        assert_eq!("odi".parse::<MatchFormat>().unwrap(), MatchFormat::Odi);
        assert!("hundred".parse::<MatchFormat>().is_err());
        assert_eq!(PowerplayPhase::Two.max_outside_circle(), 4);
    }
}
