pub mod format;
pub mod outcome;
pub mod player;
pub mod team;

pub use format::{MatchFormat, PowerplayPhase};
pub use outcome::{DeliveryOutcome, DismissalKind};
pub use player::{BattingHand, BowlingStyle, CareerStats, MatchCounters, Player, PlayerRole};
pub use team::{Fixture, Team, TeamSide, MAX_PLAYERS, MIN_ELIGIBLE, PLAYING_XI};
