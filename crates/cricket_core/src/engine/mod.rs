pub mod config;
pub mod fielding;
pub mod innings;
pub mod match_runner;
pub mod probability;
pub mod resolver;
pub mod rotation;
pub mod scorecard;
pub mod shot;
pub mod test_fixtures; // shared with the integration tests
pub mod toss;

pub use config::{
    DismissalWeights, EngineConfig, FieldConfig, MatchSettings, ResolverConfig, SelectionMode, WeatherConfig,
};
pub use fielding::{select_fielding_template, FieldTemplate, FieldingPlan, NUM_FIELDERS};
pub use innings::{
    DeliveryRecord, InningsEnd, InningsPhase, InningsSetup, InningsState, RainStoppage, BALLS_PER_OVER,
};
pub use match_runner::{
    generate_match_id, play_match, validate_squad, Margin, MatchOutcome, MatchProgress, MatchResult, MatchRunner,
};
pub use resolver::{BallVerdict, OutcomeResolver};
pub use rotation::BowlingLimits;
pub use scorecard::{InningsCard, InningsSummary};
pub use shot::{AutoRunCaller, RunCallContext, RunCaller};
pub use toss::{run_toss, TossCall, TossDecision, TossResult};
