use serde::{Deserialize, Serialize};
use std::fmt;

/// How a batsman was dismissed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DismissalKind {
    Bowled,
    Caught,
    Lbw,
    Stumped,
    RunOut,
}

impl DismissalKind {
    /// Dismissals credited to the bowler
    pub fn credits_bowler(&self) -> bool {
        !matches!(self, DismissalKind::RunOut)
    }

    /// Dismissals that still stand on a free hit
    pub fn stands_on_free_hit(&self) -> bool {
        matches!(self, DismissalKind::RunOut)
    }

    pub fn label(&self) -> &'static str {
        match self {
            DismissalKind::Bowled => "Bowled",
            DismissalKind::Caught => "Caught",
            DismissalKind::Lbw => "LBW",
            DismissalKind::Stumped => "Stumped",
            DismissalKind::RunOut => "Run Out",
        }
    }
}

impl fmt::Display for DismissalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What happened on one delivery, fully resolved (runs decided).
///
/// `fielder` indexes the bowling team; `None` when nobody is credited.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Dot,
    /// Runs off the bat (1-6)
    Runs(u8),
    /// `runs` completed before a run out
    Wicket { kind: DismissalKind, fielder: Option<usize>, runs: u8 },
    /// Runs run in addition to the one-run penalty
    Wide(u8),
    /// Runs off the bat in addition to the one-run penalty
    NoBall(u8),
    /// No-ball on which a batsman was run out after `runs` completed
    NoBallRunOut { fielder: Option<usize>, runs: u8 },
    Bye(u8),
    LegBye(u8),
}

impl DeliveryOutcome {
    /// Wides and no-balls must be re-bowled
    pub fn is_legal(&self) -> bool {
        !matches!(self, DeliveryOutcome::Wide(_)) && !self.is_no_ball()
    }

    pub fn is_no_ball(&self) -> bool {
        matches!(self, DeliveryOutcome::NoBall(_) | DeliveryOutcome::NoBallRunOut { .. })
    }

    /// Total runs added to the batting side
    pub fn team_runs(&self) -> u16 {
        let runs = match *self {
            DeliveryOutcome::Dot => 0,
            DeliveryOutcome::Runs(r) | DeliveryOutcome::Bye(r) | DeliveryOutcome::LegBye(r) => r,
            DeliveryOutcome::Wicket { runs, .. } => runs,
            DeliveryOutcome::Wide(r) | DeliveryOutcome::NoBall(r) => 1 + r,
            DeliveryOutcome::NoBallRunOut { runs, .. } => 1 + runs,
        };
        runs as u16
    }

    /// Runs credited to the striker's personal tally
    pub fn batsman_runs(&self) -> u16 {
        match *self {
            DeliveryOutcome::Runs(r) | DeliveryOutcome::NoBall(r) => r as u16,
            DeliveryOutcome::Wicket { runs, .. } | DeliveryOutcome::NoBallRunOut { runs, .. } => runs as u16,
            _ => 0,
        }
    }

    /// Runs charged to the bowler (byes and leg-byes are not)
    pub fn bowler_runs(&self) -> u16 {
        match *self {
            DeliveryOutcome::Bye(_) | DeliveryOutcome::LegBye(_) => 0,
            other => other.team_runs(),
        }
    }

    /// Runs physically run between the wickets; odd counts swap strike.
    pub fn runs_run(&self) -> u8 {
        match *self {
            DeliveryOutcome::Dot => 0,
            // boundaries are not run
            DeliveryOutcome::Runs(4) | DeliveryOutcome::Runs(6) => 0,
            DeliveryOutcome::NoBall(4) | DeliveryOutcome::NoBall(6) => 0,
            DeliveryOutcome::Bye(4) | DeliveryOutcome::LegBye(4) => 0,
            DeliveryOutcome::Runs(r)
            | DeliveryOutcome::Wide(r)
            | DeliveryOutcome::NoBall(r)
            | DeliveryOutcome::Bye(r)
            | DeliveryOutcome::LegBye(r) => r,
            DeliveryOutcome::Wicket { runs, .. } | DeliveryOutcome::NoBallRunOut { runs, .. } => runs,
        }
    }

    /// Outcome kind as written to the delivery log
    pub fn log_code(&self) -> &'static str {
        match self {
            DeliveryOutcome::Dot => "DOT",
            DeliveryOutcome::Runs(_) => "RUNS",
            DeliveryOutcome::Wicket { .. } => "WICKET",
            DeliveryOutcome::Wide(_) => "WIDE",
            DeliveryOutcome::NoBall(_) | DeliveryOutcome::NoBallRunOut { .. } => "NOBALL",
            DeliveryOutcome::Bye(_) => "BYE",
            DeliveryOutcome::LegBye(_) => "LEGBYE",
        }
    }

    pub fn dismissal(&self) -> Option<DismissalKind> {
        self.wicket().map(|(kind, _)| kind)
    }

    /// Dismissal and credited fielder, on a legal ball or a no-ball
    pub fn wicket(&self) -> Option<(DismissalKind, Option<usize>)> {
        match *self {
            DeliveryOutcome::Wicket { kind, fielder, .. } => Some((kind, fielder)),
            DeliveryOutcome::NoBallRunOut { fielder, .. } => Some((DismissalKind::RunOut, fielder)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extras_accounting() {
        let wide = DeliveryOutcome::Wide(2);
        assert!(!wide.is_legal());
        assert_eq!(wide.team_runs(), 3);
        assert_eq!(wide.batsman_runs(), 0);
        assert_eq!(wide.bowler_runs(), 3);
        assert_eq!(wide.runs_run(), 2);

        let nb = DeliveryOutcome::NoBall(4);
        assert_eq!(nb.team_runs(), 5);
        assert_eq!(nb.batsman_runs(), 4);
        assert_eq!(nb.runs_run(), 0);

        let bye = DeliveryOutcome::LegBye(1);
        assert!(bye.is_legal());
        assert_eq!(bye.bowler_runs(), 0);
        assert_eq!(bye.batsman_runs(), 0);
        assert_eq!(bye.team_runs(), 1);
    }

    #[test]
    fn test_run_out_off_a_no_ball_is_still_a_no_ball() {
        let out = DeliveryOutcome::NoBallRunOut { fielder: Some(3), runs: 1 };
        assert!(!out.is_legal());
        assert!(out.is_no_ball());
        assert_eq!(out.team_runs(), 2);
        assert_eq!(out.bowler_runs(), 2);
        assert_eq!(out.batsman_runs(), 1);
        assert_eq!(out.runs_run(), 1);
        assert_eq!(out.wicket(), Some((DismissalKind::RunOut, Some(3))));
        assert_eq!(out.log_code(), "NOBALL");
    }

    #[test]
    fn test_boundaries_do_not_rotate_strike() {
        assert_eq!(DeliveryOutcome::Runs(4).runs_run(), 0);
        assert_eq!(DeliveryOutcome::Runs(6).runs_run(), 0);
        assert_eq!(DeliveryOutcome::Runs(3).runs_run(), 3);
    }

    #[test]
    fn test_run_out_credit() {
        assert!(!DismissalKind::RunOut.credits_bowler());
        assert!(DismissalKind::Caught.credits_bowler());
        assert!(DismissalKind::RunOut.stands_on_free_hit());
        assert!(!DismissalKind::Stumped.stands_on_free_hit());
        assert_eq!(
            DeliveryOutcome::Wicket { kind: DismissalKind::Bowled, fielder: None, runs: 0 }.log_code(),
            "WICKET"
        );
    }
}
