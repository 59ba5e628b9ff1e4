//! Cricket CLI
//!
//! Plays and resumes matches between roster teams and manages the roster.

#[cfg(feature = "cli")]
use anyhow::{bail, Context, Result};
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand, ValueEnum};
#[cfg(feature = "cli")]
use std::io::Write;
#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};

#[cfg(feature = "cli")]
use cricket_core::ball_log::CsvBallLog;
#[cfg(feature = "cli")]
use cricket_core::engine::{
    EngineConfig, InningsSummary, MatchOutcome, MatchProgress, MatchRunner, MatchSettings, RunCallContext, RunCaller,
    SelectionMode, TossCall, TossDecision,
};
#[cfg(feature = "cli")]
use cricket_core::models::MatchFormat;
#[cfg(feature = "cli")]
use cricket_core::roster::RosterProvider;
#[cfg(feature = "cli")]
use cricket_core::save::SaveManager;
#[cfg(feature = "cli")]
use cricket_cli::{read_rosters, sample_teams, write_rosters, JsonRoster};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "cricket")]
#[command(about = "Ball-by-ball limited-overs cricket simulator", long_about = None)]
struct Cli {
    /// Roster file
    #[arg(long, global = true, default_value = "data/roster.json")]
    roster: PathBuf,

    /// Directory for delivery logs and saved matches
    #[arg(long, global = true, default_value = "data")]
    data_dir: PathBuf,

    /// Engine tuning (YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Clone, Copy, ValueEnum)]
enum CallArg {
    Heads,
    Tails,
}

#[cfg(feature = "cli")]
#[derive(Clone, Copy, ValueEnum)]
enum ChoiceArg {
    Bat,
    Field,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Play a new match
    Play {
        /// Tag of the side calling the toss
        #[arg(long)]
        team_a: String,

        #[arg(long)]
        team_b: String,

        /// T20, ODI or TEST
        #[arg(long, default_value = "T20")]
        format: MatchFormat,

        /// Seed (defaults to the clock)
        #[arg(long)]
        seed: Option<u64>,

        /// Allow rain stoppages
        #[arg(long, default_value = "false")]
        rain: bool,

        /// Per-over stoppage chance (0-1)
        #[arg(long)]
        rain_probability: Option<f32>,

        #[arg(long, value_enum, default_value = "heads")]
        call: CallArg,

        /// What team A does if it wins the toss
        #[arg(long, value_enum, default_value = "bat")]
        choose: ChoiceArg,

        /// Pick incoming batsmen and bowlers and call the runs yourself
        #[arg(long, default_value = "false")]
        manual: bool,

        /// Do not write the delivery log
        #[arg(long, default_value = "false")]
        no_log: bool,

        /// Print the outcome as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Continue a saved match
    Resume {
        match_id: String,

        #[arg(long, default_value = "false")]
        manual: bool,

        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// List saved matches
    Saves,

    /// Manage the roster
    Roster {
        #[command(subcommand)]
        action: RosterAction,
    },
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum RosterAction {
    /// Write two starter squads
    Init {
        /// Replace an existing roster
        #[arg(long, default_value = "false")]
        force: bool,
    },
    /// Merge teams from flat CSV files
    Import {
        #[arg(long)]
        teams: PathBuf,
        #[arg(long)]
        players: PathBuf,
    },
    /// Write every team to flat CSV files
    Export {
        #[arg(long)]
        teams: PathBuf,
        #[arg(long)]
        players: PathBuf,
    },
    /// Show teams, or one squad
    Show { tag: Option<String> },
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Play { team_a, team_b, format, seed, rain, rain_probability, call, choose, manual, no_log, json } => {
            let mut roster = JsonRoster::open(&cli.roster)?;
            let a = roster.require_team(&team_a)?;
            let b = roster.require_team(&team_b)?;

            let settings = MatchSettings {
                format,
                rain_enabled: rain,
                rain_probability,
                seed: seed.unwrap_or_else(|| chrono::Utc::now().timestamp_micros() as u64),
                batsman_selection: selection(manual),
                bowler_selection: selection(manual),
                match_id: None,
                toss_call: match call {
                    CallArg::Heads => TossCall::Heads,
                    CallArg::Tails => TossCall::Tails,
                },
                toss_choice: match choose {
                    ChoiceArg::Bat => TossDecision::Bat,
                    ChoiceArg::Field => TossDecision::Field,
                },
            };

            let mut runner = MatchRunner::new(a, b, settings, config)?;
            if let Some(toss) = runner.toss() {
                println!("{}", toss.describe(&runner.fixture().team(toss.winner).name));
            }
            runner = attach_sinks(runner, &cli.data_dir, !no_log)?;
            if manual {
                runner = runner.with_run_caller(Box::new(PromptRunCaller));
            }

            drive(&mut runner, manual)?;
            finish(runner, &mut roster, json)?;
        }

        Commands::Resume { match_id, manual, json } => {
            let mut roster = JsonRoster::open(&cli.roster)?;
            let saves = SaveManager::new(cli.data_dir.join("saves"));
            let snapshot = saves.load(&match_id).with_context(|| format!("No saved match {}", match_id))?;
            println!("Resuming {}", snapshot.score_line());

            let runner = MatchRunner::resume(snapshot, &roster, config)?;
            let mut runner = attach_sinks(runner, &cli.data_dir, true)?;
            if manual {
                runner = runner.with_run_caller(Box::new(PromptRunCaller));
            }

            drive(&mut runner, manual)?;
            finish(runner, &mut roster, json)?;
        }

        Commands::Saves => {
            let saves = SaveManager::new(cli.data_dir.join("saves"));
            let infos = saves.list();
            if infos.is_empty() {
                println!("No saved matches");
            }
            for info in infos {
                println!("{}  {}", info.format_timestamp(), info.get_display_text());
            }
        }

        Commands::Roster { action } => roster_command(&cli.roster, action)?,
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

#[cfg(feature = "cli")]
fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let yaml = std::fs::read_to_string(path).with_context(|| format!("Failed to read config: {}", path.display()))?;
    let config = EngineConfig::from_yaml_str(&yaml)?;
    config.validate()?;
    Ok(config)
}

#[cfg(feature = "cli")]
fn selection(manual: bool) -> SelectionMode {
    if manual {
        SelectionMode::Deferred
    } else {
        SelectionMode::Automatic
    }
}

/// Delivery log and autosave; a log that cannot be opened only loses the log.
#[cfg(feature = "cli")]
fn attach_sinks(runner: MatchRunner, data_dir: &Path, with_log: bool) -> Result<MatchRunner> {
    let mut runner = runner.with_autosave(SaveManager::new(data_dir.join("saves")));
    if with_log {
        match CsvBallLog::for_match(data_dir.join("logs"), runner.match_id()) {
            Ok(log) => {
                tracing::info!(path = %log.path().display(), "delivery log");
                runner = runner.with_ball_log(Box::new(log));
            }
            Err(e) => tracing::warn!(error = %e, "could not open delivery log; playing without it"),
        }
    }
    Ok(runner)
}

#[cfg(feature = "cli")]
fn drive(runner: &mut MatchRunner, manual: bool) -> Result<()> {
    loop {
        match runner.step()? {
            MatchProgress::Finished => return Ok(()),
            MatchProgress::InningsBreak { target } => {
                println!("\nInnings break. {} need {} to win.\n", runner.batting_team().name, target);
            }
            MatchProgress::Delivered(record) => {
                if record.over_completed || record.innings_end.is_some() {
                    let inn = runner.innings();
                    println!(
                        "{} {}/{} after {}.{} overs",
                        runner.batting_team().tag,
                        inn.total_runs(),
                        inn.wickets(),
                        inn.overs_completed(),
                        inn.balls_bowled_in_over()
                    );
                }
                if let Some(stop) = record.rain {
                    println!("Rain! Innings reduced from {} to {} overs.", stop.from, stop.to);
                }
            }
            MatchProgress::AwaitingBatsman => {
                if !manual {
                    bail!("match is waiting for a batsman; resume with --manual");
                }
                let options = runner.available_batsmen();
                let team = runner.batting_team();
                let pick = prompt("Next batsman", options.iter().map(|&i| (i, team.players[i].name.as_str())))?;
                if let Err(e) = runner.supply_batsman(pick) {
                    println!("{}", e);
                }
            }
            MatchProgress::AwaitingBowler => {
                if !manual {
                    bail!("match is waiting for a bowler; resume with --manual");
                }
                let options = runner.eligible_bowlers();
                let team = runner.bowling_team();
                let pick = prompt("Next bowler", options.iter().map(|&i| (i, team.players[i].name.as_str())))?;
                if let Err(e) = runner.supply_bowler(pick) {
                    println!("{}", e);
                }
            }
        }
    }
}

/// One line from stdin; the lock is released before returning.
#[cfg(feature = "cli")]
fn read_line() -> Result<String> {
    print!("> ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    if std::io::stdin().read_line(&mut line)? == 0 {
        bail!("input closed");
    }
    Ok(line)
}

#[cfg(feature = "cli")]
fn prompt<'a>(title: &str, options: impl Iterator<Item = (usize, &'a str)>) -> Result<usize> {
    println!("{}:", title);
    for (i, name) in options {
        println!("  {:>2}) {}", i, name);
    }
    loop {
        match read_line()?.trim().parse() {
            Ok(i) => return Ok(i),
            Err(_) => println!("Enter a player number"),
        }
    }
}

/// Asks how many to run whenever the ball stays in the field.
#[cfg(feature = "cli")]
struct PromptRunCaller;

#[cfg(feature = "cli")]
impl RunCaller for PromptRunCaller {
    fn call_runs(&mut self, ctx: &RunCallContext) -> u8 {
        println!("In the field, {} safe. Run how many (0-{}, Enter for {})?", ctx.safe_runs, ctx.max_runs, ctx.safe_runs);
        loop {
            let line = match read_line() {
                Ok(line) => line,
                Err(e) => {
                    tracing::warn!(error = %e, "no run call; taking the safe runs");
                    return ctx.safe_runs;
                }
            };
            match parse_run_call(&line, ctx) {
                Some(runs) => return runs,
                None => println!("Enter 0-{}", ctx.max_runs),
            }
        }
    }
}

/// Blank means "the safe runs"; anything else must be a count up to `max_runs`.
#[cfg(feature = "cli")]
fn parse_run_call(line: &str, ctx: &RunCallContext) -> Option<u8> {
    let line = line.trim();
    if line.is_empty() {
        return Some(ctx.safe_runs);
    }
    line.parse::<u8>().ok().filter(|&runs| runs <= ctx.max_runs)
}

#[cfg(feature = "cli")]
fn finish(runner: MatchRunner, roster: &mut JsonRoster, json: bool) -> Result<()> {
    let outcome = runner.outcome().cloned().context("match did not finish")?;
    let fixture = runner.into_fixture();
    for xi in &fixture.teams {
        roster.record_match(xi)?;
    }
    roster.save()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn print_outcome(outcome: &MatchOutcome) {
    if !outcome.toss_summary.is_empty() {
        println!("\n{}", outcome.toss_summary);
    }
    for innings in &outcome.innings {
        print_innings(innings);
    }
    println!("\n{}", outcome.summary);
    if outcome.degraded {
        println!("(the delivery log or autosave failed during this match)");
    }
}

#[cfg(feature = "cli")]
fn print_innings(s: &InningsSummary) {
    println!("\n{} innings: {}/{} ({} overs)", s.batting_team, s.runs, s.wickets, s.overs);
    for line in &s.batting {
        println!("  {:<24} {:<28} {:>4} ({})", line.name, line.how_out, line.runs, line.balls);
    }
    let e = &s.extras;
    println!("  Extras {} (w {}, nb {}, b {}, lb {})", e.total(), e.wides, e.no_balls, e.byes, e.leg_byes);
    for line in &s.bowling {
        println!("  {:<24} {:>5}-{}-{}-{}", line.name, line.overs, line.maidens, line.runs, line.wickets);
    }
}

#[cfg(feature = "cli")]
fn roster_command(path: &Path, action: RosterAction) -> Result<()> {
    let mut roster = JsonRoster::open(path)?;
    match action {
        RosterAction::Init { force } => {
            if !roster.tags().is_empty() && !force {
                bail!("{} already has teams; use --force to replace them", path.display());
            }
            if path.exists() {
                std::fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
            }
            let mut fresh = JsonRoster::open(path)?;
            for team in sample_teams() {
                fresh.store_team(team)?;
            }
            fresh.save()?;
            println!("Wrote {} teams to {}", fresh.all_teams().len(), path.display());
        }
        RosterAction::Import { teams, players } => {
            let imported = read_rosters(&teams, &players)?;
            let count = imported.len();
            for team in imported {
                roster.store_team(team)?;
            }
            roster.save()?;
            println!("Imported {} teams", count);
        }
        RosterAction::Export { teams, players } => {
            write_rosters(&roster.all_teams(), &teams, &players)?;
            println!("Exported {} teams", roster.all_teams().len());
        }
        RosterAction::Show { tag: None } => {
            for tag in roster.tags() {
                if let Some(team) = roster.team_by_tag(&tag) {
                    println!("{:<6} {} ({} players)", team.tag, team.name, team.players.len());
                }
            }
        }
        RosterAction::Show { tag: Some(tag) } => {
            let team = roster.require_team(&tag)?;
            println!("{} [{}]", team.name, team.tag);
            for (i, p) in team.players.iter().enumerate() {
                println!(
                    "  {:>2} {:<24} {:?} bat {:>3} bowl {:>3} field {:>3}  M {} R {} W {}",
                    i,
                    p.name,
                    p.role,
                    p.batting_skill,
                    p.bowling_skill,
                    p.fielding_skill,
                    p.career.matches_played,
                    p.career.runs,
                    p.career.wickets
                );
            }
        }
    }
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("cricket CLI is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_call() {
        let ctx = RunCallContext { safe_runs: 1, max_runs: 3, fielder: Some(4) };
        assert_eq!(parse_run_call("\n", &ctx), Some(1));
        assert_eq!(parse_run_call(" 2 \n", &ctx), Some(2));
        assert_eq!(parse_run_call("0", &ctx), Some(0));
        assert_eq!(parse_run_call("4", &ctx), None);
        assert_eq!(parse_run_call("two", &ctx), None);
    }
}
