//! Tournament CLI
//!
//! Replay scripted fencing team events and show stored ones.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use tournament::logging::{LogFormat, init_logging};
use tournament::{
    EventReport, EventScript, JsonDirStore, MemoryStore, RecordStore, TournamentConfig,
    TournamentEngine, read_event, run_script,
};
use tracing::info;

/// Fencing team tournament runner.
#[derive(Parser, Debug)]
#[command(name = "tournament", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Log output format.
    #[arg(long, value_enum, default_value = "human", global = true)]
    log_format: LogFormat,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a scripted event and print its report.
    Run(RunArgs),

    /// Print the report of a stored event.
    Show(ShowArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Event script (TOML).
    script: PathBuf,

    /// Engine configuration (TOML).
    #[arg(short, long, env = "TOURNAMENT_CONFIG")]
    config: Option<PathBuf>,

    /// Keep event records in this directory instead of in memory.
    #[arg(long)]
    state_dir: Option<PathBuf>,

    /// Also write the JSON report to this file.
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct ShowArgs {
    /// Stored event record (JSON).
    event: PathBuf,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
}

fn print(report: &EventReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        report.print_report();
    }
    Ok(())
}

fn replay<S: RecordStore>(
    store: S,
    script: &EventScript,
    config: &TournamentConfig,
) -> Result<EventReport> {
    let engine = TournamentEngine::new(store);
    let id = run_script(&engine, script, config)
        .with_context(|| format!("failed to replay {}", script.name))?;
    let event = engine.event(id)?;
    Ok(EventReport::from_event(&event))
}

fn run(args: RunArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => TournamentConfig::load(path)?,
        None => TournamentConfig::default(),
    };
    let script = EventScript::load(&args.script)?;

    let state_dir = args.state_dir.as_ref().or(config.state_dir.as_ref());
    let report = match state_dir {
        Some(dir) => {
            let store = JsonDirStore::open(dir)?;
            info!(dir = %store.dir().display(), "keeping event records");
            replay(store, &script, &config)?
        }
        None => replay(MemoryStore::new(), &script, &config)?,
    };

    if let Some(out) = &args.out {
        report
            .save(out)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("failed to write {}", out.display()))?;
    }
    print(&report, args.json)
}

fn show(path: &Path, json: bool) -> Result<()> {
    let event = read_event(path)?;
    print(&EventReport::from_event(&event), json)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.verbose);

    match cli.command {
        Commands::Run(args) => run(args),
        Commands::Show(args) => show(&args.event, args.json),
    }
}
