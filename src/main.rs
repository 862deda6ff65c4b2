// pagelift - progressive enhancement engine for server-rendered pages
//
// The library holds the engine. This binary replays scenario traces through
// it against the in-memory document and reports what the page would see.
//
// Architecture:
// - Config: env > ~/.config/pagelift/config.toml > defaults
// - Logging: tracing with an in-memory capture that lands in the report
// - Replay: scenario file (or built-in demo) -> Orchestrator -> report

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, ReplayArgs};
use pagelift::config::Config;
use pagelift::logging::{self, LogBuffer};
use pagelift::replay::{self, ReplayOptions, Scenario};
use pagelift::{demo, startup};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Config {
            show,
            reset,
            edit,
            update,
            path,
        }) => cli::handle_config(show, reset, edit, update, path),
        Some(Commands::Replay(args)) => run_replay(args).await,
        None => run_replay(ReplayArgs::default()).await,
    }
}

async fn run_replay(args: ReplayArgs) -> Result<()> {
    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();

    // A config file that exists but does not parse is fatal
    let config = Config::from_env()?;

    let log_buffer = LogBuffer::new(config.logging.capture_capacity);
    // Held until exit so the file writer flushes
    let _file_guard = logging::init(&config.logging, &log_buffer, !args.json)?;

    let scenario = match &args.scenario {
        Some(path) => Scenario::load(path)?,
        None => demo::scenario(args.demo)?,
    };
    let name = scenario.name.clone();

    let options = ReplayOptions {
        realtime: args.realtime,
    };
    let mut report = replay::run(scenario, config, options).await?;
    report.logs = log_buffer.get_all();

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        startup::print_startup(&report.startup, &name);
        report.print_summary();
        println!();
    }
    Ok(())
}
