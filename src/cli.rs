// CLI module - command-line argument parsing and config handlers
//
// Subcommands:
// - replay [SCENARIO]: play a scenario (or a built-in demo) through the engine
// - config --show: Display effective configuration
// - config --reset: Regenerate config file with defaults
// - config --edit: Open config file in $EDITOR
// - config --update: Rewrite config with the current template, keeping values
// - config --path: Show config file path

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use pagelift::config::{Config, VERSION};
use pagelift::demo::DemoLayout;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;

/// pagelift - progressive enhancement engine for server-rendered pages
#[derive(Parser)]
#[command(name = "pagelift")]
#[command(version = VERSION)]
#[command(about = "Progressive enhancement engine for server-rendered pages", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replay a scenario trace against the in-memory document
    Replay(ReplayArgs),

    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,

        /// Open config file in $EDITOR
        #[arg(long)]
        edit: bool,

        /// Update config with new defaults (preserves user values)
        #[arg(long)]
        update: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

#[derive(Args, Debug, Default)]
pub struct ReplayArgs {
    /// Scenario file (TOML). Plays a built-in demo when omitted.
    pub scenario: Option<PathBuf>,

    /// Which built-in demo to play when no scenario is given
    #[arg(long, value_enum, default_value_t = DemoLayout::Desktop)]
    pub demo: DemoLayout,

    /// Pace the trace at wall-clock speed
    #[arg(long)]
    pub realtime: bool,

    /// Print the report as JSON (logs are not echoed)
    #[arg(long)]
    pub json: bool,
}

pub fn handle_config(show: bool, reset: bool, edit: bool, update: bool, path: bool) -> Result<()> {
    if path {
        handle_config_path()
    } else if show {
        handle_config_show()
    } else if reset {
        handle_config_reset()
    } else if edit {
        handle_config_edit()
    } else if update {
        handle_config_update()
    } else {
        println!("Usage: pagelift config [--show|--reset|--edit|--update|--path]");
        println!();
        println!("Options:");
        println!("  --show    Display effective configuration");
        println!("  --reset   Reset config file to defaults");
        println!("  --edit    Open config file in $EDITOR");
        println!("  --update  Update config with new defaults (preserves user values)");
        println!("  --path    Show config file path");
        Ok(())
    }
}

fn config_path() -> Result<PathBuf> {
    Config::config_path().context("Could not determine config path (no home directory)")
}

fn handle_config_path() -> Result<()> {
    println!("{}", config_path()?.display());
    Ok(())
}

fn handle_config_show() -> Result<()> {
    let config = Config::from_env()?;

    println!("# Effective configuration (env > file > defaults)");
    println!();
    print!("{}", config.to_toml());

    println!();
    let path = config_path()?;
    if path.exists() {
        println!("# Source: {}", path.display());
    } else {
        println!("# Source: defaults (no config file)");
    }
    Ok(())
}

fn handle_config_reset() -> Result<()> {
    let path = config_path()?;

    if path.exists() {
        eprint!(
            "Config file exists at {}. Overwrite? [y/N] ",
            path.display()
        );
        std::io::stderr().flush()?;

        let mut input = String::new();
        std::io::stdin()
            .read_line(&mut input)
            .context("Failed to read confirmation")?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Error creating directory {}", parent.display()))?;
    }

    std::fs::write(&path, Config::default().to_toml())
        .with_context(|| format!("Error writing config {}", path.display()))?;

    println!("Config reset to defaults: {}", path.display());
    Ok(())
}

fn handle_config_edit() -> Result<()> {
    let path = config_path()?;

    if !path.exists() {
        Config::ensure_config_exists();
        println!("Created new config file: {}", path.display());
    }

    let editor = std::env::var("EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .unwrap_or_else(|_| {
            if cfg!(windows) {
                "notepad".to_string()
            } else {
                "nano".to_string()
            }
        });

    println!("Opening {} with {}", path.display(), editor);

    let status = Command::new(&editor).arg(&path).status().with_context(|| {
        format!(
            "Failed to launch editor '{}'. Set $EDITOR to your preferred editor",
            editor
        )
    })?;
    if !status.success() {
        bail!("Editor exited with status: {}", status);
    }
    Ok(())
}

fn handle_config_update() -> Result<()> {
    let path = config_path()?;

    if !path.exists() {
        Config::ensure_config_exists();
        println!("Created new config file: {}", path.display());
        return Ok(());
    }

    // Parse before touching anything so a broken file is reported, not lost
    let existing = Config::from_env()?;
    let updated = existing.to_toml();

    let backup_path = path.with_extension("toml.bak");
    match std::fs::copy(&path, &backup_path) {
        Ok(_) => println!("Backup created: {}", backup_path.display()),
        Err(e) => eprintln!("Warning: Could not create backup: {}", e),
    }

    std::fs::write(&path, updated)
        .with_context(|| format!("Error writing config {}", path.display()))?;

    println!("Config updated with latest structure: {}", path.display());
    println!("Your values have been preserved.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_args_parse() {
        let cli = Cli::try_parse_from([
            "pagelift",
            "replay",
            "trace.toml",
            "--realtime",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Replay(args)) => {
                assert_eq!(args.scenario, Some(PathBuf::from("trace.toml")));
                assert!(args.realtime);
                assert!(args.json);
                assert_eq!(args.demo, DemoLayout::Desktop);
            }
            _ => panic!("expected replay"),
        }
    }

    #[test]
    fn test_demo_layout_flag() {
        let cli = Cli::try_parse_from(["pagelift", "replay", "--demo", "mobile"]).unwrap();
        match cli.command {
            Some(Commands::Replay(args)) => {
                assert_eq!(args.scenario, None);
                assert_eq!(args.demo, DemoLayout::Mobile);
            }
            _ => panic!("expected replay"),
        }
    }

    #[test]
    fn test_config_flags() {
        let cli = Cli::try_parse_from(["pagelift", "config", "--path"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Config { path: true, .. })
        ));
    }

    #[test]
    fn test_no_subcommand() {
        let cli = Cli::try_parse_from(["pagelift"]).unwrap();
        assert!(cli.command.is_none());
    }
}
