//! `aw-cli`: a thin helper binary over the directory contract, log
//! files, and the external `aw-qt` process — a consumer of the library
//! crates, not part of the hard core.
//!
//! Grounded on `aw_cli/__main__.py` (`click` command group with a
//! `--testing` flag and `directories`/`logs`/`qt` subcommands).

mod dirs;
mod logs;

use anyhow::Context;
use aw_modules::{ModuleCoordinator, NullModuleCoordinator};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "aw-cli", about = "Helper tools for a Sundial install")]
struct Cli {
    /// Run in testing mode: looks at *.testing.log files and passes
    /// --testing through to aw-qt.
    #[arg(long, global = true)]
    testing: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the config/data/log/cache directory paths.
    Directories,
    /// Print log lines for one module, or every module if omitted.
    Logs {
        module_name: Option<String>,
        #[arg(long, value_parser = parse_date)]
        since: Option<NaiveDate>,
        #[arg(long)]
        level: Option<String>,
    },
    /// Pass through to the external aw-qt process manager.
    Qt,
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| e.to_string())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Directories => print_directories(),
        Command::Logs { module_name, since, level } => print_logs(module_name, since, level),
        Command::Qt => run_qt(cli.testing),
    }
}

fn print_directories() -> anyhow::Result<()> {
    println!("Directory paths used");
    println!(" - config: {}", dirs::config_dir()?.display());
    println!(" - data:   {}", dirs::data_dir()?.display());
    println!(" - logs:   {}", dirs::log_dir()?.display());
    println!(" - cache:  {}", dirs::cache_dir()?.display());
    Ok(())
}

fn print_logs(module_name: Option<String>, since: Option<NaiveDate>, level: Option<String>) -> anyhow::Result<()> {
    if let Some(level) = &level {
        anyhow::ensure!(
            logs::LOG_LEVELS.contains(&level.as_str()),
            "invalid --level '{level}', expected one of {:?}",
            logs::LOG_LEVELS
        );
    }
    let log_dir = dirs::log_dir()?;

    let print_for = |dir: &std::path::Path| -> anyhow::Result<()> {
        match logs::find_latest_log(dir, false) {
            Some(path) => logs::print_log(&path, since, level.as_deref()),
            None => {
                println!("No logfile found in {}", dir.display());
                Ok(())
            }
        }
    };

    if let Some(module_name) = module_name {
        print_for(&log_dir.join(module_name))?;
    } else {
        let mut subdirs: Vec<_> = std::fs::read_dir(&log_dir)
            .with_context(|| format!("reading log directory {}", log_dir.display()))?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .collect();
        subdirs.sort();
        for subdir in subdirs {
            print_for(&subdir)?;
        }
    }
    Ok(())
}

/// Out of scope per spec.md §1: `ModuleCoordinator` only demonstrates
/// the contract's shape here, via the no-op reference implementation.
/// A real binary would wire in a coordinator that actually spawns
/// `aw-qt`.
fn run_qt(testing: bool) -> anyhow::Result<()> {
    let coordinator = NullModuleCoordinator::new();
    coordinator.start("aw-qt")?;
    log::info!("aw-qt started (testing={testing})");
    Ok(())
}
