//! Villager Trade Limiter CLI
//!
//! Inspects how trade settings resolve against the plugin's `config.yml`,
//! including per-item and per-enchantment overrides.

use anyhow::{Result, anyhow};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};
use villager_trade_limiter::cli::check::run_check;
use villager_trade_limiter::cli::resolve::{ResolveArgs, render, resolve_all};
use villager_trade_limiter::cli::{Cli, Command};
use villager_trade_limiter::config::watcher::{WatchPaths, WatcherConfig, start_config_watcher};
use villager_trade_limiter::config::{ConfigLoader, ConfigPaths};
use villager_trade_limiter::format::OutputFormat;
use villager_trade_limiter::logging::{self, LogTarget};
use villager_trade_limiter::settings::Settings;

/// Command-line flags take precedence over the environment.
fn config_paths(cli: &Cli) -> ConfigPaths {
    let mut paths = ConfigPaths::discover();
    if let Some(ref dir) = cli.data_dir {
        paths.data_dir = Some(PathBuf::from(dir));
    }
    if let Some(ref file) = cli.config {
        paths.config_file = Some(PathBuf::from(file));
    }
    paths
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;

    let format = OutputFormat::from_str(&cli.format)
        .ok_or_else(|| anyhow!("unknown output format '{}' (expected markdown or json)", cli.format))?;
    let paths = config_paths(&cli);

    match cli.command {
        Command::Init => {
            match ConfigLoader::save_default_config(&paths)? {
                Some(path) => println!("Wrote default config to {}", path.display()),
                None => println!("Config already exists; nothing written"),
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Resolve(args) => {
            let settings = Settings::load(paths)?;
            println!("{}", render(&resolve_all(&settings, &args)?, format)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Check(args) => {
            let settings = Settings::load(paths)?;
            let report = run_check(&settings, format)?;
            println!("{}", report.output);
            if report.fails(&args) {
                return Ok(ExitCode::FAILURE);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Watch(args) => {
            run_watch(paths, args, format).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Print the resolution, then re-print it after every config change.
///
/// A reload that fails to parse is logged and the previous config stays in use.
async fn run_watch(paths: ConfigPaths, args: ResolveArgs, format: OutputFormat) -> Result<()> {
    let config_file = paths
        .effective_config()
        .ok_or_else(|| anyhow!("watch needs --config or --data-dir"))?;
    let settings = Settings::load(paths)?;
    println!("{}", render(&resolve_all(&settings, &args)?, format)?);

    let mut handle = start_config_watcher(WatchPaths::for_file(&config_file), WatcherConfig::default())?;
    info!("Watching {} for changes", config_file.display());

    loop {
        let Some(event) = handle.wait_for_change().await else {
            info!("Config file watcher stopped");
            return Ok(());
        };
        if !event.requires_reload() {
            continue;
        }
        info!(paths = ?event.affected_paths(), "Config change detected");
        match settings.reload() {
            Ok(_) => println!("{}", render(&resolve_all(&settings, &args)?, format)?),
            Err(e) => warn!("Failed to reload config, keeping previous: {}", e),
        }
    }
}
