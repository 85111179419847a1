//! CLI command definitions for villager-trade-limiter
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod check;
pub mod resolve;

use check::CheckArgs;
use clap::{Parser, Subcommand};
use resolve::ResolveArgs;

/// Inspect how villager trade settings resolve for specific trades
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (bypasses defaults merging)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Plugin data directory containing config.yml
    #[arg(short, long, global = true)]
    pub data_dir: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    /// Output format: markdown or json
    #[arg(short, long, default_value = "markdown", global = true)]
    pub format: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve settings for a trade
    Resolve(ResolveArgs),

    /// Report override entries that can never match
    Check(CheckArgs),

    /// Write the default config.yml into the data directory if missing
    Init,

    /// Resolve settings for a trade, re-resolving whenever the config changes
    Watch(ResolveArgs),
}
