use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "cuedit")]
#[command(about = "Drive the caption cue editor headlessly from a scripted session.")]
pub struct Args {
    /// Path to config TOML (defaults to ./cuedit.toml if present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Replay an editing script against a fresh session and report the result
    Replay(ReplayCmd),
    /// Print the effective default config as TOML and exit
    PrintDefaultConfig,
}

#[derive(Debug, Parser)]
pub struct ReplayCmd {
    /// Script file path, or '-' for stdin
    pub script: String,

    /// Report file path (optional)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Write to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,

    /// Allow overwriting the report file
    #[arg(long)]
    pub overwrite: bool,
}
