// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! NOTE: this expects `clap` to be built with the `derive` feature, e.g.:
//! `clap = { version = "4.5.53", features = ["derive"] }` in `Cargo.toml`.

use clap::{Parser, ValueEnum};

use crate::config::default_config_path;

/// Command-line arguments for `cirun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "cirun",
    version,
    about = "Run a single CI build job: sync a git checkout, execute its script, report the outcome.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the runner config file (TOML).
    ///
    /// Default: `Cirun.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value_t = default_config())]
    pub config: String,

    /// Path to the job descriptor file (TOML).
    #[arg(long, value_name = "PATH")]
    pub job: String,

    /// Override the build timeout in seconds for this run.
    ///
    /// If omitted, the config's `timeout` (default 7200) applies.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CIRUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Load + validate everything, print the planned sync command and script,
    /// but don't execute anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

fn default_config() -> String {
    default_config_path().display().to_string()
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
