// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `pomwatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pomwatch",
    version,
    about = "Watch a source tree and rebuild the Maven module that owns each change.",
    long_about = None
)]
pub struct CliArgs {
    /// Root directory of the source tree to watch.
    ///
    /// Default: `[watch].directory` from the config file, else the current
    /// working directory.
    #[arg(short = 'd', long, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Optional config file (TOML).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `POMWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Build once per event instead of once per module per batch.
    #[arg(long)]
    pub no_coalesce: bool,

    /// Build program to run instead of `mvn` (e.g. `./mvnw`).
    #[arg(long, value_name = "PROGRAM")]
    pub mvn: Option<String>,

    /// Pass `-o` to the build.
    #[arg(long)]
    pub offline: bool,

    /// Pass `-q` to the build.
    #[arg(long)]
    pub quiet: bool,

    /// Resolve settings, print the directories that would be watched, and
    /// exit without watching or building.
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

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
