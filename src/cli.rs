// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::types::OutputFormat;

/// Command-line arguments for `fanwatch`.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "fanwatch",
    version,
    about = "Stream create/delete/modify events for a filesystem using fanotify.",
    long_about = None
)]
pub struct CliArgs {
    /// Directory to watch. Its whole filesystem is marked; by default only
    /// events under this directory are printed.
    #[arg(value_name = "DIRECTORY")]
    pub directory: Option<PathBuf>,

    /// Path to the config file (TOML).
    ///
    /// Default: `Fanwatch.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Only report paths matching this glob (repeatable).
    #[arg(long, value_name = "GLOB")]
    pub include: Vec<String>,

    /// Drop paths matching this glob (repeatable).
    #[arg(long, value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Capacity of the event queue between reader and printer.
    #[arg(long, value_name = "N")]
    pub queue_length: Option<usize>,

    /// Output format for events on stdout.
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `FANWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Load and validate configuration, print it, but don't watch anything.
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
