// src/config/mod.rs

//! Configuration loading and validation for fanwatch.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate basic invariants like queue size and glob syntax (`validate.rs`).
//! - Merge the file with command-line overrides into [`Settings`].

pub mod loader;
pub mod model;
pub mod validate;

use std::path::PathBuf;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_or_default};
pub use model::{ConfigFile, OutputSection, RawConfigFile, WatchSection};

use crate::cli::CliArgs;
use crate::errors::{FanwatchError, Result};
use crate::filter::GlobFilter;
use crate::types::OutputFormat;

/// Effective settings for one run: config file plus CLI overrides.
#[derive(Debug, Clone)]
pub struct Settings {
    pub directory: PathBuf,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub queue_length: usize,
    pub max_path_len: Option<usize>,
    pub subtree_only: bool,
    pub format: OutputFormat,
}

impl Settings {
    /// Merge `cfg` with `args`.
    ///
    /// - `DIRECTORY` on the command line replaces `[watch].directory`.
    /// - `--include` / `--exclude` are appended to the file's lists.
    /// - `--queue-length` and `--format` replace the file's values.
    ///
    /// The directory must exist; it is canonicalized so that the subtree
    /// check compares against the same absolute form the kernel reports.
    pub fn from_sources(cfg: &ConfigFile, args: &CliArgs) -> Result<Self> {
        let directory = args
            .directory
            .clone()
            .or_else(|| cfg.watch().directory.clone())
            .ok_or_else(|| {
                FanwatchError::ConfigError(
                    "no directory to watch: pass DIRECTORY or set [watch].directory".to_string(),
                )
            })?;

        if !directory.is_dir() {
            return Err(FanwatchError::ConfigError(format!(
                "watch directory {directory:?} does not exist or is not a directory"
            )));
        }
        let directory = directory.canonicalize()?;

        let mut include = cfg.watch().include.clone();
        include.extend(args.include.iter().cloned());
        let mut exclude = cfg.watch().exclude.clone();
        exclude.extend(args.exclude.iter().cloned());

        let queue_length = args.queue_length.unwrap_or(cfg.watch().queue_length);
        if queue_length == 0 {
            return Err(FanwatchError::ConfigError(
                "--queue-length must be >= 1 (got 0)".to_string(),
            ));
        }

        Ok(Self {
            directory,
            include,
            exclude,
            queue_length,
            max_path_len: cfg.watch().max_path_len,
            subtree_only: cfg.watch().subtree_only,
            format: args.format.unwrap_or(cfg.output().format),
        })
    }

    /// Build the path filter described by these settings.
    pub fn filter(&self) -> Result<GlobFilter> {
        let filter = GlobFilter::new(&self.include, &self.exclude)?;
        Ok(if self.subtree_only {
            filter.within(&self.directory)
        } else {
            filter
        })
    }
}
