// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::types::OutputFormat;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [watch]
/// directory = "/srv/data"
/// include = ["/srv/data/**"]
/// exclude = ["**/.git/**", "**/*.tmp"]
/// queue_length = 1024
/// subtree_only = true
///
/// [output]
/// format = "json"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub watch: WatchSection,

    #[serde(default)]
    pub output: OutputSection,
}

/// Validated configuration. Only constructible through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    watch: WatchSection,
    output: OutputSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(watch: WatchSection, output: OutputSection) -> Self {
        Self { watch, output }
    }

    pub fn watch(&self) -> &WatchSection {
        &self.watch
    }

    pub fn output(&self) -> &OutputSection {
        &self.output
    }
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchSection {
    /// Directory whose filesystem is marked. May be overridden on the CLI.
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Glob patterns a resolved path must match (any of) to be reported.
    #[serde(default)]
    pub include: Vec<String>,

    /// Glob patterns that drop a resolved path.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Capacity of the queue between the reader thread and the consumer.
    #[serde(default = "default_queue_length")]
    pub queue_length: usize,

    /// Drop events whose path exceeds this many bytes. `None` = no limit.
    #[serde(default)]
    pub max_path_len: Option<usize>,

    /// The mark covers the whole filesystem; when true, only paths under
    /// `directory` are reported.
    #[serde(default = "default_subtree_only")]
    pub subtree_only: bool,
}

fn default_queue_length() -> usize {
    1024
}

fn default_subtree_only() -> bool {
    true
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            directory: None,
            include: Vec::new(),
            exclude: Vec::new(),
            queue_length: default_queue_length(),
            max_path_len: None,
            subtree_only: default_subtree_only(),
        }
    }
}

/// `[output]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    #[serde(default)]
    pub format: OutputFormat,
}
