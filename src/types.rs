// src/types.rs

use clap::ValueEnum;
use serde::Deserialize;

/// How the binary prints events on stdout.
///
/// - `Text`: `<kind>\t<path>` per line.
/// - `Json`: one JSON object per line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
