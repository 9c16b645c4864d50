// src/errors.rs

//! Crate-wide error types.
//!
//! Errors fall into two families:
//! - [`WatchError`]: the notification channel itself is unusable. These end
//!   the watch loop and are returned from [`crate::listen`].
//! - [`EventError`]: a single record could not be turned into an event. These
//!   are logged, counted in [`crate::stats::EventStats`] and the loop moves on.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Configuration and glue errors used by the binary.
#[derive(Error, Debug)]
pub enum FanwatchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid glob pattern: {0}")]
    GlobError(#[from] globset::Error),
}

pub type Result<T> = std::result::Result<T, FanwatchError>;

/// Fatal failures of the notification channel.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("fanotify_init failed: {0}")]
    Init(#[source] io::Error),

    #[error("missing privilege: {0}")]
    MissingPrivilege(String),

    #[error("fanotify_mark failed on {path:?}: {source}")]
    Mark {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("reading from the notification channel failed: {0}")]
    FatalRead(#[source] io::Error),

    #[error("event receiver was dropped")]
    SinkClosed,
}

/// A record could not be decoded.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("short read: expected {expected} bytes, got {got}")]
    ShortRead { expected: usize, got: usize },

    #[error("malformed header: event_len {event_len} < metadata_len {metadata_len}")]
    MalformedHeader { event_len: u32, metadata_len: u16 },

    #[error("malformed info record: {0}")]
    MalformedInfo(String),

    #[error("truncated handle: declared {declared} bytes, {available} available")]
    TruncatedHandle { declared: usize, available: usize },
}

/// A decoded handle could not be turned into a path.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("open_by_handle_at failed: {0}")]
    Handle(#[source] io::Error),

    #[error("reading descriptor path failed: {0}")]
    PathRead(#[source] io::Error),

    #[error("resolved path is {len} bytes, limit is {max}")]
    PathTooLong { len: usize, max: usize },
}

/// Any per-record failure. Never fatal to the watch loop.
#[derive(Error, Debug)]
pub enum EventError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}
