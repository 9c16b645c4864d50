// src/lib.rs

//! Filesystem change notifications on Linux through fanotify.
//!
//! A filesystem-wide mark is installed in file-identifier mode; each kernel
//! record is decoded, its object handle reopened to recover a path, the mask
//! classified, and the result filtered and pushed onto a bounded queue:
//!
//! ```text
//! WatchSession ──► RecordDecoder ──► extract_handle ──► PathResolver
//!                                                            │
//!                        sink ◄── Dispatcher ◄── classify ◄──┘
//! ```
//!
//! Everything runs on one thread, one record at a time, so events reach the
//! consumer in kernel delivery order.

pub mod abi;
pub mod classify;
pub mod cli;
pub mod config;
pub mod decode;
pub mod dispatch;
pub mod errors;
pub mod event;
pub mod filter;
pub mod logging;
pub mod pipeline;
pub mod privilege;
pub mod resolve;
pub mod session;
pub mod stats;
pub mod sys;
pub mod types;

use std::convert::Infallible;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::thread::JoinHandle;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, info};

pub use classify::classify;
pub use errors::{DecodeError, EventError, ResolveError, WatchError};
pub use event::{ChangeEvent, ChangeKind};
pub use filter::{AcceptAll, GlobFilter, PathFilter};
pub use session::WatchSession;
pub use stats::{EventStats, StatsSnapshot};

use crate::cli::CliArgs;
use crate::config::{Settings, load_or_default};
use crate::types::OutputFormat;

/// Watch the filesystem containing `directory` and send every event that
/// `filter` does not reject to `sink`.
///
/// Blocks the calling thread for as long as the watch is healthy and returns
/// only with a fatal error. Per-event failures are logged and counted, never
/// returned. Must not be called from within an async runtime.
pub fn listen<F: PathFilter>(
    directory: impl AsRef<Path>,
    filter: F,
    sink: mpsc::Sender<ChangeEvent>,
) -> std::result::Result<Infallible, WatchError> {
    let session = WatchSession::open(directory)?;
    session.install_mark()?;
    session.run(filter, sink)
}

/// A watch loop running on its own thread.
#[derive(Debug)]
pub struct ListenerHandle {
    stats: Arc<EventStats>,
    thread: JoinHandle<std::result::Result<Infallible, WatchError>>,
}

impl ListenerHandle {
    pub fn stats(&self) -> Arc<EventStats> {
        Arc::clone(&self.stats)
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait for the loop to stop and return the error that stopped it.
    pub fn join(self) -> WatchError {
        match self.thread.join() {
            Ok(Err(err)) => err,
            Ok(Ok(never)) => match never {},
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

/// Open and mark on the calling thread, then run the loop on a dedicated
/// `fanwatch-reader` thread.
///
/// Setup failures (privileges, `fanotify_init`, `fanotify_mark`) are returned
/// here, before any thread is spawned.
pub fn spawn_listener<F: PathFilter + 'static>(
    directory: impl AsRef<Path>,
    max_path_len: Option<usize>,
    filter: F,
    sink: mpsc::Sender<ChangeEvent>,
) -> std::result::Result<ListenerHandle, WatchError> {
    let session = WatchSession::open(directory)?.with_max_path_len(max_path_len);
    session.install_mark()?;
    let stats = session.stats();

    let thread = std::thread::Builder::new()
        .name("fanwatch-reader".to_string())
        .spawn(move || session.run(filter, sink))
        .map_err(WatchError::Init)?;

    Ok(ListenerHandle { stats, thread })
}

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and CLI overrides
/// - the listener thread
/// - printing events to stdout
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_or_default(args.config.as_deref())?;
    let settings = Settings::from_sources(&cfg, &args)?;

    if args.dry_run {
        print_dry_run(&settings);
        return Ok(());
    }

    let filter = settings.filter()?;
    let (tx, mut rx) = mpsc::channel::<ChangeEvent>(settings.queue_length);

    let listener = spawn_listener(&settings.directory, settings.max_path_len, filter, tx)
        .with_context(|| format!("starting watch on {:?}", settings.directory))?;
    let stats = listener.stats();

    info!(
        directory = ?settings.directory,
        queue_length = settings.queue_length,
        "watching for changes"
    );

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(event) => write_event(&mut std::io::stdout().lock(), &event, settings.format)?,
                None => break,
            },
            res = tokio::signal::ctrl_c() => {
                res.context("listening for Ctrl+C")?;
                info!(stats = ?stats.snapshot(), "shutting down");
                return Ok(());
            }
        }
    }

    // The sender only goes away when the listener thread has stopped.
    let err = tokio::task::spawn_blocking(move || listener.join()).await?;
    debug!(stats = ?stats.snapshot(), "listener stopped");
    Err(err).context("watch loop failed")
}

/// Write a single event in the requested format, one per line.
pub fn write_event<W: Write>(out: &mut W, event: &ChangeEvent, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => writeln!(out, "{}\t{}", event.kind, event.path.display())?,
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, event)?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}

/// Print the effective settings without touching fanotify.
fn print_dry_run(settings: &Settings) {
    println!("fanwatch dry-run");
    println!("  directory = {}", settings.directory.display());
    println!("  subtree_only = {}", settings.subtree_only);
    println!("  queue_length = {}", settings.queue_length);
    match settings.max_path_len {
        Some(max) => println!("  max_path_len = {max}"),
        None => println!("  max_path_len = unlimited"),
    }
    println!("  format = {:?}", settings.format);
    if !settings.include.is_empty() {
        println!("  include: {:?}", settings.include);
    }
    if !settings.exclude.is_empty() {
        println!("  exclude: {:?}", settings.exclude);
    }

    debug!("dry-run complete (no watch installed)");
}
