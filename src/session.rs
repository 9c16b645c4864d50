// src/session.rs

//! Ownership of the fanotify descriptor and the watch loop that drains it.

use std::convert::Infallible;
use std::fs::File;
use std::io::BufReader;
use std::os::fd::OwnedFd;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::abi::{INIT_FLAGS, MARK_FLAGS, MARK_MASK};
use crate::errors::WatchError;
use crate::event::ChangeEvent;
use crate::filter::PathFilter;
use crate::pipeline::Pipeline;
use crate::privilege::ensure_privileges;
use crate::resolve::KernelResolver;
use crate::stats::EventStats;
use crate::sys;

/// Read buffer for the notification descriptor.
///
/// The kernel refuses reads shorter than the pending event, so reads go
/// through a buffer that comfortably holds several whole FID events.
pub const READ_BUFFER_SIZE: usize = 8192;

/// A fanotify group in file-identifier mode plus the directory it watches.
#[derive(Debug)]
pub struct WatchSession {
    directory: PathBuf,
    notify_fd: OwnedFd,
    mount_fd: OwnedFd,
    stats: Arc<EventStats>,
    max_path_len: Option<usize>,
}

impl WatchSession {
    /// Open the notification group.
    ///
    /// Checks privileges first, so a missing capability is reported here
    /// rather than as a failure on every event later.
    pub fn open(directory: impl AsRef<Path>) -> Result<Self, WatchError> {
        let directory = directory.as_ref().to_path_buf();

        ensure_privileges()?;

        let notify_fd = sys::fanotify_init(INIT_FLAGS).map_err(WatchError::Init)?;
        let mount_fd = sys::open_directory(&directory).map_err(WatchError::Init)?;

        debug!(?directory, "fanotify group opened");

        Ok(Self {
            directory,
            notify_fd,
            mount_fd,
            stats: Arc::new(EventStats::new()),
            max_path_len: None,
        })
    }

    /// Install the filesystem-wide mark for directory-entry and modify events.
    pub fn install_mark(&self) -> Result<(), WatchError> {
        sys::fanotify_mark(&self.notify_fd, MARK_FLAGS, MARK_MASK, &self.directory).map_err(
            |source| WatchError::Mark {
                path: self.directory.clone(),
                source,
            },
        )?;
        info!(directory = ?self.directory, "filesystem mark installed");
        Ok(())
    }

    pub fn with_max_path_len(mut self, max: Option<usize>) -> Self {
        self.max_path_len = max;
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Counters for this session, readable while [`WatchSession::run`] blocks.
    pub fn stats(&self) -> Arc<EventStats> {
        Arc::clone(&self.stats)
    }

    /// Drain the notification descriptor forever.
    ///
    /// Only returns on a fatal error. Must run on a thread that is not driving
    /// an async runtime, since dispatch blocks on the bounded sink.
    pub fn run<F: PathFilter>(
        self,
        filter: F,
        sink: mpsc::Sender<ChangeEvent>,
    ) -> Result<Infallible, WatchError> {
        let Self {
            directory,
            notify_fd,
            mount_fd,
            stats,
            max_path_len,
        } = self;

        let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, File::from(notify_fd));
        let mut pipeline = Pipeline::new(KernelResolver::new(mount_fd), filter, sink)
            .with_stats(stats)
            .with_max_path_len(max_path_len)
            .closing_event_fds(true);

        info!(?directory, "watch loop started");
        pipeline.run(&mut reader)
    }
}
