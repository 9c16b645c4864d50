// src/pipeline.rs

//! One pass of read → decode → resolve → classify → dispatch.
//!
//! The pipeline is generic over the byte source and the resolver so it can be
//! driven by the kernel descriptor in production and by synthetic streams in
//! tests. Records are handled strictly one after another; output order is
//! input order.

use std::convert::Infallible;
use std::io::Read;
use std::os::fd::{FromRawFd, OwnedFd};
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use crate::abi::FAN_NOFD;
use crate::classify::classify;
use crate::decode::{Decoded, EventHeader, RecordDecoder, SkipReason};
use crate::dispatch::{Dispatch, Dispatcher};
use crate::errors::{DecodeError, EventError, ResolveError, WatchError};
use crate::event::{ChangeEvent, ChangeKind};
use crate::filter::PathFilter;
use crate::resolve::PathResolver;
use crate::stats::EventStats;

/// What became of a single record.
#[derive(Debug)]
pub enum Outcome {
    Dispatched(ChangeKind),
    Filtered,
    Skipped(SkipReason),
    Overflow,
    DecodeFailed(DecodeError),
    ResolveFailed(ResolveError),
}

impl Outcome {
    /// The per-record error, if this record failed.
    pub fn into_error(self) -> Option<EventError> {
        match self {
            Outcome::DecodeFailed(err) => Some(err.into()),
            Outcome::ResolveFailed(err) => Some(err.into()),
            _ => None,
        }
    }
}

pub struct Pipeline<R, F> {
    decoder: RecordDecoder,
    resolver: R,
    dispatcher: Dispatcher<F>,
    stats: Arc<EventStats>,
    max_path_len: Option<usize>,
    close_event_fds: bool,
}

impl<R: PathResolver, F: PathFilter> Pipeline<R, F> {
    pub fn new(resolver: R, filter: F, sink: mpsc::Sender<ChangeEvent>) -> Self {
        Self {
            decoder: RecordDecoder::new(),
            resolver,
            dispatcher: Dispatcher::new(filter, sink),
            stats: Arc::new(EventStats::new()),
            max_path_len: None,
            close_event_fds: false,
        }
    }

    /// Share an existing counter set instead of a fresh one.
    pub fn with_stats(mut self, stats: Arc<EventStats>) -> Self {
        self.stats = stats;
        self
    }

    /// Drop events whose resolved path is longer than `max` bytes.
    pub fn with_max_path_len(mut self, max: Option<usize>) -> Self {
        self.max_path_len = max;
        self
    }

    /// Treat a non-negative `fd` in a header as a descriptor we now own.
    ///
    /// Only meaningful when reading from a real fanotify descriptor.
    pub fn closing_event_fds(mut self, close: bool) -> Self {
        self.close_event_fds = close;
        self
    }

    pub fn stats(&self) -> Arc<EventStats> {
        Arc::clone(&self.stats)
    }

    /// Process exactly one record from `reader`.
    ///
    /// Returns `Err` only for failures that make further reading pointless:
    /// the channel failing or the consumer going away. Everything else is an
    /// [`Outcome`].
    pub fn process_next<Rd: Read>(&mut self, reader: &mut Rd) -> Result<Outcome, WatchError> {
        let header = self.decoder.read_header(reader)?;
        self.release_event_fd(&header);

        let outcome = match self.decoder.read_body(reader, &header) {
            Ok(Decoded::Fid { header, handle }) => match self.resolve(&handle) {
                Ok(path) => self.deliver(path, header.mask)?,
                Err(err) => Outcome::ResolveFailed(err),
            },
            Ok(Decoded::Overflow { .. }) => Outcome::Overflow,
            Ok(Decoded::Skipped { reason, .. }) => Outcome::Skipped(reason),
            Err(err) => Outcome::DecodeFailed(err),
        };

        self.report(&header, &outcome);
        Ok(outcome)
    }

    /// Process records until a fatal error occurs.
    pub fn run<Rd: Read>(&mut self, reader: &mut Rd) -> Result<Infallible, WatchError> {
        loop {
            self.process_next(reader)?;
        }
    }

    fn resolve(&self, handle: &crate::decode::ObjectHandle) -> Result<PathBuf, ResolveError> {
        let path = self.resolver.resolve(handle)?;
        if let Some(max) = self.max_path_len {
            let len = path.as_os_str().len();
            if len > max {
                return Err(ResolveError::PathTooLong { len, max });
            }
        }
        Ok(path)
    }

    fn deliver(&self, path: PathBuf, mask: u64) -> Result<Outcome, WatchError> {
        let kind = classify(mask);
        trace!(?path, %kind, mask = format_args!("{mask:#x}"), "classified event");
        match self.dispatcher.dispatch(path, kind)? {
            Dispatch::Sent => Ok(Outcome::Dispatched(kind)),
            Dispatch::Filtered => Ok(Outcome::Filtered),
        }
    }

    /// Close the descriptor that came with `header`, if any.
    ///
    /// Only a header whose lengths validate is trusted; otherwise `fd` could be
    /// stray bytes naming a descriptor this process owns for something else.
    fn release_event_fd(&self, header: &EventHeader) {
        if !self.close_event_fds || header.fd == FAN_NOFD || header.fd < 0 {
            return;
        }
        if header.trailing_len().is_err() {
            debug!(fd = header.fd, "not closing descriptor of a malformed header");
            return;
        }
        // SAFETY: the kernel installed this descriptor for us with the event;
        // nothing else refers to it.
        drop(unsafe { OwnedFd::from_raw_fd(header.fd) });
    }

    fn report(&self, header: &EventHeader, outcome: &Outcome) {
        self.stats.record(outcome);
        match outcome {
            Outcome::Dispatched(_) | Outcome::Filtered => {}
            Outcome::Skipped(reason) => {
                debug!(?reason, pid = header.pid, "record produced no event");
            }
            Outcome::Overflow => {
                warn!("kernel event queue overflowed; some changes were lost");
            }
            Outcome::DecodeFailed(err) => {
                warn!(error = %err, pid = header.pid, "dropping undecodable record");
            }
            Outcome::ResolveFailed(err) => {
                warn!(error = %err, pid = header.pid, "dropping event with unresolvable handle");
            }
        }
    }
}
