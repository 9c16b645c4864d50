// src/dispatch.rs

use std::path::PathBuf;

use tokio::sync::mpsc;

use crate::errors::WatchError;
use crate::event::{ChangeEvent, ChangeKind};
use crate::filter::PathFilter;

/// What happened to an event handed to the [`Dispatcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Sent,
    Filtered,
}

/// Applies the caller's filter and pushes surviving events to the sink.
///
/// Sending blocks while the queue is full, so a slow consumer slows the
/// reader instead of losing events here. Must not be called from inside an
/// async context.
pub struct Dispatcher<F> {
    filter: F,
    sink: mpsc::Sender<ChangeEvent>,
}

impl<F: PathFilter> Dispatcher<F> {
    pub fn new(filter: F, sink: mpsc::Sender<ChangeEvent>) -> Self {
        Self { filter, sink }
    }

    pub fn dispatch(&self, path: PathBuf, kind: ChangeKind) -> Result<Dispatch, WatchError> {
        if self.filter.is_filtered(&path) {
            return Ok(Dispatch::Filtered);
        }

        self.sink
            .blocking_send(ChangeEvent { path, kind })
            .map_err(|_| WatchError::SinkClosed)?;
        Ok(Dispatch::Sent)
    }
}
