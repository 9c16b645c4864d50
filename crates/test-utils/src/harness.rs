use std::io::Read;

use fanwatch::pipeline::{Outcome, Pipeline};
use fanwatch::resolve::mock::MockResolver;
use fanwatch::{ChangeEvent, PathFilter, StatsSnapshot, WatchError};
use tokio::sync::mpsc;

/// Everything observable after driving a pipeline to its end.
#[derive(Debug)]
pub struct Harvest {
    pub events: Vec<ChangeEvent>,
    pub outcomes: Vec<Outcome>,
    pub stats: StatsSnapshot,
    pub error: WatchError,
}

/// Run a pipeline over `reader` until it hits a fatal error (for a finite
/// synthetic stream, end of input), then collect what reached the sink.
///
/// Must be called outside an async runtime; the queue is sized so the
/// single-threaded loop never blocks on it.
pub fn drive<R: Read, F: PathFilter>(mut reader: R, resolver: MockResolver, filter: F) -> Harvest {
    let (tx, mut rx) = mpsc::channel::<ChangeEvent>(1024);
    let mut pipeline = Pipeline::new(resolver, filter, tx);
    let stats = pipeline.stats();

    let mut outcomes = Vec::new();
    let error = loop {
        match pipeline.process_next(&mut reader) {
            Ok(outcome) => outcomes.push(outcome),
            Err(err) => break err,
        }
    };
    drop(pipeline);

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }

    Harvest {
        events,
        outcomes,
        stats: stats.snapshot(),
        error,
    }
}
