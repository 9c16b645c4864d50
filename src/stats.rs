// src/stats.rs

//! Counters for per-record outcomes.
//!
//! Per-event failures never surface through the return value of the watch
//! loop; this is where they can be observed. Counters are shared through an
//! `Arc` so another thread can read them while the loop is blocked.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::pipeline::Outcome;

#[derive(Debug, Default)]
pub struct EventStats {
    dispatched: AtomicU64,
    filtered: AtomicU64,
    skipped: AtomicU64,
    overflows: AtomicU64,
    decode_errors: AtomicU64,
    resolve_errors: AtomicU64,
}

/// Point-in-time copy of [`EventStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub dispatched: u64,
    pub filtered: u64,
    pub skipped: u64,
    pub overflows: u64,
    pub decode_errors: u64,
    pub resolve_errors: u64,
}

impl StatsSnapshot {
    /// Records that were read but produced no event because of an error.
    pub fn errors(&self) -> u64 {
        self.decode_errors + self.resolve_errors
    }
}

impl EventStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, outcome: &Outcome) {
        let counter = match outcome {
            Outcome::Dispatched(_) => &self.dispatched,
            Outcome::Filtered => &self.filtered,
            Outcome::Skipped(_) => &self.skipped,
            Outcome::Overflow => &self.overflows,
            Outcome::DecodeFailed(_) => &self.decode_errors,
            Outcome::ResolveFailed(_) => &self.resolve_errors,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            dispatched: self.dispatched.load(Ordering::Relaxed),
            filtered: self.filtered.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            overflows: self.overflows.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            resolve_errors: self.resolve_errors.load(Ordering::Relaxed),
        }
    }
}
