//! Shared helpers for fanwatch integration tests.
//!
//! - [`records`]: byte-exact synthetic fanotify records.
//! - [`harness`]: drive a pipeline over a synthetic stream and collect
//!   everything it produced.

pub mod harness;
pub mod records;

use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Install a test subscriber once per test binary.
///
/// Output goes through the test writer, so it only shows for failing tests
/// (or with `--nocapture`). The filter comes from `FANWATCH_LOG`, falling
/// back to `warn` so dropped records are visible in failures.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("FANWATCH_LOG")
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}
