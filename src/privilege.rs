// src/privilege.rs

//! Startup check for the capabilities fanotify needs.
//!
//! `fanotify_init` with `FAN_REPORT_FID` needs `CAP_SYS_ADMIN`, and
//! `open_by_handle_at` needs `CAP_DAC_READ_SEARCH`. Without the second one
//! every single event would fail to resolve, so both are checked up front.

use std::fs;

use tracing::debug;

use crate::abi::{CAP_DAC_READ_SEARCH, CAP_SYS_ADMIN};
use crate::errors::WatchError;

const STATUS_PATH: &str = "/proc/self/status";

/// Parse the `CapEff:` line of a `/proc/<pid>/status` document.
pub fn parse_effective_caps(status: &str) -> Option<u64> {
    status
        .lines()
        .find_map(|line| line.strip_prefix("CapEff:"))
        .and_then(|hex| u64::from_str_radix(hex.trim(), 16).ok())
}

pub fn has_capability(caps: u64, cap: u32) -> bool {
    caps & (1u64 << cap) != 0
}

/// Names of the required capabilities missing from `caps`.
pub fn missing_capabilities(caps: u64) -> Vec<&'static str> {
    [
        (CAP_SYS_ADMIN, "CAP_SYS_ADMIN"),
        (CAP_DAC_READ_SEARCH, "CAP_DAC_READ_SEARCH"),
    ]
    .into_iter()
    .filter(|(cap, _)| !has_capability(caps, *cap))
    .map(|(_, name)| name)
    .collect()
}

/// Fail with [`WatchError::MissingPrivilege`] unless the process holds every
/// capability the watcher needs.
pub fn ensure_privileges() -> Result<(), WatchError> {
    let status = fs::read_to_string(STATUS_PATH).map_err(WatchError::Init)?;
    let caps = parse_effective_caps(&status).ok_or_else(|| {
        WatchError::MissingPrivilege(format!("no CapEff line in {STATUS_PATH}"))
    })?;
    debug!(cap_eff = format_args!("{caps:#x}"), "effective capabilities");

    let missing = missing_capabilities(caps);
    if !missing.is_empty() {
        return Err(WatchError::MissingPrivilege(format!(
            "process lacks {} (run as root or grant the capabilities)",
            missing.join(", ")
        )));
    }
    Ok(())
}
