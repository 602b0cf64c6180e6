//! Runtime tunables for the CLI host.
//!
//! Reveal timings live in [`reveal_session::RevealConfig`]; this module only
//! covers what the host itself decides. Every value can be overridden via an
//! environment variable.

use std::path::PathBuf;
use std::time::Duration;

/// Default delay before the console map reports ready (in milliseconds).
const DEFAULT_MOUNT_DELAY_MS: u64 = 250;

/// Default number of attempts per round before the host gives up.
const DEFAULT_REVEAL_ATTEMPTS: u32 = 3;

/// Get the directory for rolling log files.
///
/// Priority:
/// 1. `--log-dir` flag (handled by the caller)
/// 2. `MAPREVEAL_LOG_DIR` env variable if set
/// 3. `None`: logs go to stderr
pub fn get_log_dir() -> Option<PathBuf> {
    std::env::var_os("MAPREVEAL_LOG_DIR").map(PathBuf::from)
}

/// Get how long the console map takes to become ready.
///
/// Priority:
/// 1. `MAPREVEAL_MOUNT_DELAY_MS` env variable if set (falls back to default
///    if the value cannot be parsed as a `u64`)
/// 2. `250` milliseconds as fallback
pub fn get_mount_delay() -> Duration {
    let ms = std::env::var("MAPREVEAL_MOUNT_DELAY_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_MOUNT_DELAY_MS);
    Duration::from_millis(ms)
}

/// Get the number of reveal attempts per round.
///
/// Returns the fixed default of 3. Not currently overridable.
pub fn get_reveal_attempts() -> u32 {
    DEFAULT_REVEAL_ATTEMPTS
}
