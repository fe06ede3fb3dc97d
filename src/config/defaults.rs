//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

use std::time::Duration;

/// Socket (read) timeout for Dynatrace requests, in seconds.
pub const SOCKET_TIMEOUT_SECS: u64 = 60;

/// Path of the events API, appended to the Dynatrace base URL.
pub const EVENTS_PATH: &str = "/api/v1/events";

/// File name written by `init` when no output path is given.
pub const CONFIG_FILE_NAME: &str = "dynatrace-notify.toml";

/// Default socket timeout as Duration.
#[must_use]
pub const fn socket_timeout() -> Duration {
    Duration::from_secs(SOCKET_TIMEOUT_SECS)
}
