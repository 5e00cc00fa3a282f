//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

use std::time::Duration;

/// Default delay between operation polls in seconds.
pub const POLL_INTERVAL_SECS: u64 = 5;

/// Default upper bound for any delay between polls in seconds.
pub const MAX_POLL_INTERVAL_SECS: u64 = 60;

/// Default limit for a single long-running operation in seconds.
pub const OPERATION_TIMEOUT_SECS: u64 = 15 * 60;

/// Default timeout for a single HTTP request in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Environment variable consulted for the bearer token.
pub const TOKEN_ENV: &str = "ARM_ACCESS_TOKEN";

/// Default path written by `node-pip init`.
pub const CONFIG_FILE: &str = "node-pip.toml";

/// Default request timeout as Duration.
#[must_use]
pub const fn request_timeout() -> Duration {
    Duration::from_secs(REQUEST_TIMEOUT_SECS)
}
