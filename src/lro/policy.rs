//! Polling cadence for long-running operations.

use std::time::Duration;

/// Controls how often operations are polled and how long to wait overall.
///
/// The control plane's `Retry-After` hint takes precedence over
/// `interval`, but is never allowed to exceed `max_interval`.
///
/// # Defaults
///
/// - `interval`: 5 seconds
/// - `max_interval`: 60 seconds
/// - `timeout`: 15 minutes
///
/// # Example
///
/// ```
/// use node_pip::lro::PollPolicy;
/// use std::time::Duration;
///
/// let policy = PollPolicy::new()
///     .with_interval(Duration::from_secs(2))
///     .with_timeout(Some(Duration::from_secs(600)));
///
/// assert_eq!(policy.delay(None), Duration::from_secs(2));
/// assert_eq!(policy.delay(Some(Duration::from_secs(600))), Duration::from_secs(60));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between polls when the control plane gives no hint.
    pub interval: Duration,

    /// Upper bound for any delay between polls.
    pub max_interval: Duration,

    /// Overall limit for a single operation; `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl PollPolicy {
    /// Default poll interval (5 seconds).
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

    /// Default maximum poll interval (60 seconds).
    pub const DEFAULT_MAX_INTERVAL: Duration = Duration::from_secs(60);

    /// Default operation timeout (15 minutes).
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15 * 60);

    /// Creates a policy with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            interval: Self::DEFAULT_INTERVAL,
            max_interval: Self::DEFAULT_MAX_INTERVAL,
            timeout: Some(Self::DEFAULT_TIMEOUT),
        }
    }

    /// Sets the default delay between polls.
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the maximum delay between polls.
    #[must_use]
    pub const fn with_max_interval(mut self, max_interval: Duration) -> Self {
        self.max_interval = max_interval;
        self
    }

    /// Sets the overall timeout per operation.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Computes the delay before the next poll.
    #[must_use]
    pub fn delay(&self, retry_after: Option<Duration>) -> Duration {
        retry_after.unwrap_or(self.interval).min(self.max_interval)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new()
    }
}
