//! Time abstraction for testability.
//!
//! This module provides a [`Sleeper`] trait so the operation waiter can
//! pause between polls with real timers in production and skip delays
//! entirely in tests.

use std::future::Future;
use std::time::Duration;

/// Abstraction over asynchronous sleeping.
///
/// # Example
///
/// ```
/// use node_pip::time::{InstantSleeper, Sleeper};
/// use std::time::Duration;
///
/// # async fn example() {
/// // Returns immediately regardless of the requested duration
/// InstantSleeper.sleep(Duration::from_secs(30)).await;
/// # }
/// ```
pub trait Sleeper: Send + Sync {
    /// Suspends the current task for `duration`.
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Production sleeper backed by [`tokio::time::sleep`].
///
/// Honors tokio's paused clock, so `#[tokio::test(start_paused = true)]`
/// tests advance virtual time instead of waiting.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Sleeper that never waits.
///
/// Intended for tests that exercise polling loops without caring
/// about elapsed time.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantSleeper;

impl Sleeper for InstantSleeper {
    async fn sleep(&self, _duration: Duration) {}
}
