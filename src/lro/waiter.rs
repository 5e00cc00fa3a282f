//! Drives submitted operations to a terminal state.

use serde::de::DeserializeOwned;

use super::{Operation, OperationPoller, PollPolicy, PollStatus, PollTarget};
use crate::arm::ArmError;
use crate::time::{Sleeper, TokioSleeper};

/// Waits for long-running operations to finish.
///
/// There is no retry here: a failed operation is returned to the caller,
/// which decides whether to run the whole reconciliation again.
///
/// # Type Parameters
///
/// - `S`: The sleeper used between polls (defaults to [`TokioSleeper`])
#[derive(Debug, Clone)]
pub struct OperationWaiter<S = TokioSleeper> {
    policy: PollPolicy,
    sleeper: S,
}

impl OperationWaiter<TokioSleeper> {
    /// Creates a waiter with the given policy and real timers.
    #[must_use]
    pub const fn new(policy: PollPolicy) -> Self {
        Self {
            policy,
            sleeper: TokioSleeper,
        }
    }
}

impl Default for OperationWaiter<TokioSleeper> {
    fn default() -> Self {
        Self::new(PollPolicy::default())
    }
}

impl<S> OperationWaiter<S> {
    /// Sets a custom sleeper for poll delays.
    ///
    /// This is primarily useful for testing to avoid actual delays.
    #[must_use]
    pub fn with_sleeper<S2>(self, sleeper: S2) -> OperationWaiter<S2> {
        OperationWaiter {
            policy: self.policy,
            sleeper,
        }
    }

    /// Returns the configured poll policy.
    #[must_use]
    pub const fn policy(&self) -> &PollPolicy {
        &self.policy
    }
}

impl<S: Sleeper> OperationWaiter<S> {
    /// Waits until `operation` is terminal and returns its final resource.
    ///
    /// Completed operations return immediately without polling.
    ///
    /// # Errors
    ///
    /// - [`ArmError::OperationFailed`] if the operation ended in failure
    /// - [`ArmError::OperationTimedOut`] if the policy timeout elapsed
    /// - Any error returned by the poller or while decoding the result
    pub async fn wait<P, T>(&self, poller: &P, operation: Operation<T>) -> Result<Option<T>, ArmError>
    where
        P: OperationPoller,
        T: DeserializeOwned + Send,
    {
        let target = match operation.into_result() {
            Ok(result) => return Ok(result),
            Err(target) => target,
        };

        let Some(limit) = self.policy.timeout else {
            return self.poll_until_terminal(poller, &target).await;
        };

        tokio::time::timeout(limit, self.poll_until_terminal(poller, &target))
            .await
            .map_err(|_| {
                tracing::warn!(url = %target.status_url, "Operation timed out after {}s", limit.as_secs());
                ArmError::OperationTimedOut { timeout: limit }
            })?
    }

    async fn poll_until_terminal<P, T>(
        &self,
        poller: &P,
        target: &PollTarget,
    ) -> Result<Option<T>, ArmError>
    where
        P: OperationPoller,
        T: DeserializeOwned + Send,
    {
        let mut delay = self.policy.delay(target.retry_after);
        let mut polls: u32 = 0;

        loop {
            self.sleeper.sleep(delay).await;
            polls += 1;

            match poller.poll(target).await? {
                PollStatus::InProgress { retry_after } => {
                    delay = self.policy.delay(retry_after);
                    tracing::debug!(
                        url = %target.status_url,
                        polls,
                        "Operation still in progress, next poll in {}s",
                        delay.as_secs()
                    );
                }
                PollStatus::Succeeded(payload) => {
                    tracing::debug!(url = %target.status_url, polls, "Operation succeeded");
                    return payload
                        .map(serde_json::from_value)
                        .transpose()
                        .map_err(ArmError::from);
                }
            }
        }
    }
}
