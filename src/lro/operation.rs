//! Operation handles and the polling seam.

use std::future::Future;
use std::time::Duration;

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use url::Url;

use crate::arm::ArmError;

/// Result type of operations that produce no resource (delete, actions).
///
/// Deserializes from any payload, so a body returned by the final poll is
/// accepted and discarded. Serializes as `null`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NoContent;

impl<'de> Deserialize<'de> for NoContent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        IgnoredAny::deserialize(deserializer).map(|_| Self)
    }
}

/// How the control plane asked to be polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollMode {
    /// `Azure-AsyncOperation`: a status document with a `status` field.
    AsyncOperation,
    /// `Location`: `202` while running, the final result once done.
    Location,
}

/// Everything needed to poll a submitted operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollTarget {
    /// Polling protocol
    pub mode: PollMode,
    /// URL to poll
    pub status_url: Url,
    /// URL of the resource the operation acts on
    pub resource_url: Url,
    /// Method of the submitting request
    pub method: http::Method,
    /// Initial delay requested by the control plane
    pub retry_after: Option<Duration>,
}

/// Outcome of a single poll.
#[derive(Debug, Clone, PartialEq)]
pub enum PollStatus {
    /// Not terminal yet; poll again after the hinted delay, if any.
    InProgress {
        /// Delay requested by the control plane
        retry_after: Option<Duration>,
    },
    /// Terminal success, with the final resource when one is produced.
    Succeeded(Option<Value>),
}

/// Handle to a submitted mutation.
///
/// Either the control plane completed it synchronously, or it must be
/// polled through [`PollTarget`].
#[derive(Debug, Clone, PartialEq)]
pub struct Operation<T> {
    state: State<T>,
}

#[derive(Debug, Clone, PartialEq)]
enum State<T> {
    Done(Option<T>),
    Pending(PollTarget),
}

impl<T> Operation<T> {
    /// An operation that already reached a successful terminal state.
    #[must_use]
    pub const fn done(result: Option<T>) -> Self {
        Self {
            state: State::Done(result),
        }
    }

    /// An operation that must be polled.
    #[must_use]
    pub const fn pending(target: PollTarget) -> Self {
        Self {
            state: State::Pending(target),
        }
    }

    /// Returns true if no polling is required.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        matches!(self.state, State::Done(_))
    }

    /// The poll target of a pending operation.
    #[must_use]
    pub const fn poll_target(&self) -> Option<&PollTarget> {
        match &self.state {
            State::Done(_) => None,
            State::Pending(target) => Some(target),
        }
    }

    /// Splits the handle into its completed result or its poll target.
    ///
    /// # Errors
    ///
    /// Returns the poll target when the operation is still pending.
    pub fn into_result(self) -> Result<Option<T>, PollTarget> {
        match self.state {
            State::Done(result) => Ok(result),
            State::Pending(target) => Err(target),
        }
    }
}

/// Polls pending operations.
///
/// A terminal failure is reported as an error from [`poll`](Self::poll),
/// typically [`ArmError::OperationFailed`].
pub trait OperationPoller: Send + Sync {
    /// Performs one status check of `target`.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError`] if the status cannot be fetched or the operation
    /// ended in failure.
    fn poll(
        &self,
        target: &PollTarget,
    ) -> impl Future<Output = Result<PollStatus, ArmError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> PollTarget {
        PollTarget {
            mode: PollMode::AsyncOperation,
            status_url: Url::parse("https://management.azure.com/operations/1").unwrap(),
            resource_url: Url::parse("https://management.azure.com/resource").unwrap(),
            method: http::Method::PUT,
            retry_after: None,
        }
    }

    #[test]
    fn done_operation_yields_result() {
        let op = Operation::done(Some(7));
        assert!(op.is_done());
        assert!(op.poll_target().is_none());
        assert_eq!(op.into_result(), Ok(Some(7)));
    }

    #[test]
    fn pending_operation_yields_target() {
        let op: Operation<u8> = Operation::pending(target());
        assert!(!op.is_done());
        assert_eq!(op.poll_target(), Some(&target()));
        assert_eq!(op.into_result(), Err(target()));
    }

    #[test]
    fn no_content_accepts_any_payload() {
        for value in [
            serde_json::json!(null),
            serde_json::json!({"status": "Succeeded"}),
            serde_json::json!([1, 2]),
        ] {
            assert_eq!(serde_json::from_value::<NoContent>(value).unwrap(), NoContent);
        }
    }

    #[test]
    fn no_content_serializes_as_null() {
        assert_eq!(serde_json::to_value(NoContent).unwrap(), Value::Null);
    }
}
