//! Error types for control-plane operations.

use std::time::Duration;

use thiserror::Error;

/// Error type for HTTP operations.
///
/// Describes what went wrong without dictating recovery strategy.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network connection failed.
    ///
    /// This includes DNS resolution failures, connection refused,
    /// and other network-level errors.
    #[error("Connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Request timed out.
    #[error("Request timed out")]
    Timeout,

    /// The provided URL is invalid.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Error codes the control plane uses for a missing target resource.
const NOT_FOUND_CODES: [&str; 2] = ["ResourceNotFound", "NotFound"];

/// Error codes for a missing subscription, resource group or parent.
///
/// These come with a 404 too, but mean the scope is wrong rather than the
/// resource being gone.
const SCOPE_NOT_FOUND_CODES: [&str; 3] = [
    "ResourceGroupNotFound",
    "SubscriptionNotFound",
    "ParentResourceNotFound",
];

/// Returns true if `code` names a missing subscription, resource group or parent.
pub(crate) fn is_scope_not_found_code(code: &str) -> bool {
    SCOPE_NOT_FOUND_CODES.contains(&code)
}

/// Error type for control-plane calls and long-running operations.
///
/// Not-found is a distinct variant because teardown paths treat it as
/// success; see [`ArmError::is_not_found`].
#[derive(Debug, Error)]
pub enum ArmError {
    /// The request never produced a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] HttpError),

    /// No bearer token could be obtained.
    #[error("Failed to acquire access token: {0}")]
    Credential(String),

    /// The target resource does not exist (HTTP 404).
    #[error("Resource not found ({code}): {message}")]
    NotFound {
        /// Control-plane error code
        code: String,
        /// Control-plane error message
        message: String,
    },

    /// The control plane rejected the request.
    #[error("Control plane returned {status} ({code}): {message}")]
    Status {
        /// HTTP status code
        status: http::StatusCode,
        /// Control-plane error code
        code: String,
        /// Control-plane error message
        message: String,
    },

    /// A long-running operation reached a terminal failure state.
    #[error("Operation ended with status {status} ({code}): {message}")]
    OperationFailed {
        /// Terminal status, e.g. `Failed` or `Canceled`
        status: String,
        /// Control-plane error code
        code: String,
        /// Control-plane error message
        message: String,
    },

    /// A long-running operation did not reach a terminal state in time.
    #[error("Operation did not complete within {}s", timeout.as_secs())]
    OperationTimedOut {
        /// The configured wait limit
        timeout: Duration,
    },

    /// A response body could not be (de)serialized.
    #[error("Failed to decode control-plane payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// The response was well-formed HTTP but violated the control-plane protocol.
    #[error("Invalid control-plane response: {0}")]
    InvalidResponse(String),

    /// A request URL could not be built from the configured scope.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ArmError {
    /// Returns true if the error means the resource does not exist.
    ///
    /// Covers a 404 on the initial call as well as an operation that
    /// failed with a not-found error code while being polled.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::OperationFailed { code, .. } | Self::Status { code, .. } => {
                NOT_FOUND_CODES.contains(&code.as_str())
            }
            _ => false,
        }
    }

    /// Creates a `NotFound` error.
    #[must_use]
    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFound {
            code: code.into(),
            message: message.into(),
        }
    }
}
