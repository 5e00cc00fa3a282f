//! Bearer token acquisition.
//!
//! Token lifecycle (refresh, managed identity, service principals) belongs
//! to the caller; the control-plane client only asks for a current token
//! before each request.

use std::fmt;
use std::future::Future;

use super::ArmError;

/// An opaque bearer token.
///
/// The `Debug` implementation never exposes the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wraps a raw token string.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Returns the raw token for the `Authorization` header.
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.0
    }

    /// Returns true if the token is empty or whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<REDACTED>)")
    }
}

/// Source of bearer tokens scoped to the management endpoint.
pub trait TokenCredential: Send + Sync {
    /// Returns a token valid for the next request.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::Credential`] if no token can be produced.
    fn token(&self) -> impl Future<Output = Result<AccessToken, ArmError>> + Send;
}

/// A pre-acquired token that is returned as-is.
#[derive(Debug, Clone)]
pub struct StaticTokenCredential {
    token: AccessToken,
}

impl StaticTokenCredential {
    /// Creates a credential that always returns `token`.
    #[must_use]
    pub const fn new(token: AccessToken) -> Self {
        Self { token }
    }
}

impl TokenCredential for StaticTokenCredential {
    async fn token(&self) -> Result<AccessToken, ArmError> {
        if self.token.is_blank() {
            return Err(ArmError::Credential("access token is empty".to_string()));
        }
        Ok(self.token.clone())
    }
}
