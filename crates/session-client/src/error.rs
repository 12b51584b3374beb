//! Errors surfaced by the session client.

use std::time::Duration;

use crate::token_store::TokenStoreError;

/// Failure of a session operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The server answered with an error payload.
    #[error("{message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Machine-readable code from the payload, when present.
        code: Option<String>,
        /// Human-readable message from the payload.
        message: String,
    },
    /// The request never produced a response.
    #[error("could not reach the account service: {message}")]
    Transport {
        /// Transport failure description.
        message: String,
    },
    /// The server did not answer within the configured bound.
    #[error("the account service did not answer within {timeout:?}")]
    Timeout {
        /// Bound that was exceeded.
        timeout: Duration,
    },
    /// The response body did not have the expected shape.
    #[error("unexpected response from the account service: {message}")]
    Decode {
        /// Decoding failure description.
        message: String,
    },
    /// The operation needs a signed-in session.
    #[error("not signed in")]
    NotAuthenticated,
    /// The session was signed out or replaced while the call was in flight.
    #[error("the session changed before the operation completed")]
    Superseded,
    /// The token could not be persisted or read back.
    #[error(transparent)]
    TokenStore(#[from] TokenStoreError),
}

impl SessionError {
    /// Whether the server rejected the credentials or token.
    ///
    /// # Examples
    /// ```
    /// use tenantry_session::SessionError;
    ///
    /// let err = SessionError::Rejected {
    ///     status: 401,
    ///     code: Some("unauthorized".to_owned()),
    ///     message: "invalid credentials".to_owned(),
    /// };
    /// assert!(err.is_unauthorized());
    /// ```
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Rejected { status: 401, .. })
    }
}
