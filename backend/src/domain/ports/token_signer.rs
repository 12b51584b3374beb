//! Port for signing and decoding session tokens.
//!
//! Signers only guarantee integrity. Expiry is judged by the caller against
//! its own clock.

use crate::domain::{SessionToken, TokenClaims};

use super::define_port_error;

define_port_error! {
    /// Errors raised by token signing adapters.
    pub enum TokenSignerError {
        /// Claims could not be signed.
        Signing { message: String } => "token signing failed: {message}",
        /// Token was structurally invalid or its signature did not match.
        Rejected { message: String } => "token rejected: {message}",
    }
}

/// Token integrity port.
#[cfg_attr(test, mockall::automock)]
pub trait TokenSigner: Send + Sync {
    /// Sign `claims` into an opaque token.
    fn sign(&self, claims: &TokenClaims) -> Result<SessionToken, TokenSignerError>;

    /// Check the signature of `token` and return its claims.
    fn decode(&self, token: &SessionToken) -> Result<TokenClaims, TokenSignerError>;
}
