//! Driving port for bearer token verification.

use crate::domain::{AuthenticatedIdentity, Error, SessionToken};

/// Verifies presented tokens without touching storage.
pub trait TokenVerifier: Send + Sync {
    /// Return the identity bound into `token`, or `unauthorized` when the
    /// token is malformed, tampered with, or expired.
    fn verify(&self, token: &SessionToken) -> Result<AuthenticatedIdentity, Error>;
}
