//! Driving port for login.
//!
//! Inbound adapters call it to exchange credentials for a bearer token
//! without knowing how passwords are stored or tokens are signed.

use async_trait::async_trait;

use crate::domain::{Account, Error, LoginCredentials, SessionToken};

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// Freshly issued bearer token.
    pub token: SessionToken,
    /// Authenticated account.
    pub account: Account,
}

/// Domain use-case port for authentication.
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and issue a token.
    ///
    /// Unknown emails and wrong passwords fail identically.
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginOutcome, Error>;
}
