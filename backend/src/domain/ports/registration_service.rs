//! Driving port for account registration.

use async_trait::async_trait;

use crate::domain::{Account, Error, Registration};

/// Domain use-case port for creating accounts.
#[async_trait]
pub trait RegistrationService: Send + Sync {
    /// Create the account, its company, and an `admin` profile.
    ///
    /// Fails with a conflict when the email is already registered.
    async fn register(&self, registration: &Registration) -> Result<Account, Error>;
}
