//! Driving port for reading the current account.

use async_trait::async_trait;

use crate::domain::{AccountDetails, AccountId, Error};

/// Re-hydrates account data after a token has been verified.
#[async_trait]
pub trait AccountQuery: Send + Sync {
    /// Load the account with its profile and company.
    ///
    /// Fails with `not_found` when the account no longer exists.
    async fn account_details(&self, id: &AccountId) -> Result<AccountDetails, Error>;
}
