//! Port for the credential store: accounts, companies, and profiles.
//!
//! Registration writes all three records as one atomic unit. Email
//! uniqueness is enforced by the store itself; adapters report a losing
//! concurrent insert as [`AccountRepositoryError::DuplicateEmail`].

use async_trait::async_trait;

use crate::domain::{Account, AccountDetails, AccountId, EmailAddress, Profile};

use super::define_port_error;

define_port_error! {
    /// Errors raised by credential store adapters.
    pub enum AccountRepositoryError {
        /// Store connection could not be established.
        Connection { message: String } => "account repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "account repository query failed: {message}",
        /// An account with this email already exists.
        DuplicateEmail { email: String } => "email already registered: {email}",
    }
}

/// Records written together when an account registers.
#[derive(Debug, Clone)]
pub struct NewRegistration {
    /// Account row.
    pub account: Account,
    /// PHC-format password hash.
    pub password_hash: String,
    /// Profile row, including the newly created company.
    pub profile: Profile,
}

/// Account plus its stored password hash, used only for authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    /// Account identity.
    pub account: Account,
    /// PHC-format password hash.
    pub password_hash: String,
}

/// Credential store port.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Insert account, company, and profile atomically.
    ///
    /// Nothing is written when the email is already taken.
    async fn create_registration(
        &self,
        registration: &NewRegistration,
    ) -> Result<(), AccountRepositoryError>;

    /// Fetch credentials by normalised email.
    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<StoredCredentials>, AccountRepositoryError>;

    /// Fetch an account by email without its credentials.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Account>, AccountRepositoryError>;

    /// Fetch an account joined with its profile and company.
    async fn find_details(
        &self,
        id: &AccountId,
    ) -> Result<Option<AccountDetails>, AccountRepositoryError>;
}
