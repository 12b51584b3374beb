//! Credential store services: registration, authentication, and account
//! re-hydration.
//!
//! Password hashing is moved onto blocking threads so Argon2 work never
//! stalls the async runtime.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{error, info};
use zeroize::Zeroizing;

use crate::domain::ports::{
    AccountQuery, AccountRepository, AccountRepositoryError, NewRegistration, PasswordHashError,
    PasswordHasher, RegistrationService,
};
use crate::domain::{
    Account, AccountDetails, AccountId, Company, Error, LoginCredentials, Profile, Registration,
    Role,
};

/// Message shared by every authentication failure.
pub const INVALID_CREDENTIALS: &str = "invalid credentials";
const EMAIL_TAKEN: &str = "email already registered";

/// Account service implementing registration and account lookups.
pub struct AccountService<R, H> {
    accounts: Arc<R>,
    hasher: Arc<H>,
    clock: Arc<dyn Clock>,
}

impl<R, H> AccountService<R, H> {
    /// Create a new service over the given store and hasher.
    pub fn new(accounts: Arc<R>, hasher: Arc<H>, clock: Arc<dyn Clock>) -> Self {
        Self {
            accounts,
            hasher,
            clock,
        }
    }
}

impl<R, H> AccountService<R, H>
where
    R: AccountRepository,
    H: PasswordHasher + 'static,
{
    fn map_repository_error(error: AccountRepositoryError) -> Error {
        match error {
            AccountRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("account repository unavailable: {message}"))
            }
            AccountRepositoryError::Query { message } => {
                Error::internal(format!("account repository error: {message}"))
            }
            AccountRepositoryError::DuplicateEmail { .. } => Error::conflict(EMAIL_TAKEN),
        }
    }

    async fn hash_password(&self, password: &str) -> Result<String, Error> {
        let hasher = Arc::clone(&self.hasher);
        let password = Zeroizing::new(password.to_owned());
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|err| Error::internal(format!("password hashing task failed: {err}")))?
            .map_err(|err| Error::internal(err.to_string()))
    }

    async fn verify_password(&self, password: &str, hash: Option<String>) -> Result<bool, Error> {
        let hasher = Arc::clone(&self.hasher);
        let password = Zeroizing::new(password.to_owned());
        let outcome = tokio::task::spawn_blocking(move || match hash {
            Some(stored) => hasher.verify(&password, &stored),
            None => {
                hasher.verify_against_dummy(&password);
                Ok(false)
            }
        })
        .await
        .map_err(|err| Error::internal(format!("password verification task failed: {err}")))?;

        match outcome {
            Ok(matched) => Ok(matched),
            Err(PasswordHashError::MalformedHash { message }) => {
                // A corrupt row reads as a mismatch.
                error!(%message, "stored password hash is unreadable");
                Ok(false)
            }
            Err(err) => Err(Error::internal(err.to_string())),
        }
    }

    /// Check credentials and return the matching account.
    ///
    /// Unknown emails still run a full verification against a dummy hash,
    /// and both failure modes return the same `unauthorized` error.
    pub async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Account, Error> {
        let stored = self
            .accounts
            .find_credentials_by_email(credentials.email())
            .await
            .map_err(Self::map_repository_error)?;

        let (account, hash) = match stored {
            Some(found) => (Some(found.account), Some(found.password_hash)),
            None => (None, None),
        };
        let matched = self.verify_password(credentials.password(), hash).await?;

        match (matched, account) {
            (true, Some(account)) => Ok(account),
            _ => Err(Error::unauthorized(INVALID_CREDENTIALS)),
        }
    }
}

#[async_trait]
impl<R, H> RegistrationService for AccountService<R, H>
where
    R: AccountRepository,
    H: PasswordHasher + 'static,
{
    async fn register(&self, registration: &Registration) -> Result<Account, Error> {
        let existing = self
            .accounts
            .find_by_email(registration.email())
            .await
            .map_err(Self::map_repository_error)?;
        if existing.is_some() {
            return Err(Error::conflict(EMAIL_TAKEN));
        }

        let password_hash = self.hash_password(registration.password()).await?;
        let now = self.clock.utc();
        let account = Account {
            id: AccountId::random(),
            email: registration.email().clone(),
            created_at: now,
            updated_at: now,
        };
        let company = Company::create(registration.company_name());
        let profile = Profile {
            account_id: account.id,
            full_name: registration.full_name().as_ref().to_owned(),
            role: Role::Admin,
            company,
        };
        let record = NewRegistration {
            account,
            password_hash,
            profile,
        };

        self.accounts
            .create_registration(&record)
            .await
            .map_err(Self::map_repository_error)?;

        info!(
            account_id = %record.account.id,
            company_id = %record.profile.company.id,
            company_slug = %record.profile.company.slug,
            "account registered"
        );
        Ok(record.account)
    }
}

#[async_trait]
impl<R, H> AccountQuery for AccountService<R, H>
where
    R: AccountRepository,
    H: PasswordHasher + 'static,
{
    async fn account_details(&self, id: &AccountId) -> Result<AccountDetails, Error> {
        self.accounts
            .find_details(id)
            .await
            .map_err(Self::map_repository_error)?
            .ok_or_else(|| Error::not_found("account not found"))
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
