//! In-process adapters used when no database is configured.
//!
//! State lives behind a single mutex per store, so registration stays
//! atomic and email uniqueness holds under concurrent requests. Nothing
//! survives a restart.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    AccountRepository, AccountRepositoryError, NewRegistration, StoredCredentials,
    SubscriberRepository, SubscriberRepositoryError,
};
use crate::domain::{
    Account, AccountDetails, AccountId, EmailAddress, EntitlementUpdate, Profile, Subscriber,
};

#[derive(Default)]
struct AccountState {
    by_email: HashMap<String, AccountId>,
    credentials: HashMap<AccountId, StoredCredentials>,
    profiles: HashMap<AccountId, Profile>,
}

/// Volatile [`AccountRepository`].
#[derive(Default)]
pub struct InMemoryAccountRepository {
    state: Mutex<AccountState>,
}

impl InMemoryAccountRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, AccountState>, AccountRepositoryError> {
        self.state
            .lock()
            .map_err(|_| AccountRepositoryError::query("account store lock poisoned"))
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn create_registration(
        &self,
        registration: &NewRegistration,
    ) -> Result<(), AccountRepositoryError> {
        let mut state = self.lock()?;
        let email = registration.account.email.as_ref();
        if state.by_email.contains_key(email) {
            return Err(AccountRepositoryError::duplicate_email(email));
        }

        let id = registration.account.id;
        state.by_email.insert(email.to_owned(), id);
        state.credentials.insert(
            id,
            StoredCredentials {
                account: registration.account.clone(),
                password_hash: registration.password_hash.clone(),
            },
        );
        state.profiles.insert(id, registration.profile.clone());
        Ok(())
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<StoredCredentials>, AccountRepositoryError> {
        let state = self.lock()?;
        Ok(state
            .by_email
            .get(email)
            .and_then(|id| state.credentials.get(id))
            .cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Account>, AccountRepositoryError> {
        Ok(self
            .find_credentials_by_email(email.as_ref())
            .await?
            .map(|stored| stored.account))
    }

    async fn find_details(
        &self,
        id: &AccountId,
    ) -> Result<Option<AccountDetails>, AccountRepositoryError> {
        let state = self.lock()?;
        Ok(state.credentials.get(id).map(|stored| AccountDetails {
            account: stored.account.clone(),
            profile: state.profiles.get(id).cloned(),
        }))
    }
}

/// Volatile [`SubscriberRepository`] keyed by email.
#[derive(Default)]
pub struct InMemorySubscriberRepository {
    store: Mutex<HashMap<String, Subscriber>>,
}

impl InMemorySubscriberRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<String, Subscriber>>, SubscriberRepositoryError> {
        self.store
            .lock()
            .map_err(|_| SubscriberRepositoryError::query("subscriber store lock poisoned"))
    }
}

#[async_trait]
impl SubscriberRepository for InMemorySubscriberRepository {
    async fn find_by_account_id(
        &self,
        account_id: &AccountId,
    ) -> Result<Option<Subscriber>, SubscriberRepositoryError> {
        let store = self.lock()?;
        Ok(store
            .values()
            .filter(|record| record.account_id.as_ref() == Some(account_id))
            .max_by_key(|record| record.updated_at)
            .cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Subscriber>, SubscriberRepositoryError> {
        Ok(self.lock()?.get(email.as_ref()).cloned())
    }

    async fn upsert(
        &self,
        update: &EntitlementUpdate,
        now: DateTime<Utc>,
    ) -> Result<Subscriber, SubscriberRepositoryError> {
        let mut store = self.lock()?;
        let record = store
            .entry(update.email.as_ref().to_owned())
            .or_insert_with(|| Subscriber {
                email: update.email.clone(),
                account_id: None,
                subscribed: false,
                tier: None,
                expires_at: None,
                billing_ref: None,
                employee_count: 0,
                updated_at: now,
            });

        if update.account_id.is_some() {
            record.account_id = update.account_id;
        }
        record.subscribed = update.subscribed;
        record.tier.clone_from(&update.tier);
        record.expires_at = update.expires_at;
        record.billing_ref.clone_from(&update.billing_ref);
        record.updated_at = now;
        Ok(record.clone())
    }
}
