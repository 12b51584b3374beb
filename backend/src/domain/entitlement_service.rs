//! Entitlement resolution and billing updates.
//!
//! Lookups go by account id first, then fall back to the caller's email so
//! billing events that arrived before the account was linked still count.
//! A billing update only links to an account that exists; an unknown
//! `accountId` is replaced by the account registered under the email, if any.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    AccountRepository, AccountRepositoryError, EntitlementCommand, EntitlementQuery,
    SubscriberRepository, SubscriberRepositoryError,
};
use crate::domain::{
    AccountId, AuthenticatedIdentity, Entitlement, EntitlementUpdate, Error, Subscriber,
};

/// Service implementing [`EntitlementQuery`] and [`EntitlementCommand`].
pub struct EntitlementService<S, A> {
    subscribers: Arc<S>,
    accounts: Arc<A>,
    clock: Arc<dyn Clock>,
}

impl<S, A> EntitlementService<S, A> {
    /// Create a new service.
    pub fn new(subscribers: Arc<S>, accounts: Arc<A>, clock: Arc<dyn Clock>) -> Self {
        Self {
            subscribers,
            accounts,
            clock,
        }
    }
}

fn map_subscriber_error(error: SubscriberRepositoryError) -> Error {
    match error {
        SubscriberRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("subscriber repository unavailable: {message}"))
        }
        SubscriberRepositoryError::Query { message } => {
            Error::internal(format!("subscriber repository error: {message}"))
        }
    }
}

fn map_account_error(error: AccountRepositoryError) -> Error {
    match error {
        AccountRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("account repository unavailable: {message}"))
        }
        other => Error::internal(format!("account repository error: {other}")),
    }
}

impl<S, A> EntitlementService<S, A>
where
    S: SubscriberRepository,
    A: AccountRepository,
{
    async fn find_subscriber(
        &self,
        identity: &AuthenticatedIdentity,
    ) -> Result<Option<Subscriber>, Error> {
        if let Some(linked) = self
            .subscribers
            .find_by_account_id(&identity.account_id)
            .await
            .map_err(map_subscriber_error)?
        {
            return Ok(Some(linked));
        }

        // A record linked to a different account must not leak across.
        let by_email = self
            .subscribers
            .find_by_email(&identity.email)
            .await
            .map_err(map_subscriber_error)?;
        Ok(by_email.filter(|record| {
            record
                .account_id
                .is_none_or(|linked| linked == identity.account_id)
        }))
    }

    /// Account the update should link to.
    async fn linked_account(
        &self,
        update: &EntitlementUpdate,
    ) -> Result<Option<AccountId>, Error> {
        if let Some(named) = update.account_id {
            let known = self
                .accounts
                .find_details(&named)
                .await
                .map_err(map_account_error)?
                .is_some();
            if known {
                return Ok(Some(named));
            }
            warn!(account_id = %named, "billing update names an unknown account");
        }

        Ok(self
            .accounts
            .find_by_email(&update.email)
            .await
            .map_err(map_account_error)?
            .map(|account| account.id))
    }
}

#[async_trait]
impl<S, A> EntitlementQuery for EntitlementService<S, A>
where
    S: SubscriberRepository,
    A: AccountRepository,
{
    async fn check(&self, identity: &AuthenticatedIdentity) -> Result<Entitlement, Error> {
        let subscriber = self.find_subscriber(identity).await?;
        Ok(Entitlement::resolve(subscriber.as_ref(), self.clock.utc()))
    }
}

#[async_trait]
impl<S, A> EntitlementCommand for EntitlementService<S, A>
where
    S: SubscriberRepository,
    A: AccountRepository,
{
    async fn apply(&self, update: &EntitlementUpdate) -> Result<Subscriber, Error> {
        let mut update = update.clone();
        update.account_id = self.linked_account(&update).await?;

        let stored = self
            .subscribers
            .upsert(&update, self.clock.utc())
            .await
            .map_err(map_subscriber_error)?;

        info!(
            email = %stored.email,
            account_id = ?stored.account_id,
            subscribed = stored.subscribed,
            tier = stored.tier.as_deref(),
            "entitlement updated"
        );
        Ok(stored)
    }
}

#[cfg(test)]
#[path = "entitlement_service_tests.rs"]
mod tests;
