//! Port for subscriber persistence.
//!
//! Subscribers are keyed by email. Upserts are last-write-wins on every
//! field except the account link, which is only replaced when the update
//! supplies one.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{AccountId, EmailAddress, EntitlementUpdate, Subscriber};

use super::define_port_error;

define_port_error! {
    /// Errors raised by subscriber repository adapters.
    pub enum SubscriberRepositoryError {
        /// Store connection could not be established.
        Connection { message: String } =>
            "subscriber repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "subscriber repository query failed: {message}",
    }
}

/// Subscriber store port.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriberRepository: Send + Sync {
    /// Fetch the subscriber linked to `account_id`, if any.
    async fn find_by_account_id(
        &self,
        account_id: &AccountId,
    ) -> Result<Option<Subscriber>, SubscriberRepositoryError>;

    /// Fetch the subscriber keyed by `email`, if any.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Subscriber>, SubscriberRepositoryError>;

    /// Insert or update the subscriber for `update.email`, stamping `now`.
    ///
    /// Returns the record as stored after the write.
    async fn upsert(
        &self,
        update: &EntitlementUpdate,
        now: DateTime<Utc>,
    ) -> Result<Subscriber, SubscriberRepositoryError>;
}
