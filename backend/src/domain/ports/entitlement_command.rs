//! Driving port for billing-driven entitlement updates.

use async_trait::async_trait;

use crate::domain::{EntitlementUpdate, Error, Subscriber};

/// Applies entitlement updates pushed by the billing provider.
#[async_trait]
pub trait EntitlementCommand: Send + Sync {
    /// Upsert the subscriber keyed by the update's email.
    ///
    /// Applying the same update twice leaves the same state as applying it
    /// once.
    async fn apply(&self, update: &EntitlementUpdate) -> Result<Subscriber, Error>;
}
