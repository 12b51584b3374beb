//! Driving port for entitlement checks.

use async_trait::async_trait;

use crate::domain::{AuthenticatedIdentity, Entitlement, Error};

/// Resolves the current subscription state of a caller.
#[async_trait]
pub trait EntitlementQuery: Send + Sync {
    /// Evaluate the caller's entitlement at the current instant.
    async fn check(&self, identity: &AuthenticatedIdentity) -> Result<Entitlement, Error>;
}
