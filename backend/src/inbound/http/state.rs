//! Shared HTTP adapter state.
//!
//! Handlers receive this via `actix_web::web::Data` so they only depend on
//! domain ports and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AccountQuery, EntitlementCommand, EntitlementQuery, LoginService, RegistrationService,
    TokenVerifier,
};

use super::webhook_signature::WebhookVerifier;

/// Parameter object bundling the driving ports used by handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub registration: Arc<dyn RegistrationService>,
    pub login: Arc<dyn LoginService>,
    pub tokens: Arc<dyn TokenVerifier>,
    pub accounts: Arc<dyn AccountQuery>,
    pub entitlements: Arc<dyn EntitlementQuery>,
    pub entitlement_updates: Arc<dyn EntitlementCommand>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub registration: Arc<dyn RegistrationService>,
    pub login: Arc<dyn LoginService>,
    pub tokens: Arc<dyn TokenVerifier>,
    pub accounts: Arc<dyn AccountQuery>,
    pub entitlements: Arc<dyn EntitlementQuery>,
    pub entitlement_updates: Arc<dyn EntitlementCommand>,
    pub webhook: Arc<WebhookVerifier>,
}

impl HttpState {
    /// Combine the port bundle with the billing webhook verifier.
    pub fn new(ports: HttpStatePorts, webhook: WebhookVerifier) -> Self {
        let HttpStatePorts {
            registration,
            login,
            tokens,
            accounts,
            entitlements,
            entitlement_updates,
        } = ports;
        Self {
            registration,
            login,
            tokens,
            accounts,
            entitlements,
            entitlement_updates,
            webhook: Arc::new(webhook),
        }
    }
}
