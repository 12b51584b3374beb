//! Wiring of outbound adapters into the driving ports used by handlers.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::info;

use crate::domain::ports::{AccountRepository, PasswordHasher, SubscriberRepository};
use crate::domain::{AccountService, EntitlementService, PasswordLoginService, SessionTokenService};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::inbound::http::webhook_signature::WebhookVerifier;
use crate::outbound::crypto::{Argon2PasswordHasher, JwtTokenSigner};
use crate::outbound::memory::{InMemoryAccountRepository, InMemorySubscriberRepository};
use crate::outbound::persistence::{DieselAccountRepository, DieselSubscriberRepository};

use super::ServerConfig;

/// Compose the domain services over the given stores.
///
/// The account store backs both the credential services and the
/// entitlement resolver's account linking.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use mockable::DefaultClock;
/// use tenantry::outbound::crypto::{Argon2PasswordHasher, Argon2Settings, JwtTokenSigner};
/// use tenantry::outbound::memory::{InMemoryAccountRepository, InMemorySubscriberRepository};
/// use tenantry::server::build_ports;
///
/// let hasher = Argon2PasswordHasher::new(Argon2Settings::default()).expect("valid settings");
/// let ports = build_ports(
///     Arc::new(InMemoryAccountRepository::new()),
///     Arc::new(InMemorySubscriberRepository::new()),
///     Arc::new(hasher),
///     Arc::new(JwtTokenSigner::new(b"example-secret")),
///     Arc::new(DefaultClock),
/// );
/// let _login = ports.login.clone();
/// ```
pub fn build_ports<R, S, H>(
    accounts: Arc<R>,
    subscribers: Arc<S>,
    hasher: Arc<H>,
    signer: Arc<JwtTokenSigner>,
    clock: Arc<dyn Clock>,
) -> HttpStatePorts
where
    R: AccountRepository + 'static,
    S: SubscriberRepository + 'static,
    H: PasswordHasher + 'static,
{
    let account_service = Arc::new(AccountService::new(
        Arc::clone(&accounts),
        hasher,
        Arc::clone(&clock),
    ));
    let tokens = Arc::new(SessionTokenService::new(signer, Arc::clone(&clock)));
    let login = Arc::new(PasswordLoginService::new(
        Arc::clone(&account_service),
        Arc::clone(&tokens),
    ));
    let entitlements = Arc::new(EntitlementService::new(subscribers, accounts, clock));

    HttpStatePorts {
        registration: account_service.clone(),
        login,
        tokens,
        accounts: account_service,
        entitlements: entitlements.clone(),
        entitlement_updates: entitlements,
    }
}

/// Build handler state from the server configuration.
///
/// Uses the Diesel adapters when a pool is configured, otherwise the
/// in-memory stores.
pub(crate) fn build_http_state(config: &ServerConfig) -> std::io::Result<HttpState> {
    let hasher = Arc::new(Argon2PasswordHasher::new(config.argon2).map_err(|err| {
        std::io::Error::other(format!("invalid Argon2 settings: {err}"))
    })?);
    let signer = Arc::new(JwtTokenSigner::new(&config.secrets.token_secret));
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

    let ports = match &config.db_pool {
        Some(pool) => build_ports(
            Arc::new(DieselAccountRepository::new(pool.clone())),
            Arc::new(DieselSubscriberRepository::new(pool.clone())),
            hasher,
            signer,
            clock,
        ),
        None => {
            info!("no database configured; accounts and subscribers are kept in memory");
            build_ports(
                Arc::new(InMemoryAccountRepository::new()),
                Arc::new(InMemorySubscriberRepository::new()),
                hasher,
                signer,
                clock,
            )
        }
    };

    let webhook = WebhookVerifier::new(config.secrets.webhook_secret.to_vec());
    Ok(HttpState::new(ports, webhook))
}
