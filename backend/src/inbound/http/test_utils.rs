//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use mockable::Clock;

use crate::inbound::http::error::json_config;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::webhook_signature::WebhookVerifier;
use crate::inbound::http::{auth, entitlement};
use crate::outbound::crypto::{Argon2PasswordHasher, Argon2Settings, JwtTokenSigner};
use crate::outbound::memory::{InMemoryAccountRepository, InMemorySubscriberRepository};
use crate::server::build_ports;

pub const TEST_TOKEN_SECRET: &[u8] = b"test-token-secret-with-32-bytes!";
pub const TEST_WEBHOOK_SECRET: &[u8] = b"test-webhook-secret";

/// Cheapest Argon2 parameters the crate accepts.
pub fn fast_argon2() -> Argon2Settings {
    Argon2Settings {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    }
}

/// Handler state over fresh in-memory stores.
pub fn in_memory_state(clock: Arc<dyn Clock>) -> HttpState {
    let hasher = Argon2PasswordHasher::new(fast_argon2()).expect("test Argon2 settings");
    let ports = build_ports(
        Arc::new(InMemoryAccountRepository::new()),
        Arc::new(InMemorySubscriberRepository::new()),
        Arc::new(hasher),
        Arc::new(JwtTokenSigner::new(TEST_TOKEN_SECRET)),
        clock,
    );
    HttpState::new(ports, WebhookVerifier::new(TEST_WEBHOOK_SECRET.to_vec()))
}

/// App exposing every account and entitlement route under `/api/v1`.
pub fn api_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .app_data(json_config())
        .service(
            web::scope("/api/v1")
                .service(auth::register)
                .service(auth::login)
                .service(auth::me)
                .service(entitlement::check_entitlement)
                .service(entitlement::update_entitlement),
        )
}
