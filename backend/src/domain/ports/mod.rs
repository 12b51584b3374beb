//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`PasswordHasher`], [`TokenSigner`]) are
//! implemented by outbound adapters. Driving ports are implemented by domain
//! services and called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod account_query;
mod account_repository;
mod entitlement_command;
mod entitlement_query;
mod login_service;
mod password_hasher;
mod registration_service;
mod subscriber_repository;
mod token_signer;
mod token_verifier;

pub use account_query::AccountQuery;
#[cfg(test)]
pub use account_repository::MockAccountRepository;
pub use account_repository::{
    AccountRepository, AccountRepositoryError, NewRegistration, StoredCredentials,
};
pub use entitlement_command::EntitlementCommand;
pub use entitlement_query::EntitlementQuery;
pub use login_service::{LoginOutcome, LoginService};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
pub use registration_service::RegistrationService;
#[cfg(test)]
pub use subscriber_repository::MockSubscriberRepository;
pub use subscriber_repository::{SubscriberRepository, SubscriberRepositoryError};
#[cfg(test)]
pub use token_signer::MockTokenSigner;
pub use token_signer::{TokenSigner, TokenSignerError};
pub use token_verifier::TokenVerifier;
