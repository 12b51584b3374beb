//! Domain primitives, aggregates, and services.
//!
//! Purpose: define the strongly typed account, company, profile, token, and
//! entitlement model used by the HTTP and persistence adapters, plus the
//! services that implement the driving ports. Validation happens in the
//! constructors here, so adapters only ever hand the services well-formed
//! values.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - Account, Company, Profile: credential store records.
//! - TokenClaims, SessionToken: bearer token contents.
//! - Subscriber, Entitlement: billing state and its evaluation.

pub mod account;
pub mod account_service;
pub mod auth;
pub mod company;
pub mod entitlement;
pub mod entitlement_service;
pub mod error;
pub mod password_login;
pub mod ports;
pub mod profile;
pub mod session_token_service;
pub mod slug;
pub mod token;
pub mod trace_id;

pub use self::account::{Account, AccountId, AccountValidationError, EMAIL_MAX, EmailAddress};
pub use self::account_service::{AccountService, INVALID_CREDENTIALS};
pub use self::auth::{
    LoginCredentials, LoginValidationError, PASSWORD_MAX, PASSWORD_MIN, Registration,
    RegistrationValidationError,
};
pub use self::company::{
    COMPANY_NAME_MAX, Company, CompanyId, CompanyName, CompanyValidationError,
};
pub use self::entitlement::{
    Entitlement, EntitlementUpdate, EntitlementValidationError, Subscriber, TIER_MAX,
};
pub use self::entitlement_service::EntitlementService;
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::password_login::PasswordLoginService;
pub use self::profile::{
    AccountDetails, FULL_NAME_MAX, FullName, Profile, ProfileValidationError, Role,
};
pub use self::session_token_service::SessionTokenService;
pub use self::slug::slugify;
pub use self::token::{
    AuthenticatedIdentity, SessionToken, TOKEN_LIFETIME_SECS, TokenClaims, token_lifetime,
};
pub use self::trace_id::TraceId;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use tenantry::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::unauthorized("missing bearer token"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
