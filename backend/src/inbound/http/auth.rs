//! Account API handlers.
//!
//! ```text
//! POST /api/v1/auth/register {"email":"a@x.com","password":"pw123456","fullName":"Ann","companyName":"Acme"}
//! POST /api/v1/auth/login {"email":"a@x.com","password":"pw123456"}
//! GET /api/v1/auth/me
//! ```

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{
    Account, AccountDetails, AccountValidationError, CompanyValidationError, Error, ErrorCode,
    LoginCredentials, LoginValidationError, Profile, ProfileValidationError, Registration,
    RegistrationValidationError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::bearer::BearerIdentity;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{COMPANY_NAME, EMAIL, FULL_NAME, PASSWORD, field_error};

/// Request body for `POST /api/v1/auth/register`.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[schema(example = "ann@acme.test")]
    pub email: String,
    #[schema(example = "pw123456")]
    pub password: String,
    #[schema(example = "Ann Example")]
    pub full_name: String,
    #[schema(example = "Acme")]
    pub company_name: String,
}

/// Request body for `POST /api/v1/auth/login`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "ann@acme.test")]
    pub email: String,
    #[schema(example = "pw123456")]
    pub password: String,
}

/// Public view of an account. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    #[schema(value_type = String, format = Uuid)]
    pub id: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.to_string(),
            email: account.email.to_string(),
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

/// Response body for a successful login.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Bearer token valid for 24 hours.
    pub token: String,
    pub account: AccountResponse,
}

/// Company as shown inside a profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyResponse {
    #[schema(value_type = String, format = Uuid)]
    pub id: String,
    pub name: String,
    #[schema(example = "acme")]
    pub slug: String,
}

/// Profile attached to the current account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub full_name: String,
    #[schema(example = "admin")]
    pub role: String,
    pub company: CompanyResponse,
}

impl From<&Profile> for ProfileResponse {
    fn from(profile: &Profile) -> Self {
        Self {
            full_name: profile.full_name.clone(),
            role: profile.role.as_str().to_owned(),
            company: CompanyResponse {
                id: profile.company.id.to_string(),
                name: profile.company.name.clone(),
                slug: profile.company.slug.clone(),
            },
        }
    }
}

/// Response body for `GET /api/v1/auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    #[serde(flatten)]
    pub account: AccountResponse,
    pub profile: Option<ProfileResponse>,
}

impl From<&AccountDetails> for MeResponse {
    fn from(details: &AccountDetails) -> Self {
        Self {
            account: AccountResponse::from(&details.account),
            profile: details.profile.as_ref().map(ProfileResponse::from),
        }
    }
}

impl TryFrom<RegisterRequest> for Registration {
    type Error = RegistrationValidationError;

    fn try_from(value: RegisterRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(
            &value.email,
            &value.password,
            &value.full_name,
            &value.company_name,
        )
    }
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password)
    }
}

fn map_registration_validation_error(err: RegistrationValidationError) -> Error {
    let message = err.to_string();
    match err {
        RegistrationValidationError::Email(inner) => {
            let code = match inner {
                AccountValidationError::EmptyEmail => "empty_email",
                AccountValidationError::EmailTooLong { .. } => "email_too_long",
                AccountValidationError::InvalidEmail | AccountValidationError::InvalidId => {
                    "invalid_email"
                }
            };
            field_error(EMAIL, code, message)
        }
        RegistrationValidationError::PasswordTooShort { .. } => {
            field_error(PASSWORD, "password_too_short", message)
        }
        RegistrationValidationError::PasswordTooLong { .. } => {
            field_error(PASSWORD, "password_too_long", message)
        }
        RegistrationValidationError::FullName(inner) => {
            let code = match inner {
                ProfileValidationError::FullNameTooLong { .. } => "full_name_too_long",
                ProfileValidationError::EmptyFullName
                | ProfileValidationError::UnknownRole { .. } => "empty_full_name",
            };
            field_error(FULL_NAME, code, message)
        }
        RegistrationValidationError::CompanyName(inner) => {
            let code = match inner {
                CompanyValidationError::EmptyName => "empty_company_name",
                CompanyValidationError::NameTooLong { .. } => "company_name_too_long",
                CompanyValidationError::UnsluggableName => "invalid_company_name",
            };
            field_error(COMPANY_NAME, code, message)
        }
    }
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    let message = err.to_string();
    match err {
        LoginValidationError::EmptyEmail => field_error(EMAIL, "empty_email", message),
        LoginValidationError::EmptyPassword => field_error(PASSWORD, "empty_password", message),
        LoginValidationError::PasswordTooLong { .. } => {
            field_error(PASSWORD, "password_too_long", message)
        }
    }
}

/// Create an account, its company, and an admin profile.
///
/// Registration does not sign the caller in; clients follow up with a login.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AccountResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema),
        (status = 503, description = "Account store unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration =
        Registration::try_from(payload.into_inner()).map_err(map_registration_validation_error)?;
    let account = state.registration.register(&registration).await?;
    Ok(HttpResponse::Created().json(AccountResponse::from(&account)))
}

/// Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = LoginResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 503, description = "Account store unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<LoginResponse>> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let outcome = state.login.login(&credentials).await?;
    Ok(web::Json(LoginResponse {
        token: outcome.token.expose().to_owned(),
        account: AccountResponse::from(&outcome.account),
    }))
}

/// Current caller with profile and company.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current account", body = MeResponse),
        (status = 401, description = "Missing, invalid, or expired token", body = ErrorSchema),
        (status = 503, description = "Account store unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "whoami",
    security(("bearerAuth" = []))
)]
#[get("/auth/me")]
pub async fn me(
    state: web::Data<HttpState>,
    identity: BearerIdentity,
) -> ApiResult<web::Json<MeResponse>> {
    let identity = identity.into_inner();
    let details = state
        .accounts
        .account_details(&identity.account_id)
        .await
        .map_err(|err| {
            if err.code() == ErrorCode::NotFound {
                // A valid token for a vanished account is treated like a bad token.
                debug!(account_id = %identity.account_id, "token names unknown account");
                Error::unauthorized("invalid or expired token")
            } else {
                err
            }
        })?;
    Ok(web::Json(MeResponse::from(&details)))
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
