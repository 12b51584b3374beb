//! Account API port and the wire types it exchanges.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::SessionError;

/// Account summary as returned by register and login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Stable account identifier.
    pub id: Uuid,
    /// Normalised login email.
    pub email: String,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Last modification instant.
    pub updated_at: DateTime<Utc>,
}

/// Company a profile belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    /// Company identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// URL-safe label derived from the name.
    pub slug: String,
}

/// Profile attached to an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Person's name.
    pub full_name: String,
    /// Role within the company, e.g. `admin`.
    pub role: String,
    /// Owning company, when resolved.
    pub company: Option<Company>,
}

/// Account with its profile, as returned by `whoami`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountDetails {
    /// Account summary.
    #[serde(flatten)]
    pub account: Account,
    /// Profile, absent for accounts created without one.
    pub profile: Option<Profile>,
}

/// Subscription state of the signed-in account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entitlement {
    /// Active right now.
    pub subscribed: bool,
    /// Tier label, reported even after the subscription lapses.
    pub tier: Option<String>,
    /// End of the paid period.
    pub expiry: Option<DateTime<Utc>>,
    /// Seats counter.
    pub employee_count: u32,
}

/// Successful login.
#[derive(Clone)]
pub struct LoginOutcome {
    /// Bearer token for later calls.
    pub token: Zeroizing<String>,
    /// Account that signed in.
    pub account: Account,
}

impl std::fmt::Debug for LoginOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginOutcome")
            .field("token", &"<redacted>")
            .field("account", &self.account)
            .finish()
    }
}

/// Details for a new account.
#[derive(Clone)]
pub struct SignUp {
    /// Login email.
    pub email: String,
    /// Password, at least eight characters.
    pub password: Zeroizing<String>,
    /// Person's name.
    pub full_name: String,
    /// Company to create alongside the account.
    pub company_name: String,
}

impl SignUp {
    /// Collect sign-up fields.
    ///
    /// # Examples
    /// ```
    /// use tenantry_session::SignUp;
    ///
    /// let sign_up = SignUp::new("ann@acme.test", "pw123456", "Ann", "Acme");
    /// assert_eq!(sign_up.company_name, "Acme");
    /// ```
    #[must_use]
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        full_name: impl Into<String>,
        company_name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: Zeroizing::new(password.into()),
            full_name: full_name.into(),
            company_name: company_name.into(),
        }
    }
}

impl std::fmt::Debug for SignUp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignUp")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("full_name", &self.full_name)
            .field("company_name", &self.company_name)
            .finish()
    }
}

/// Remote account service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountApi: Send + Sync {
    /// Create an account. No token is issued.
    async fn register(&self, sign_up: &SignUp) -> Result<Account, SessionError>;

    /// Exchange credentials for a bearer token.
    async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, SessionError>;

    /// Resolve the account behind `token`.
    async fn whoami(&self, token: &str) -> Result<AccountDetails, SessionError>;

    /// Current entitlement of the account behind `token`.
    async fn check_entitlement(&self, token: &str) -> Result<Entitlement, SessionError>;
}
