//! Bearer session tokens and the identity they carry.
//!
//! Tokens are never stored server-side. A token is valid while its
//! signature checks out and the verifying clock is strictly before `exp`.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::{AccountId, EmailAddress};

/// Lifetime fixed into every token at issuance, in seconds (24 hours).
pub const TOKEN_LIFETIME_SECS: i64 = 24 * 60 * 60;

/// [`TOKEN_LIFETIME_SECS`] as a [`TimeDelta`].
pub fn token_lifetime() -> TimeDelta {
    TimeDelta::seconds(TOKEN_LIFETIME_SECS)
}

/// Opaque signed bearer token.
///
/// `Debug` output is redacted so tokens never reach logs by accident.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap a raw token string as received from a client or signer.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Raw token text for transmission.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// Claims signed into a token.
///
/// `iat` and `exp` are Unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Account id.
    pub sub: String,
    /// Normalised email at issuance time.
    pub email: String,
    /// Issued-at.
    pub iat: i64,
    /// Expiry.
    pub exp: i64,
}

impl TokenClaims {
    /// Claims for `identity` issued at `now`, expiring after [`token_lifetime`].
    pub fn issue(identity: &AuthenticatedIdentity, now: DateTime<Utc>) -> Self {
        let iat = now.timestamp();
        Self {
            sub: identity.account_id.to_string(),
            email: identity.email.to_string(),
            iat,
            exp: iat.saturating_add(TOKEN_LIFETIME_SECS),
        }
    }

    /// `true` while `now` is strictly before the expiry.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() < self.exp
    }

    /// Parse the identity back out of the claims, rejecting malformed shapes.
    pub fn identity(&self) -> Option<AuthenticatedIdentity> {
        let account_id = AccountId::new(&self.sub).ok()?;
        let email = EmailAddress::new(&self.email).ok()?;
        Some(AuthenticatedIdentity { account_id, email })
    }
}

/// Identity established by a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedIdentity {
    /// Account the token was issued for.
    pub account_id: AccountId,
    /// Email at issuance time.
    pub email: EmailAddress,
}
