//! Subscription state and the entitlement derived from it.
//!
//! A [`Subscriber`] is keyed canonically by email and optionally linked to an
//! account. Whether it is currently active is never stored: it is recomputed
//! against the clock on every read via [`Entitlement::resolve`].

use std::fmt;

use chrono::{DateTime, Utc};

use super::{AccountId, EmailAddress};

/// Maximum tier label length in characters.
pub const TIER_MAX: usize = 64;

/// Validation errors for entitlement updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntitlementValidationError {
    /// Tier label was present but blank.
    EmptyTier,
    /// Tier label exceeded [`TIER_MAX`] characters.
    TierTooLong { max: usize },
}

impl fmt::Display for EntitlementValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTier => write!(f, "tier must not be blank when provided"),
            Self::TierTooLong { max } => write!(f, "tier must be at most {max} characters"),
        }
    }
}

impl std::error::Error for EntitlementValidationError {}

/// Stored subscription record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscriber {
    /// Canonical key.
    pub email: EmailAddress,
    /// Secondary link to an account, when known.
    pub account_id: Option<AccountId>,
    /// Raw flag as last written by billing.
    pub subscribed: bool,
    /// Tier label, e.g. `Premium`.
    pub tier: Option<String>,
    /// End of the paid period, if bounded.
    pub expires_at: Option<DateTime<Utc>>,
    /// External billing reference.
    pub billing_ref: Option<String>,
    /// Seats counter.
    pub employee_count: u32,
    /// Last write.
    pub updated_at: DateTime<Utc>,
}

/// Entitlement as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entitlement {
    /// Active right now.
    pub subscribed: bool,
    /// Tier label as stored, reported even when the subscription has lapsed.
    pub tier: Option<String>,
    /// End of the paid period, if bounded.
    pub expires_at: Option<DateTime<Utc>>,
    /// Seats counter.
    pub employee_count: u32,
}

impl Entitlement {
    /// Entitlement for callers with no subscriber record.
    pub fn none() -> Self {
        Self {
            subscribed: false,
            tier: None,
            expires_at: None,
            employee_count: 0,
        }
    }

    /// Evaluate `subscriber` at `now`.
    ///
    /// Active means the stored flag is set and either there is no expiry or
    /// `now` is strictly before it.
    ///
    /// # Examples
    /// ```
    /// use chrono::{TimeDelta, Utc};
    /// use tenantry::domain::{EmailAddress, Entitlement, Subscriber};
    ///
    /// let now = Utc::now();
    /// let lapsed = Subscriber {
    ///     email: EmailAddress::new("a@x.com").unwrap(),
    ///     account_id: None,
    ///     subscribed: true,
    ///     tier: Some("Premium".into()),
    ///     expires_at: Some(now - TimeDelta::days(1)),
    ///     billing_ref: None,
    ///     employee_count: 0,
    ///     updated_at: now,
    /// };
    /// assert!(!Entitlement::resolve(Some(&lapsed), now).subscribed);
    /// ```
    pub fn resolve(subscriber: Option<&Subscriber>, now: DateTime<Utc>) -> Self {
        let Some(record) = subscriber else {
            return Self::none();
        };
        let unexpired = record.expires_at.is_none_or(|end| now < end);
        Self {
            subscribed: record.subscribed && unexpired,
            tier: record.tier.clone(),
            expires_at: record.expires_at,
            employee_count: record.employee_count,
        }
    }
}

/// Billing-driven update to a subscriber, applied as an idempotent upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitlementUpdate {
    /// Canonical key.
    pub email: EmailAddress,
    /// Account link; `None` keeps whatever link already exists.
    pub account_id: Option<AccountId>,
    /// New raw flag.
    pub subscribed: bool,
    /// New tier label.
    pub tier: Option<String>,
    /// New expiry.
    pub expires_at: Option<DateTime<Utc>>,
    /// New billing reference.
    pub billing_ref: Option<String>,
}

impl EntitlementUpdate {
    /// Normalise the tier label, rejecting blank or overlong values.
    pub fn normalise_tier(tier: Option<&str>) -> Result<Option<String>, EntitlementValidationError> {
        let Some(raw) = tier else {
            return Ok(None);
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(EntitlementValidationError::EmptyTier);
        }
        if trimmed.chars().count() > TIER_MAX {
            return Err(EntitlementValidationError::TierTooLong { max: TIER_MAX });
        }
        Ok(Some(trimmed.to_owned()))
    }
}
