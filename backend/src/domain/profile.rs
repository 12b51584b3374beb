//! Profile linking an account to its company.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Account, AccountId, Company};

/// Maximum full name length in characters.
pub const FULL_NAME_MAX: usize = 100;

/// Validation errors for profile fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileValidationError {
    /// Full name was blank once trimmed.
    EmptyFullName,
    /// Full name exceeded [`FULL_NAME_MAX`] characters.
    FullNameTooLong { max: usize },
    /// Stored role label was not recognised.
    UnknownRole { value: String },
}

impl fmt::Display for ProfileValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyFullName => write!(f, "full name must not be empty"),
            Self::FullNameTooLong { max } => {
                write!(f, "full name must be at most {max} characters")
            }
            Self::UnknownRole { value } => write!(f, "unknown role '{value}'"),
        }
    }
}

impl std::error::Error for ProfileValidationError {}

/// Trimmed display name of the person behind an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullName(String);

impl FullName {
    /// Validate and construct a full name.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ProfileValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ProfileValidationError::EmptyFullName);
        }
        if trimmed.chars().count() > FULL_NAME_MAX {
            return Err(ProfileValidationError::FullNameTooLong { max: FULL_NAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for FullName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Role of an account within its company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Creator of the company.
    Admin,
    /// Any later member.
    Member,
}

impl Role {
    /// Storage label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }
}

impl TryFrom<&str> for Role {
    type Error = ProfileValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            other => Err(ProfileValidationError::UnknownRole {
                value: other.to_owned(),
            }),
        }
    }
}

/// Profile row tying one account to one company.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// Owning account.
    pub account_id: AccountId,
    /// Display name.
    pub full_name: String,
    /// Role within the company.
    pub role: Role,
    /// Company this profile belongs to.
    pub company: Company,
}

/// Account joined with its profile and company, as returned by `whoami`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountDetails {
    /// Account identity.
    pub account: Account,
    /// Profile, absent only for accounts created outside registration.
    pub profile: Option<Profile>,
}
