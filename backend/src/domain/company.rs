//! Company (tenant) primitives.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::slug::{is_valid_slug, slugify};

/// Maximum company name length in characters.
pub const COMPANY_NAME_MAX: usize = 100;

/// Validation errors for company names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompanyValidationError {
    /// Name was blank once trimmed.
    EmptyName,
    /// Name exceeded [`COMPANY_NAME_MAX`] characters.
    NameTooLong { max: usize },
    /// Name produced an empty slug.
    UnsluggableName,
}

impl fmt::Display for CompanyValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "company name must not be empty"),
            Self::NameTooLong { max } => {
                write!(f, "company name must be at most {max} characters")
            }
            Self::UnsluggableName => write!(
                f,
                "company name must contain at least one letter, digit, or hyphen",
            ),
        }
    }
}

impl std::error::Error for CompanyValidationError {}

/// Stable company identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompanyId(Uuid);

impl CompanyId {
    /// Generate a fresh random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trimmed company display name that is guaranteed to yield a valid slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyName(String);

impl CompanyName {
    /// Validate and construct a company name.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, CompanyValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(CompanyValidationError::EmptyName);
        }
        if trimmed.chars().count() > COMPANY_NAME_MAX {
            return Err(CompanyValidationError::NameTooLong {
                max: COMPANY_NAME_MAX,
            });
        }
        if !is_valid_slug(&slugify(trimmed)) {
            return Err(CompanyValidationError::UnsluggableName);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Slug derived from this name.
    pub fn slug(&self) -> String {
        slugify(&self.0)
    }
}

impl AsRef<str> for CompanyName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Company record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Company {
    /// Stable identifier.
    pub id: CompanyId,
    /// Display name as entered at registration.
    pub name: String,
    /// Slug derived from `name` at creation time.
    pub slug: String,
}

impl Company {
    /// Create a new company with a fresh id and derived slug.
    pub fn create(name: &CompanyName) -> Self {
        Self {
            id: CompanyId::random(),
            name: name.as_ref().to_owned(),
            slug: name.slug(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn company_slug_follows_name() {
        let name = CompanyName::new("  Acme Corp ").expect("valid name");
        let company = Company::create(&name);
        assert_eq!(company.name, "Acme Corp");
        assert_eq!(company.slug, "acme-corp");
    }

    #[rstest]
    #[case("", CompanyValidationError::EmptyName)]
    #[case("   ", CompanyValidationError::EmptyName)]
    #[case("!!!", CompanyValidationError::UnsluggableName)]
    #[case("東京", CompanyValidationError::UnsluggableName)]
    fn rejects_invalid_names(#[case] raw: &str, #[case] expected: CompanyValidationError) {
        assert_eq!(CompanyName::new(raw), Err(expected));
    }

    #[rstest]
    fn rejects_overlong_names() {
        let raw = "a".repeat(COMPANY_NAME_MAX + 1);
        assert_eq!(
            CompanyName::new(raw),
            Err(CompanyValidationError::NameTooLong {
                max: COMPANY_NAME_MAX
            })
        );
    }
}
