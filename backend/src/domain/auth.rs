//! Authentication inputs: login credentials and registration requests.
//!
//! Inbound adapters build these from raw strings so services only see
//! validated values. Passwords are held in [`Zeroizing`] buffers and wiped on
//! drop.

use std::fmt;

use zeroize::Zeroizing;

use super::{
    AccountValidationError, CompanyName, CompanyValidationError, EmailAddress, FullName,
    ProfileValidationError,
};

/// Minimum password length for new accounts.
pub const PASSWORD_MIN: usize = 8;
/// Maximum password length accepted anywhere.
pub const PASSWORD_MAX: usize = 128;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Password was blank.
    EmptyPassword,
    /// Password exceeded [`PASSWORD_MAX`] characters.
    PasswordTooLong { max: usize },
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordTooLong { max } => {
                write!(f, "password must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials.
///
/// ## Invariants
/// - `email` is trimmed, lowercased, and non-empty. It is not required to be
///   a well-formed address: malformed emails simply never match an account,
///   so they fail like any other unknown email.
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use tenantry::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" Ann@X.com ", "pw123456").unwrap();
/// assert_eq!(creds.email(), "ann@x.com");
/// assert_eq!(creds.password(), "pw123456");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = email.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        if password.chars().count() > PASSWORD_MAX {
            return Err(LoginValidationError::PasswordTooLong { max: PASSWORD_MAX });
        }

        Ok(Self {
            email: normalized,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised email used for account lookups.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validation failures for a registration request, one per offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationValidationError {
    /// Email failed validation.
    Email(AccountValidationError),
    /// Password shorter than [`PASSWORD_MIN`].
    PasswordTooShort { min: usize },
    /// Password longer than [`PASSWORD_MAX`].
    PasswordTooLong { max: usize },
    /// Full name failed validation.
    FullName(ProfileValidationError),
    /// Company name failed validation.
    CompanyName(CompanyValidationError),
}

impl fmt::Display for RegistrationValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email(err) => err.fmt(f),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
            Self::PasswordTooLong { max } => {
                write!(f, "password must be at most {max} characters")
            }
            Self::FullName(err) => err.fmt(f),
            Self::CompanyName(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for RegistrationValidationError {}

/// Validated registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    email: EmailAddress,
    password: Zeroizing<String>,
    full_name: FullName,
    company_name: CompanyName,
}

impl Registration {
    /// Validate raw registration inputs. Fields are checked in order: email,
    /// password, full name, company name; the first failure is returned.
    pub fn try_from_parts(
        email: &str,
        password: &str,
        full_name: &str,
        company_name: &str,
    ) -> Result<Self, RegistrationValidationError> {
        let email = EmailAddress::new(email).map_err(RegistrationValidationError::Email)?;
        let length = password.chars().count();
        if length < PASSWORD_MIN {
            return Err(RegistrationValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        if length > PASSWORD_MAX {
            return Err(RegistrationValidationError::PasswordTooLong { max: PASSWORD_MAX });
        }
        let full_name = FullName::new(full_name).map_err(RegistrationValidationError::FullName)?;
        let company_name =
            CompanyName::new(company_name).map_err(RegistrationValidationError::CompanyName)?;

        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
            full_name,
            company_name,
        })
    }

    /// Normalised email.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Plaintext password, wiped when the registration is dropped.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Full name of the registering person.
    pub fn full_name(&self) -> &FullName {
        &self.full_name
    }

    /// Name of the company being created.
    pub fn company_name(&self) -> &CompanyName {
        &self.company_name
    }
}
