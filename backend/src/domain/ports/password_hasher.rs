//! Port for password hashing.
//!
//! Implementations are CPU-bound and synchronous; services move calls onto
//! blocking threads.

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashing adapters.
    pub enum PasswordHashError {
        /// Hashing failed.
        Hash { message: String } => "password hashing failed: {message}",
        /// The stored hash could not be parsed.
        MalformedHash { message: String } => "stored password hash is malformed: {message}",
    }
}

/// Salted, slow password hashing.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Hash `password` with a fresh salt, returning a self-describing string.
    fn hash(&self, password: &str) -> Result<String, PasswordHashError>;

    /// Check `password` against a hash previously returned by [`Self::hash`].
    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError>;

    /// Spend the same effort as [`Self::verify`] against a throwaway hash.
    ///
    /// Used when no account matches so response timing does not reveal
    /// whether an email is registered. Always reports a mismatch.
    fn verify_against_dummy(&self, password: &str);
}
