//! Argon2id implementation of the `PasswordHasher` port.
//!
//! Hashes are stored in PHC string format, so each one carries its own salt
//! and cost parameters and stays verifiable after the settings change.

use argon2::{Algorithm, Argon2, Params, Version};
use password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString};
use rand::rngs::OsRng;
use rand::{Rng as _, distributions::Alphanumeric};

use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Settings {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Default for Argon2Settings {
    /// 19 MiB, two passes, one lane.
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Argon2id password hasher with a precomputed dummy hash for unknown
/// accounts.
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
    dummy_hash: String,
}

impl Argon2PasswordHasher {
    /// Build a hasher with `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`PasswordHashError::Hash`] when the parameters are out of
    /// range for Argon2.
    pub fn new(settings: Argon2Settings) -> Result<Self, PasswordHashError> {
        let params = Params::new(
            settings.memory_kib,
            settings.iterations,
            settings.parallelism,
            None,
        )
        .map_err(|err| PasswordHashError::hash(format!("invalid argon2 parameters: {err}")))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let throwaway: String = OsRng
            .sample_iter(&Alphanumeric)
            .take(24)
            .map(char::from)
            .collect();
        let dummy_hash = hash_with(&argon2, &throwaway)?;
        Ok(Self { argon2, dummy_hash })
    }
}

fn hash_with(argon2: &Argon2<'_>, password: &str) -> Result<String, PasswordHashError> {
    let salt = SaltString::generate(&mut OsRng);
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| PasswordHashError::hash(err.to_string()))
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        hash_with(&self.argon2, password)
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError> {
        let parsed =
            PasswordHash::new(hash).map_err(|err| PasswordHashError::malformed_hash(err.to_string()))?;
        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(err) => Err(PasswordHashError::malformed_hash(err.to_string())),
        }
    }

    fn verify_against_dummy(&self, password: &str) {
        // Result is irrelevant; only the elapsed work matters.
        let _discarded = self.verify(password, &self.dummy_hash);
    }
}
