//! Signing secret loading and validation.
//!
//! The token signing secret and the billing webhook secret are read from
//! files named by environment variables. Release builds insist on real
//! files of adequate length; debug builds fall back to random per-process
//! secrets so local runs need no setup.

use std::fmt;
use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use mockable::Env;
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use zeroize::Zeroizing;

const TOKEN_SECRET_FILE_ENV: &str = "TOKEN_SECRET_FILE";
const WEBHOOK_SECRET_FILE_ENV: &str = "WEBHOOK_SECRET_FILE";
const ALLOW_EPHEMERAL_ENV: &str = "SECRETS_ALLOW_EPHEMERAL";
const TOKEN_SECRET_DEFAULT_PATH: &str = "/var/run/secrets/token_secret";
const WEBHOOK_SECRET_DEFAULT_PATH: &str = "/var/run/secrets/webhook_secret";
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";

/// Minimum secret length accepted by release builds.
pub const SECRET_MIN_LEN: usize = 32;
const EPHEMERAL_SECRET_LEN: usize = 64;
const FINGERPRINT_BYTES: usize = 8;

/// Build mode for secret validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Missing secrets are replaced with ephemeral ones.
    Debug,
    /// Secrets must come from files of at least [`SECRET_MIN_LEN`] bytes.
    Release,
}

impl BuildMode {
    /// Mode matching `cfg!(debug_assertions)`.
    ///
    /// # Examples
    /// ```
    /// use tenantry::server::secrets_config::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// assert_eq!(mode == BuildMode::Debug, cfg!(debug_assertions));
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Key material for token signing and webhook verification.
pub struct ServerSecrets {
    /// HS256 key for session tokens.
    pub token_secret: Zeroizing<Vec<u8>>,
    /// HMAC key shared with the billing provider.
    pub webhook_secret: Zeroizing<Vec<u8>>,
}

impl ServerSecrets {
    /// Wrap raw secrets.
    pub fn new(token_secret: impl Into<Vec<u8>>, webhook_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            token_secret: Zeroizing::new(token_secret.into()),
            webhook_secret: Zeroizing::new(webhook_secret.into()),
        }
    }
}

impl fmt::Debug for ServerSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerSecrets")
            .field("token_secret", &secret_fingerprint(&self.token_secret))
            .field("webhook_secret", &secret_fingerprint(&self.webhook_secret))
            .finish()
    }
}

/// Errors raised while loading secrets.
#[derive(thiserror::Error, Debug)]
pub enum SecretsConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    /// A variable is present but holds an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// Reading a secret file failed.
    #[error("failed to read {label} at {path}: {source}")]
    SecretRead {
        label: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A secret file is too short.
    #[error("{label} at {path} too short: need >= {min_len} bytes, got {length}")]
    SecretTooShort {
        label: &'static str,
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    /// Release builds must not run with ephemeral secrets.
    #[error("SECRETS_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

struct SecretSource {
    label: &'static str,
    env_name: &'static str,
    default_path: &'static str,
}

const TOKEN_SECRET: SecretSource = SecretSource {
    label: "token secret",
    env_name: TOKEN_SECRET_FILE_ENV,
    default_path: TOKEN_SECRET_DEFAULT_PATH,
};

const WEBHOOK_SECRET: SecretSource = SecretSource {
    label: "webhook secret",
    env_name: WEBHOOK_SECRET_FILE_ENV,
    default_path: WEBHOOK_SECRET_DEFAULT_PATH,
};

/// Load both secrets according to `mode`.
///
/// # Examples
/// ```
/// use mockable::MockEnv;
/// use tenantry::server::secrets_config::{BuildMode, secrets_from_env};
/// use tenantry::test_support::cap_fs::write_file;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dir = tempfile::tempdir()?;
/// let token = dir.path().join("token");
/// let webhook = dir.path().join("webhook");
/// write_file(&token, &[b'a'; 32])?;
/// write_file(&webhook, &[b'b'; 32])?;
///
/// let token = token.display().to_string();
/// let webhook = webhook.display().to_string();
/// let mut env = MockEnv::new();
/// env.expect_string().returning(move |name| match name {
///     "TOKEN_SECRET_FILE" => Some(token.clone()),
///     "WEBHOOK_SECRET_FILE" => Some(webhook.clone()),
///     "SECRETS_ALLOW_EPHEMERAL" => Some("0".to_owned()),
///     _ => None,
/// });
///
/// let secrets = secrets_from_env(&env, BuildMode::Release)?;
/// assert_eq!(secrets.token_secret.len(), 32);
/// # Ok(())
/// # }
/// ```
pub fn secrets_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<ServerSecrets, SecretsConfigError> {
    let allow_ephemeral = allow_ephemeral_from_env(env, mode)?;
    let token_secret = load_secret(env, mode, allow_ephemeral, &TOKEN_SECRET)?;
    let webhook_secret = load_secret(env, mode, allow_ephemeral, &WEBHOOK_SECRET)?;
    Ok(ServerSecrets {
        token_secret,
        webhook_secret,
    })
}

fn allow_ephemeral_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<bool, SecretsConfigError> {
    let Some(value) = env.string(ALLOW_EPHEMERAL_ENV) else {
        if mode.is_debug() {
            return Ok(false);
        }
        return Err(SecretsConfigError::MissingEnv {
            name: ALLOW_EPHEMERAL_ENV,
        });
    };
    match parse_bool(&value) {
        Some(true) if mode.is_debug() => Ok(true),
        Some(true) => Err(SecretsConfigError::EphemeralNotAllowed),
        Some(false) => Ok(false),
        None if mode.is_debug() => {
            warn!(value = %value, "invalid SECRETS_ALLOW_EPHEMERAL; defaulting to disabled");
            Ok(false)
        }
        None => Err(SecretsConfigError::InvalidEnv {
            name: ALLOW_EPHEMERAL_ENV,
            value,
            expected: BOOL_EXPECTED,
        }),
    }
}

fn load_secret<E: Env>(
    env: &E,
    mode: BuildMode,
    allow_ephemeral: bool,
    source: &SecretSource,
) -> Result<Zeroizing<Vec<u8>>, SecretsConfigError> {
    let path = PathBuf::from(
        env.string(source.env_name)
            .unwrap_or_else(|| source.default_path.to_owned()),
    );

    match read_file(&path) {
        Ok(bytes) => {
            let length = bytes.len();
            let min_len = if mode.is_debug() { 1 } else { SECRET_MIN_LEN };
            if length < min_len {
                return Err(SecretsConfigError::SecretTooShort {
                    label: source.label,
                    path,
                    length,
                    min_len,
                });
            }
            if length < SECRET_MIN_LEN {
                warn!(secret = source.label, length, "secret shorter than recommended");
            }
            info!(
                secret = source.label,
                fingerprint = %secret_fingerprint(&bytes),
                "loaded secret"
            );
            Ok(bytes)
        }
        Err(error) if mode.is_debug() || allow_ephemeral => {
            warn!(
                secret = source.label,
                path = %path.display(),
                error = %error,
                "using ephemeral secret (dev only)"
            );
            Ok(ephemeral_secret())
        }
        Err(error) => Err(SecretsConfigError::SecretRead {
            label: source.label,
            path,
            source: error,
        }),
    }
}

fn read_file(path: &Path) -> std::io::Result<Zeroizing<Vec<u8>>> {
    let parent = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path.file_name().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name")
    })?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
    dir.read(Path::new(file_name)).map(Zeroizing::new)
}

fn ephemeral_secret() -> Zeroizing<Vec<u8>> {
    let mut bytes = Zeroizing::new(vec![0_u8; EPHEMERAL_SECRET_LEN]);
    OsRng.fill_bytes(bytes.as_mut_slice());
    bytes
}

/// Truncated SHA-256 of `secret` as 16 lowercase hex characters.
///
/// Identifies which secret is active without revealing it.
///
/// # Examples
/// ```
/// use tenantry::server::secrets_config::secret_fingerprint;
///
/// let fp = secret_fingerprint(b"example");
/// assert_eq!(fp.len(), 16);
/// assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
/// ```
#[must_use]
pub fn secret_fingerprint(secret: &[u8]) -> String {
    let digest = Sha256::digest(secret);
    hex::encode(digest.get(..FINGERPRINT_BYTES).unwrap_or_default())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "secrets_config_tests.rs"]
mod tests;
