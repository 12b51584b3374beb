//! Server settings loaded via OrthoConfig.
//!
//! Values come from command-line flags, `TENANTRY_*` environment variables,
//! or a configuration file. Secrets are not settings; see
//! [`super::secrets_config`].

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::outbound::crypto::Argon2Settings;
use crate::outbound::persistence::PoolConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Errors raised when settings hold unusable values.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The bind address did not parse.
    #[error("invalid bind address '{value}': {message}")]
    InvalidBindAddr { value: String, message: String },
}

/// Runtime settings for the `tenantry` server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "TENANTRY")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection URL. Without it, state is kept in memory.
    pub database_url: Option<String>,
    /// Upper bound on pooled connections.
    pub pool_max_size: Option<u32>,
    /// Apply embedded migrations before serving.
    #[ortho_config(default = true)]
    pub run_migrations: bool,
    /// Argon2 memory cost in KiB.
    pub argon2_memory_kib: Option<u32>,
    /// Argon2 pass count.
    pub argon2_iterations: Option<u32>,
    /// Argon2 lane count.
    pub argon2_parallelism: Option<u32>,
}

impl ServerSettings {
    /// Parsed listen address, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| SettingsError::InvalidBindAddr {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    /// Pool configuration when a database URL is set.
    pub fn pool_config(&self) -> Option<PoolConfig> {
        let url = self.database_url.as_deref()?;
        let config = PoolConfig::new(url);
        Some(match self.pool_max_size {
            Some(max) => config.with_max_size(max),
            None => config,
        })
    }

    /// Argon2 cost parameters with unset values taken from the defaults.
    pub fn argon2(&self) -> Argon2Settings {
        let defaults = Argon2Settings::default();
        Argon2Settings {
            memory_kib: self.argon2_memory_kib.unwrap_or(defaults.memory_kib),
            iterations: self.argon2_iterations.unwrap_or(defaults.iterations),
            parallelism: self.argon2_parallelism.unwrap_or(defaults.parallelism),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for server settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 7] = [
        "TENANTRY_BIND_ADDR",
        "TENANTRY_DATABASE_URL",
        "TENANTRY_POOL_MAX_SIZE",
        "TENANTRY_RUN_MIGRATIONS",
        "TENANTRY_ARGON2_MEMORY_KIB",
        "TENANTRY_ARGON2_ITERATIONS",
        "TENANTRY_ARGON2_PARALLELISM",
    ];

    fn load_from_empty_args() -> ServerSettings {
        ServerSettings::load_from_iter([OsString::from("tenantry")]).expect("config should load")
    }

    fn env_with(overrides: &[(&str, &str)]) -> Vec<(&'static str, Option<String>)> {
        VARS.iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(env_with(&[]));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("default parses"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("literal")
        );
        assert!(settings.pool_config().is_none());
        assert!(settings.run_migrations);
        assert_eq!(settings.argon2(), Argon2Settings::default());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(env_with(&[
            ("TENANTRY_BIND_ADDR", "127.0.0.1:9000"),
            ("TENANTRY_DATABASE_URL", "postgres://localhost/tenantry"),
            ("TENANTRY_RUN_MIGRATIONS", "false"),
            ("TENANTRY_ARGON2_ITERATIONS", "3"),
        ]));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("override parses").port(),
            9000
        );
        let pool = settings.pool_config().expect("pool configured");
        assert_eq!(pool.database_url(), "postgres://localhost/tenantry");
        assert!(!settings.run_migrations);
        assert_eq!(settings.argon2().iterations, 3);
        assert_eq!(
            settings.argon2().memory_kib,
            Argon2Settings::default().memory_kib
        );
    }

    #[rstest]
    fn malformed_bind_addresses_are_reported() {
        let _guard = lock_env(env_with(&[("TENANTRY_BIND_ADDR", "not-an-address")]));

        let err = load_from_empty_args().bind_addr().expect_err("invalid");
        assert!(matches!(err, SettingsError::InvalidBindAddr { .. }));
    }
}
