//! HTTP server configuration object.

use std::net::{SocketAddr, TcpListener};

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

use crate::outbound::crypto::Argon2Settings;
use crate::outbound::persistence::DbPool;

use super::secrets_config::ServerSecrets;

/// Builder-style configuration for [`super::create_server`].
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) listener: Option<TcpListener>,
    pub(crate) secrets: ServerSecrets,
    pub(crate) argon2: Argon2Settings,
    pub(crate) db_pool: Option<DbPool>,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Configuration with in-memory storage and default Argon2 costs.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, secrets: ServerSecrets) -> Self {
        Self {
            bind_addr,
            listener: None,
            secrets,
            argon2: Argon2Settings::default(),
            db_pool: None,
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Persist through PostgreSQL instead of process memory.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Override the Argon2 cost parameters.
    #[must_use]
    pub fn with_argon2(mut self, settings: Argon2Settings) -> Self {
        self.argon2 = settings;
        self
    }

    /// Serve on an already bound listener instead of `bind_addr`.
    #[must_use]
    pub fn with_listener(mut self, listener: TcpListener) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}
