//! Server entry-point: loads settings and secrets, prepares storage, and
//! serves the account and entitlement API.

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use tenantry::inbound::http::health::HealthState;
use tenantry::outbound::persistence::{DbPool, run_pending_migrations};
use tenantry::server::{
    BuildMode, ServerConfig, ServerSettings, create_server, secrets_from_env,
};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load_from_iter(std::env::args_os())
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let secrets = secrets_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;

    let mut config = ServerConfig::new(bind_addr, secrets).with_argon2(settings.argon2());

    if let Some(pool_config) = settings.pool_config() {
        if settings.run_migrations {
            let url = pool_config.database_url().to_owned();
            let applied = tokio::task::spawn_blocking(move || run_pending_migrations(&url))
                .await
                .map_err(|e| std::io::Error::other(format!("migration task failed: {e}")))?
                .map_err(std::io::Error::other)?;
            info!(applied, "database migrations complete");
        }
        let pool = DbPool::new(pool_config)
            .await
            .map_err(|e| std::io::Error::other(format!("database pool: {e}")))?;
        config = config.with_db_pool(pool);
    }

    #[cfg(feature = "metrics")]
    {
        config = config.with_metrics(Some(tenantry::server::prometheus_metrics()?));
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    server.await
}
