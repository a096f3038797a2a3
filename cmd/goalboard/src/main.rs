//! # goalboard
//!
//! The entry point that assembles the application from settings: picks the
//! storage backend, wires the services and serves the HTTP API.

use std::sync::Arc;

use anyhow::Context;
use chrono::Duration;
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use api_adapters::{router, AppState};
use auth_adapters::{Argon2Hasher, JwtTokenService};
use configs::{LogFormat, LogSettings, Settings, StorageBackend};
use domains::{PasswordHasher, TokenService};
use services::{Ports, Services};
use storage_adapters::MemoryStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("Failed to load settings")?;
    init_tracing(&settings.log);

    let ports = build_ports(&settings).await?;
    let app = router(AppState::new(Services::new(ports)));

    let addr = settings.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    info!(
        addr = %listener.local_addr()?,
        backend = ?settings.storage.backend,
        "goalboard listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;
    info!("goalboard shut down");
    Ok(())
}

/// `RUST_LOG` wins over `log.level` when set.
fn init_tracing(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let registry = tracing_subscriber::registry().with(filter);
    match log.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(false))
            .init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init(),
    }
}

async fn build_ports(settings: &Settings) -> anyhow::Result<Ports> {
    let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2Hasher::new());
    let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(
        settings.auth.secret_bytes(),
        token_ttl(settings.auth.token_ttl_secs)?,
    ));

    match settings.storage.backend {
        StorageBackend::Memory => {
            info!("Using the in-memory store; data is lost on exit");
            Ok(Ports::from_store(Arc::new(MemoryStore::new()), hasher, tokens))
        }
        #[cfg(feature = "db-postgres")]
        StorageBackend::Postgres => {
            use secrecy::ExposeSecret;

            let url = settings
                .database
                .url
                .as_ref()
                .context("database.url is not set")?;
            let store = storage_adapters::PgStore::connect(
                url.expose_secret(),
                settings.database.max_connections,
            )
            .await?;
            store.migrate().await?;
            Ok(Ports::from_store(Arc::new(store), hasher, tokens))
        }
        #[cfg(not(feature = "db-postgres"))]
        StorageBackend::Postgres => {
            anyhow::bail!("storage.backend = \"postgres\" needs the db-postgres feature")
        }
    }
}

fn token_ttl(secs: u64) -> anyhow::Result<Duration> {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .context("auth.token_ttl_secs is out of range")
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutting down...");
}
