//! # Authorization HTTP Server
//!
//! Demo HTTP server around the HealthGrid authorization core.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `PORT` - HTTP server port (default: 8080)
//! - `JWT_SECRET` - HS256 signing secret (required)
//! - `JWT_ISSUER` - Expected token issuer (default: healthgrid)
//! - `LOOKUP_TIMEOUT_MS` - Principal/resource lookup deadline (default: 2000)
//! - `SEED_FILE` - JSON file with principals, hospitals and departments
//! - `RUST_LOG` - Log level (default: info)

use anyhow::Context;
use axum::serve;
use healthgrid_authz::{
    http::{create_router, AppState},
    identity::InMemoryPrincipalStore,
    region::{InMemoryRegionDirectory, RegionTagResolver},
    AccessGuard, AuthzConfig, DecisionEngine, IdentityResolver, JwtVerifier, MetricsCollector,
    RoleHierarchy, SeedData,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Graceful shutdown handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received SIGTERM signal");
        }
    }

    info!("Starting graceful shutdown");
}

/// Main server entrypoint
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting HealthGrid Authorization Server v{}", healthgrid_authz::VERSION);

    let config = AuthzConfig::from_env().context("Failed to load configuration")?;

    info!("Configuration:");
    info!("  Port: {}", config.port);
    info!("  Issuer: {}", config.jwt_issuer);
    info!("  Lookup timeout: {:?}", config.lookup_timeout);

    let principals = Arc::new(InMemoryPrincipalStore::new());
    let directory = Arc::new(InMemoryRegionDirectory::new());

    let hierarchy = match &config.seed_file {
        Some(path) => {
            let seed = SeedData::load(path)
                .await
                .with_context(|| format!("Failed to load seed file {}", path.display()))?;
            seed.apply(&principals, &directory).await;
            info!(
                "Seeded {} principals, {} hospitals, {} departments",
                seed.principals.len(),
                seed.hospitals.len(),
                seed.departments.len()
            );
            seed.role_hierarchy()?
        }
        None => {
            warn!("No SEED_FILE configured; every request will be unauthenticated");
            RoleHierarchy::standard()
        }
    };

    let verifier = Arc::new(JwtVerifier::new(&config.jwt_secret, config.jwt_issuer.clone()));
    let identity = IdentityResolver::with_timeout(verifier, principals, config.lookup_timeout);
    let guard = AccessGuard::new(
        identity,
        DecisionEngine::new(Arc::new(hierarchy)),
        Arc::new(MetricsCollector::new()),
    );
    let tags = RegionTagResolver::with_timeout(directory, config.lookup_timeout);

    let app = create_router(AppState::new(guard, tags));
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind HTTP server on {}", addr))?;

    serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Server shut down gracefully");
    Ok(())
}
