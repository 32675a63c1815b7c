//! HTTP server initialization and runtime setup.
//!
//! Selects the link store, builds the shortener service and runs the Axum
//! server until a shutdown signal arrives.

use crate::application::services::ShortenerService;
use crate::config::Config;
use crate::domain::repositories::LinkRepository;
use crate::infrastructure::persistence::{MemoryLinkRepository, PgLinkRepository, pool};
use crate::routes::app_router;
use crate::state::AppState;
use crate::utils::code_generator::CodeGenerator;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Link store (PostgreSQL with migrations, or in-memory fallback)
/// - Shortener service
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Code generator settings are invalid
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let repository = build_repository(&config).await?;

    let generator = CodeGenerator::new(&config.short_code_alphabet, config.short_code_length)
        .context("Invalid SHORT_CODE_ALPHABET or SHORT_CODE_LENGTH")?;

    let shortener = ShortenerService::new(repository, generator, config.base_url.clone())
        .with_max_generation_attempts(config.code_generation_attempts);

    let state = AppState::new(Arc::new(shortener), config.redirect_permanent);

    let app = app_router(state, config.behind_proxy);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");

    Ok(())
}

/// Picks PostgreSQL when a database URL is configured, memory otherwise.
async fn build_repository(config: &Config) -> Result<Arc<dyn LinkRepository>> {
    if config.is_database_enabled() {
        let pg_pool = pool::connect(config).await?;
        pool::migrate(&pg_pool).await?;

        tracing::info!("Link store: postgres");
        Ok(Arc::new(PgLinkRepository::new(Arc::new(pg_pool))))
    } else {
        tracing::warn!("No database configured, links are kept in memory and lost on restart");
        Ok(Arc::new(MemoryLinkRepository::new()))
    }
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
