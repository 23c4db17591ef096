//! HTTP surface for note analysis.
//!
//! `noema serve` exposes `POST /api/analyze` and `GET /api/health`. The
//! analyzer is blocking, so the runtime is built here rather than through
//! `#[tokio::main]`, which keeps the analyzer's last reference outside of
//! async context.

mod error;
mod handlers;
mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use crate::analyzer::Analyzer;
use crate::config::ServerConfig;

pub use error::ApiError;
pub use handlers::{AnalyzeRequest, HealthResponse, ServerState};
pub use routes::create_router;

/// Runs the server until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the runtime cannot start or the port cannot be bound.
pub fn serve(
    config: &ServerConfig,
    analyzer: Arc<dyn Analyzer>,
    key_configured: bool,
) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let state = ServerState::new(Arc::clone(&analyzer));
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;

        info!("noema API listening on http://localhost:{}", config.port);
        info!(
            "health check: http://localhost:{}/api/health",
            config.port
        );
        if key_configured {
            info!("OpenAI API key: configured");
        } else {
            warn!("OpenAI API key: NOT configured; analysis requests will fail");
        }

        axum::serve(listener, create_router(state))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("Server error")
    })?;

    drop(runtime);
    drop(analyzer);
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
