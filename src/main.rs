//! CampusVote API - Campus Voting Platform
//!
//! Students connect a wallet, browse proposals and cast one vote per proposal.
//! Votes go through a simulated ledger that stands in for the on-chain
//! transaction; all state is held in memory.

mod config;
mod error;
mod models;
mod proposal;
mod routes;
mod session;
mod state;

use crate::config::Settings;
use crate::error::AppError;
use crate::routes::create_router;
use crate::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber for structured logging
    init_tracing();

    info!("🗳️  Starting CampusVote - Campus Voting Platform...");

    // Load configuration
    let settings = Settings::load().map_err(AppError::from)?;
    info!("📋 Configuration loaded successfully");

    if settings.voting.failure_rate > 0.0 {
        warn!(
            "⚠️  Simulated ledger will reject {:.0}% of votes",
            settings.voting.failure_rate * 100.0
        );
    }

    let state = Arc::new(AppState::new(&settings.voting));
    info!("📦 {} proposals loaded", state.proposals.count().await);

    // Build the router
    let app = create_router(state, &settings);

    // Create socket address
    let addr = SocketAddr::from((settings.server.host, settings.server.port));

    info!("🌐 Server listening on http://{}", addr);
    info!("");
    info!("📚 API Endpoints:");
    info!("   ─── Wallet Session ───");
    info!("   POST /api/session/connect      - Connect a wallet");
    info!("   POST /api/session/disconnect   - Disconnect (clears your votes)");
    info!("   GET  /api/session              - Current session");
    info!("   GET  /api/session/history      - Your voting history");
    info!("");
    info!("   ─── Proposals ───");
    info!("   GET  /api/proposals            - List proposals");
    info!("   POST /api/proposals            - Create a proposal");
    info!("   GET  /api/proposals/:id        - Get a proposal");
    info!("   POST /api/proposals/:id/vote   - Cast a vote");
    info!("   GET  /api/proposals/:id/results - Winner or tie");
    info!("   GET  /api/stats                - Platform statistics");
    info!("");
    info!(
        "⛓️  Votes confirm on {} after {:?}",
        settings.voting.network, settings.voting.vote_delay
    );

    // Create TCP listener and serve
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server shutdown complete");
    Ok(())
}

/// Initialize tracing with structured logging
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,campusvote_api=debug,tower_http=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("📴 Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("📴 Received terminate signal, initiating graceful shutdown...");
        },
    }
}
