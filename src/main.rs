// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Relay Service
//!
//! Serves `POST /api/contact` for the portfolio site: validates the form,
//! enforces a 30-minute cooldown per client address and per email, and sends
//! the owner notification plus the visitor acknowledgment.
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables (a `.env` file is
//! honored):
//!
//! - `RESEND_API_KEY`: mail provider key (required)
//! - `CONTACT_EMAIL`: owner address receiving notifications (required)
//! - `BIND_ADDR`: public bind address (default: 0.0.0.0:8080)
//! - `ADMIN_BIND_ADDR`: admin bind address for the cooldown override (default: disabled)
//! - `RATE_LIMIT_WINDOW_MS`: cooldown window (default: 1800000)
//! - `RATE_LIMIT_CAPACITY`: remembered keys (default: 500)

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use contact_relay::{
    clock::SystemClock,
    config::Config,
    handlers::{admin_router, router, AppState},
    mailer::ResendMailer,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the environment may be set directly.
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(
        bind_addr = %config.bind_addr,
        admin_bind_addr = ?config.admin_bind_addr,
        window_ms = config.rate_limit.window_ms,
        capacity = config.rate_limit.capacity,
        mail_api = %config.mail.api_base,
        "Starting contact relay"
    );

    // Create application state
    let mailer = Arc::new(ResendMailer::new(&config.mail)?);
    let state = Arc::new(AppState::new(config.clone(), Arc::new(SystemClock), mailer)?);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    // Spawn expiry sweep
    let sweep_state = state.clone();
    let sweep_shutdown = wait_for_shutdown(shutdown_rx.clone());
    let sweep_every = config.rate_limit.sweep_interval();
    tokio::spawn(async move {
        tokio::pin!(sweep_shutdown);
        let mut interval = tokio::time::interval(sweep_every);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    sweep_state.limiter.purge_expired();
                    sweep_state.metrics.set_cooldown_entries(sweep_state.limiter.len());
                }
                _ = &mut sweep_shutdown => break,
            }
        }
    });

    // Admin listener, loopback only by convention
    if let Some(admin_addr) = &config.admin_bind_addr {
        let addr: SocketAddr = admin_addr.parse()?;
        if !addr.ip().is_loopback() {
            error!(addr = %addr, "Admin listener is not bound to loopback; the cooldown override is unauthenticated");
        }
        let listener = TcpListener::bind(addr).await?;
        info!(addr = %addr, "Admin server listening");

        let app = admin_router(state.clone());
        let rx = shutdown_rx.clone();
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(wait_for_shutdown(rx))
                .await
            {
                error!(error = %e, "Admin server failed");
            }
        });
    }

    // Start server
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(wait_for_shutdown(shutdown_rx))
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn wait_for_shutdown(mut rx: watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            return;
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
