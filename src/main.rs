use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use contact_relay::api;
use contact_relay::config::Config;
use contact_relay::mail::Mailer;
use contact_relay::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    init_tracing();

    tracing::info!("Starting contact relay...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(
        host = %config.server_host,
        port = %config.server_port,
        env = ?config.app_env,
        "Configuration loaded"
    );

    let mailer = Mailer::from_config(&config);
    if !mailer.is_configured() {
        tracing::warn!("No email transport configured, /contact will answer 500 until credentials are set");
    }

    let addr: SocketAddr = config.server_addr().parse()?;
    let state = AppState::new(config, mailer);
    tracing::info!(
        request_timeout_secs = state.request_timeout().as_secs(),
        "Request timeout set"
    );

    // Build router
    let app = api::create_app(state);

    // Start server
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(address = %addr, "Server listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

/// `RUST_LOG` filters, `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => registry.with(fmt::layer().json()).init(),
        _ => registry.with(fmt::layer()).init(),
    }
}

/// Resolves on Ctrl+C or SIGTERM so in-flight requests can drain.
async fn shutdown_signal() {
    #[cfg(unix)]
    let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
        Ok(stream) => Some(stream),
        Err(e) => {
            tracing::warn!(error = %e, "SIGTERM handler unavailable, only Ctrl+C stops the server");
            None
        }
    };

    let terminate = async {
        #[cfg(unix)]
        if let Some(stream) = sigterm.as_mut() {
            stream.recv().await;
            return "SIGTERM";
        }
        std::future::pending::<&'static str>().await
    };

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!(error = %e, "Ctrl+C listener failed");
            std::future::pending::<()>().await;
        }
        "Ctrl+C"
    };

    let reason = tokio::select! {
        reason = ctrl_c => reason,
        reason = terminate => reason,
    };

    tracing::info!(signal = reason, "Shutting down, draining in-flight requests");
}
