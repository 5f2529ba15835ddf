//! Graceful shutdown handling
//!
//! Resolves on SIGTERM or SIGINT so the HTTP server can drain before exit.

use tracing::{error, info};

/// Wait for a termination signal from the OS
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(term), Ok(int)) => (term, int),
                (Err(e), _) | (_, Err(e)) => {
                    error!(error = %e, "Failed to register signal handlers");
                    return std::future::pending().await;
                }
            };

        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM");
            }
            _ = sigint.recv() => {
                info!("Received SIGINT");
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to register ctrl-c handler");
            return std::future::pending().await;
        }
        info!("Received Ctrl+C");
    }

    info!("Initiating graceful shutdown...");
}
