// Signal handling module
//
// Supported signals:
// - SIGTERM: Graceful shutdown
// - SIGINT:  Graceful shutdown (Ctrl+C)

use std::sync::Arc;

use crate::config::AppState;
use crate::logger;

/// Wait for the first shutdown signal and return its name
#[cfg(unix)]
async fn wait_for_shutdown() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = sigterm.recv() => Ok("SIGTERM"),
        _ = sigint.recv() => Ok("SIGINT"),
    }
}

/// Windows fallback - only handles Ctrl+C
#[cfg(not(unix))]
async fn wait_for_shutdown() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("Ctrl+C")
}

/// Spawn a task that raises `state.shutdown_signal` on SIGTERM/SIGINT
///
/// If handlers cannot be registered the server keeps running and the error
/// is logged; the process can still be killed.
pub fn start_signal_handler(state: Arc<AppState>) {
    tokio::spawn(async move {
        match wait_for_shutdown().await {
            Ok(name) => {
                logger::log_shutdown_requested(name);
                state.shutdown_signal.notify_one();
            }
            Err(e) => logger::log_error(&format!("Failed to register signal handlers: {e}")),
        }
    });
}
