// Server loop module
// Accepts connections until shutdown is requested, then drains in-flight ones

use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// How often the drain loop re-checks the active connection count
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Serve connections from `listener` until `state.shutdown_signal` fires
///
/// After the signal the listener is closed and in-flight connections get up
/// to `performance.shutdown_grace` seconds to finish.
pub async fn run(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    let local_addr = listener.local_addr()?;
    logger::log_server_start(&local_addr, &state.config);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => accept_connection(stream, peer_addr, &state),
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            () = state.shutdown_signal.notified() => break,
        }
    }

    drop(listener);

    let grace = Duration::from_secs(state.config.performance.shutdown_grace);
    let remaining = drain_connections(&state, grace).await;
    logger::log_shutdown_complete(remaining);
    Ok(())
}

/// Wait until no connection is active or `grace` elapses
///
/// Returns the number of connections still open when it gave up.
async fn drain_connections(state: &AppState, grace: Duration) -> usize {
    let deadline = tokio::time::Instant::now() + grace;

    loop {
        let active = state.active_connections();
        if active == 0 || tokio::time::Instant::now() >= deadline {
            return active;
        }
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn test_drain_returns_immediately_when_idle() {
        let state = AppState::new(Config::default());
        assert_eq!(drain_connections(&state, Duration::from_secs(5)).await, 0);
    }

    #[tokio::test]
    async fn test_drain_gives_up_after_grace() {
        let state = AppState::new(Config::default());
        state.active_connections.fetch_add(2, Ordering::SeqCst);
        assert_eq!(drain_connections(&state, Duration::from_millis(200)).await, 2);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let listener = crate::server::create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let state = Arc::new(AppState::new(Config::default()));
        state.shutdown_signal.notify_one();
        run(listener, state).await.unwrap();
    }
}
