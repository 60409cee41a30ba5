// Application state module
// Read-only state shared by every connection task

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

use super::types::Config;

/// Application state
pub struct AppState {
    pub config: Config,

    /// Raised once to stop accepting connections
    pub shutdown_signal: Arc<Notify>,

    /// Connections currently being served, used to drain on shutdown
    pub active_connections: AtomicUsize,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            shutdown_signal: Arc::new(Notify::new()),
            active_connections: AtomicUsize::new(0),
        }
    }

    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::SeqCst)
    }
}
