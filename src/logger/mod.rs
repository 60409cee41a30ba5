//! Logger module
//!
//! Provides logging utilities for the HTTP server including:
//! - Subscriber setup from the configured severity (`LOG_LEVEL`)
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Error and warning logging

mod format;

pub use format::AccessLogEntry;

use crate::config::{Config, LoggingConfig};
use std::net::SocketAddr;
use tracing::level_filters::LevelFilter;

/// Map a severity name to a level filter
///
/// Unknown or empty names fall back to `info`. `fatal` and `panic` have no
/// tracing equivalent and map to `error`.
pub fn parse_level(name: &str) -> LevelFilter {
    match name.trim().to_ascii_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "warn" | "warning" => LevelFilter::WARN,
        "error" | "fatal" | "panic" => LevelFilter::ERROR,
        _ => LevelFilter::INFO,
    }
}

/// Initialize the global subscriber with configuration
///
/// Should be called once at application startup.
pub fn init(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_max_level(parse_level(&config.level))
        .with_target(false)
        .try_init()
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!("======================================");
    tracing::info!("QR code server started successfully");
    tracing::info!("Listening on: http://{addr}");
    tracing::info!("Endpoint: GET http://{addr}/api/qrcode");
    tracing::info!("Log level: {}", parse_level(&config.logging.level));
    if let Some(workers) = config.server.workers {
        tracing::info!("Worker threads: {workers}");
    }
    if config.logging.access_log {
        tracing::info!("Access log format: {}", config.logging.access_log_format);
    }
    tracing::info!("======================================");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!("Failed to serve connection: {err:?}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

/// Log a parameter that was replaced by its default
pub fn log_diagnostic(message: &str) {
    tracing::debug!("[Params] {message}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: "access", "{}", entry.format(format));
}

pub fn log_shutdown_requested(signal: &str) {
    tracing::info!("[Shutdown] {signal} received, no longer accepting connections");
}

pub fn log_shutdown_complete(remaining: usize) {
    if remaining == 0 {
        tracing::info!("[Shutdown] All connections drained");
    } else {
        tracing::warn!("[Shutdown] Grace period elapsed with {remaining} connection(s) still open");
    }
}
