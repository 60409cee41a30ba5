// Configuration module entry point
// Layered loading: defaults, optional config file, QRCODE_* env, LOG_LEVEL

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{Config, HttpConfig, LoggingConfig, PerformanceConfig, QrConfig, ServerConfig};

/// Environment variable selecting the log severity
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

impl Config {
    /// Load configuration from specified file path (extension optional)
    ///
    /// A missing file is not an error; defaults apply.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::builder(config_path)?
            .set_override_option("logging.level", std::env::var(LOG_LEVEL_ENV).ok())?
            .build()?
            .try_deserialize()
    }

    fn builder(
        config_path: &str,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        let defaults = Self::default();

        Ok(config::Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", defaults.server.port)?
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.access_log", defaults.logging.access_log)?
            .set_default("logging.access_log_format", defaults.logging.access_log_format)?
            .set_default("performance.keep_alive_timeout", defaults.performance.keep_alive_timeout)?
            .set_default("performance.read_timeout", defaults.performance.read_timeout)?
            .set_default("performance.write_timeout", defaults.performance.write_timeout)?
            .set_default("performance.shutdown_grace", defaults.performance.shutdown_grace)?
            .set_default("http.server_name", defaults.http.server_name)?
            .set_default("http.enable_cors", defaults.http.enable_cors)?
            .set_default("http.health_enabled", defaults.http.health_enabled)?
            .set_default("qr.max_size", defaults.qr.max_size)?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("QRCODE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            ))
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
