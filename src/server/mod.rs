// Server module entry point
// Listener setup, connection serving, accept loop and shutdown signals

pub mod connection;
pub mod listener;
pub mod serve;
pub mod signal;

// Re-export commonly used items
pub use listener::create_reusable_listener;
pub use serve::run;
pub use signal::start_signal_handler;
