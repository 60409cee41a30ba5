//! Request handler module
//!
//! Responsible for request routing dispatch and QR code generation.

pub mod qrcode;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
