//! Error types
//!
//! Parameter problems are recovered locally and never reach the caller;
//! only encoding failures propagate to the handler as `QrError`.

use thiserror::Error;

/// Failure to parse a hex color string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("invalid color format '{0}': expected 3 or 6 hex digits")]
    InvalidColorFormat(String),
}

/// Failure to produce the encoded QR output
#[derive(Debug, Error)]
pub enum QrError {
    /// The payload cannot be represented by any QR symbol version
    #[error("failed to encode QR symbol: {0}")]
    Encode(#[from] qrcode::types::QrError),

    /// The raster image could not be serialized
    #[error("failed to serialize image: {0}")]
    Image(#[from] image::ImageError),
}
