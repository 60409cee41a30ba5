//! QR code generation
//!
//! Turns raw query parameters into encoded PNG or SVG bytes.

mod color;
mod params;
mod render;

pub use color::Color;
pub use params::{
    resolve_color, resolve_ecc, resolve_format, resolve_size, ErrorCorrection, OutputFormat,
    QrParams, Resolved,
};
pub use render::{encode, EncodedOutput, CONTENT_TYPE};
