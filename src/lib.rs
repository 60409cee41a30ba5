//! HTTP service that renders QR codes as PNG or SVG from query parameters.
//!
//! `GET /api/qrcode?data=...&size=...&ecc=...&color=...&bgcolor=...&format=...`

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod qr;
pub mod server;
