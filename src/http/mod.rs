//! HTTP protocol layer module
//!
//! Response builders shared by the router and the QR handler, decoupled from
//! request parsing.

pub mod response;

// Re-export commonly used types
pub use response::{
    apply_common_headers, build_404_response, build_405_response, build_500_response,
    build_health_response, build_options_response, build_qrcode_response,
};
