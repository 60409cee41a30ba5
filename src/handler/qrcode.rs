//! `/api/qrcode` handler
//!
//! One pass per request: resolve parameters, encode, respond.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

use crate::config::QrConfig;
use crate::http;
use crate::logger;
use crate::qr::{self, QrParams};

/// Generate a QR code from the request's query string
///
/// Bad parameters fall back to defaults; only an encoding failure changes
/// the status, to 500.
pub fn serve_qrcode(query: Option<&str>, is_head: bool, config: &QrConfig) -> Response<Full<Bytes>> {
    let (params, diagnostics) = QrParams::from_query(query, config.max_size);
    for diagnostic in &diagnostics {
        logger::log_diagnostic(diagnostic);
    }

    match qr::encode(&params) {
        Ok(output) => http::build_qrcode_response(output, is_head),
        Err(e) => {
            logger::log_error(&format!(
                "QR generation failed ({} bytes of data, ecc {:?}): {e}",
                params.data.len(),
                params.ecc
            ));
            http::build_500_response(&e.to_string())
        }
    }
}
