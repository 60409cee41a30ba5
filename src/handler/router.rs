//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for method validation, route matching, and dispatching.

use crate::config::AppState;
use crate::handler::qrcode;
use crate::http;
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::sync::Arc;

/// Path of the QR generation endpoint
pub const QRCODE_PATH: &str = "/api/qrcode";

/// Path of the liveness probe
pub const HEALTH_PATH: &str = "/healthz";

/// Main entry point for HTTP request handling
///
/// The request body is never read, so any body type is accepted.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let http_config = &state.config.http;

    let mut response = match check_http_method(req.method(), http_config.enable_cors) {
        Some(resp) => resp,
        None => route_request(&req, &state),
    };

    http::apply_common_headers(&mut response, &http_config.server_name, http_config.enable_cors);
    Ok(response)
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method, enable_cors: bool) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response(enable_cors)),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Route request based on path
fn route_request<B>(req: &Request<B>, state: &AppState) -> Response<Full<Bytes>> {
    let is_head = req.method() == Method::HEAD;

    match req.uri().path() {
        QRCODE_PATH => qrcode::serve_qrcode(req.uri().query(), is_head, &state.config.qr),
        HEALTH_PATH if state.config.http.health_enabled => http::build_health_response(is_head),
        _ => http::build_404_response(),
    }
}
