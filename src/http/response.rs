//! HTTP response building module
//!
//! Provides builders for the status code responses the service emits.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{self, HeaderValue};
use hyper::{Response, StatusCode};

use crate::qr::{EncodedOutput, CONTENT_TYPE};

pub const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// Build 200 response carrying the encoded QR code
///
/// For `HEAD` the headers are identical but the body is empty.
pub fn build_qrcode_response(output: EncodedOutput, is_head: bool) -> Response<Full<Bytes>> {
    let disposition = output.content_disposition();
    let content_length = output.bytes.len();
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from(output.bytes)
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, CONTENT_TYPE)
        .header(header::CONTENT_DISPOSITION, disposition)
        .header(header::CONTENT_LENGTH, content_length)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 500 Internal Server Error response with a diagnostic body
pub fn build_500_response(message: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(Full::new(Bytes::from(format!(
            "500 Internal Server Error: {message}"
        ))))
        .unwrap_or_else(|e| {
            log_build_error("500", &e);
            Response::new(Full::new(Bytes::from("500 Internal Server Error")))
        })
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Full::new(Bytes::from("404 Not Found")))
        .unwrap_or_else(|e| {
            log_build_error("404", &e);
            Response::new(Full::new(Bytes::from("404 Not Found")))
        })
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header(header::CONTENT_TYPE, "text/plain")
        .header(header::ALLOW, ALLOWED_METHODS)
        .body(Full::new(Bytes::from("405 Method Not Allowed")))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(Full::new(Bytes::from("405 Method Not Allowed")))
        })
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response(enable_cors: bool) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header(header::ALLOW, ALLOWED_METHODS);

    if enable_cors {
        builder = builder
            .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")
            .header(header::ACCESS_CONTROL_ALLOW_METHODS, ALLOWED_METHODS)
            .header(header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type")
            .header(header::ACCESS_CONTROL_MAX_AGE, "86400");
    }

    builder.body(Full::new(Bytes::new())).unwrap_or_else(|e| {
        log_build_error("OPTIONS", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Build liveness probe response
pub fn build_health_response(is_head: bool) -> Response<Full<Bytes>> {
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from_static(b"ok")
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/plain")
        .header(header::CONTENT_LENGTH, 2)
        .header(header::CACHE_CONTROL, "no-store")
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("health", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Stamp headers shared by every response
pub fn apply_common_headers(resp: &mut Response<Full<Bytes>>, server_name: &str, enable_cors: bool) {
    let headers = resp.headers_mut();
    match HeaderValue::from_str(server_name) {
        Ok(value) => {
            headers.insert(header::SERVER, value);
        }
        Err(e) => log_build_error("Server header", &e),
    }
    if enable_cors {
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        );
    }
}

/// Log response build error
fn log_build_error(what: &str, error: &impl std::fmt::Display) {
    crate::logger::log_error(&format!("Failed to build {what} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qr::OutputFormat;
    use http_body_util::BodyExt;

    async fn body_bytes(resp: Response<Full<Bytes>>) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    fn svg_output() -> EncodedOutput {
        EncodedOutput {
            bytes: b"<svg></svg>".to_vec(),
            format: OutputFormat::Svg,
        }
    }

    #[tokio::test]
    async fn test_qrcode_response_headers() {
        let resp = build_qrcode_response(svg_output(), false);
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/octet-stream");
        assert_eq!(
            resp.headers()[header::CONTENT_DISPOSITION],
            "inline; filename=qrcode.svg"
        );
        assert_eq!(resp.headers()[header::CONTENT_LENGTH], "11");
        assert_eq!(body_bytes(resp).await, Bytes::from_static(b"<svg></svg>"));
    }

    #[tokio::test]
    async fn test_qrcode_head_response_has_no_body() {
        let resp = build_qrcode_response(svg_output(), true);
        assert_eq!(resp.headers()[header::CONTENT_LENGTH], "11");
        assert!(body_bytes(resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_500_response_carries_message() {
        let resp = build_500_response("data too long");
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_bytes(resp).await;
        assert!(String::from_utf8_lossy(&body).contains("data too long"));
    }

    #[test]
    fn test_options_cors() {
        let resp = build_options_response(true);
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

        let resp = build_options_response(false);
        assert!(!resp.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
        assert_eq!(resp.headers()[header::ALLOW], ALLOWED_METHODS);
    }

    #[test]
    fn test_common_headers() {
        let mut resp = build_404_response();
        apply_common_headers(&mut resp, "qrcode-restapi", true);
        assert_eq!(resp.headers()[header::SERVER], "qrcode-restapi");
        assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

        let mut resp = build_405_response();
        apply_common_headers(&mut resp, "bad\nname", false);
        assert!(!resp.headers().contains_key(header::SERVER));
    }
}
