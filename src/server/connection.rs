// Connection handling module
// Serves one accepted TCP connection and logs each request after it completes

use std::any::Any;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::FutureExt;
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{self, HeaderName};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, Version};
use hyper_util::rt::TokioIo;

use crate::config::{AppState, HttpConfig};
use crate::handler;
use crate::http;
use crate::logger::{self, AccessLogEntry};

/// Serve an accepted connection in its own task.
///
/// This function:
/// 1. Counts the connection as active
/// 2. Configures HTTP/1.1 keep-alive from configuration
/// 3. Serves requests through the access-logging wrapper
/// 4. Applies the connection timeout
/// 5. Releases the active count when done, even if the task unwinds
pub fn accept_connection(stream: tokio::net::TcpStream, peer_addr: SocketAddr, state: &Arc<AppState>) {
    let guard = ConnectionGuard::new(state);

    let state = Arc::clone(state);
    tokio::spawn(async move {
        let _guard = guard;
        let io = TokioIo::new(stream);

        let performance = &state.config.performance;
        let timeout_duration = Duration::from_secs(std::cmp::max(
            performance.read_timeout,
            performance.write_timeout,
        ));

        let mut builder = http1::Builder::new();
        builder.keep_alive(performance.keep_alive_timeout > 0);

        let service_state = Arc::clone(&state);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| serve_with_access_log(req, peer_addr, Arc::clone(&service_state))),
        );

        match tokio::time::timeout(timeout_duration, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&err),
            Err(_) => logger::log_warning(&format!(
                "Connection from {peer_addr} timed out after {} seconds",
                timeout_duration.as_secs()
            )),
        }
    });
}

/// Counts one connection in `AppState::active_connections` for as long as it lives
struct ConnectionGuard {
    state: Arc<AppState>,
}

impl ConnectionGuard {
    fn new(state: &Arc<AppState>) -> Self {
        state.active_connections.fetch_add(1, Ordering::SeqCst);
        Self {
            state: Arc::clone(state),
        }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.state.active_connections.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Await a handler future, turning a panic into a 500 response
async fn recover_panic<F>(handler: F, http_config: &HttpConfig) -> Response<Full<Bytes>>
where
    F: Future<Output = Result<Response<Full<Bytes>>, Infallible>>,
{
    match AssertUnwindSafe(handler).catch_unwind().await {
        Ok(Ok(response)) => response,
        Ok(Err(never)) => match never {},
        Err(payload) => {
            logger::log_error(&format!("Request handler panicked: {}", panic_message(payload.as_ref())));
            let mut response = http::build_500_response("request handler panicked");
            http::apply_common_headers(&mut response, &http_config.server_name, http_config.enable_cors);
            response
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

/// Run the request handler, then log status and latency of the finished response
async fn serve_with_access_log<B>(
    req: Request<B>,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let logging = &state.config.logging;
    let http_config = &state.config.http;
    if !logging.access_log {
        return Ok(recover_panic(handler::handle_request(req, Arc::clone(&state)), http_config).await);
    }

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = version_label(req.version()).to_string();
    entry.referer = header_string(&req, &header::REFERER);
    entry.user_agent = header_string(&req, &header::USER_AGENT);

    let started = Instant::now();
    let response = recover_panic(handler::handle_request(req, Arc::clone(&state)), http_config).await;
    entry.latency = started.elapsed();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .body()
        .size_hint()
        .exact()
        .map_or(0, |n| usize::try_from(n).unwrap_or(usize::MAX));

    logger::log_access(&entry, &logging.access_log_format);
    Ok(response)
}

fn header_string<B>(req: &Request<B>, name: &HeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
