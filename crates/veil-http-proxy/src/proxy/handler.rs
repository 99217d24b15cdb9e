//! Per-request handling.
//!
//! Each inbound request is resolved against the host map, forwarded to its
//! origin, and the upstream response is run through the rewrite pipeline
//! before being returned. All errors are translated to client-visible
//! statuses here; nothing is retried and nothing escalates past this
//! boundary.

use super::forwarder::Forwarder;
use crate::config::Config;
use crate::hostmap::HostMap;
use crate::rewrite;
use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::header::{HeaderValue, CONNECTION, CONTENT_LENGTH, HOST, TRANSFER_ENCODING};
use hyper::{Request, Response};
use reqwest::Url;
use std::convert::Infallible;
use tracing::{debug, error, warn};

/// Context for handling a request, containing all shared state.
///
/// Handlers receive the configuration and forwarder explicitly; there are
/// no process-wide globals.
pub struct RequestHandlerContext<'a> {
    pub config: &'a Config,
    pub host_map: &'a HostMap,
    pub forwarder: &'a Forwarder,
}

/// Helper function to create an error response.
pub fn error_response(status: u16, message: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({ "error": message }).to_string();
    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from(body)))
        .unwrap()
}

/// Handle an incoming request: resolve, forward, rewrite.
pub async fn handle_request(
    ctx: &RequestHandlerContext<'_>,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let uri = req.uri().clone();
    debug!("Received request: {} {}", method, uri);

    // The alias is whatever host the client dialed.
    let alias = req
        .headers()
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| uri.authority().map(|a| a.as_str().to_string()))
        .unwrap_or_default();

    let Some(origin) = ctx.host_map.resolve_origin(&alias) else {
        warn!("{} {}: no host rule for alias '{}'", method, uri, alias);
        return Ok(error_response(404, "Not Found"));
    };
    let origin = origin.to_string();

    let scheme = if ctx.config.origin_uses_https {
        "https"
    } else {
        "http"
    };
    let path = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    let target_url = match Url::parse(&format!("{scheme}://{origin}{path}")) {
        Ok(url) => url,
        Err(e) => {
            error!("{} {}: cannot build origin URL for '{}': {}", method, uri, origin, e);
            return Ok(error_response(502, "Bad Gateway"));
        }
    };

    // Carry the inbound headers, minus framing and connection headers (the
    // buffered outbound body is reframed by the client), with Host pointing
    // at the origin.
    let mut outbound_headers = req.headers().clone();
    outbound_headers.remove(HOST);
    outbound_headers.remove(CONTENT_LENGTH);
    outbound_headers.remove(TRANSFER_ENCODING);
    outbound_headers.remove(CONNECTION);
    if let Ok(host_value) = HeaderValue::from_str(&origin) {
        outbound_headers.insert(HOST, host_value);
    }

    // Buffer the inbound body so it can be replayed across redirects. The
    // bound keeps adversarial uploads from consuming unbounded memory.
    let limit = ctx.config.settings.max_body_bytes;
    let body_bytes = match Limited::new(req.into_body(), limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            if e.downcast_ref::<LengthLimitError>().is_some() {
                warn!("{} {}: request body exceeds {} bytes", method, uri, limit);
                return Ok(error_response(413, "Payload Too Large"));
            }
            error!("{} {}: failed to read request body: {}", method, uri, e);
            return Ok(error_response(500, "Failed to read request body"));
        }
    };

    let upstream = match ctx
        .forwarder
        .forward(method.clone(), target_url, outbound_headers, body_bytes)
        .await
    {
        Ok(upstream) => upstream,
        Err(e) => {
            error!("{} {}: {}", method, uri, e);
            return Ok(error_response(e.client_status(), "Bad Gateway"));
        }
    };

    let status = upstream.status;
    let mut headers = upstream.headers;
    let body = match rewrite::rewrite_response(status, &mut headers, upstream.body, ctx.config) {
        Ok(body) => body,
        Err(e) => {
            error!("{} {}: {}", method, uri, e);
            return Ok(error_response(e.client_status(), "Failed to rewrite response"));
        }
    };

    // Hop-by-hop headers are not forwarded; the body below is already
    // unchunked, so a stale Transfer-Encoding would corrupt framing.
    headers.remove(TRANSFER_ENCODING);
    headers.remove(CONNECTION);

    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}
