//! Outbound request forwarding.
//!
//! The forwarder issues the outbound HTTP request to the origin host with
//! the same method, headers, and (fully buffered) body as the inbound
//! request. Automatic client-side redirect handling is disabled and replaced
//! with an explicit hop loop so that the original headers and body are
//! replayed verbatim on every redirect hop — the proxy behaves as if the
//! client itself followed the redirect with identical request semantics.

use crate::config::Settings;
use crate::error::ProxyError;
use bytes::Bytes;
use hyper::header::{HeaderMap, LOCATION};
use hyper::{Method, StatusCode};
use once_cell::sync::OnceCell;
use reqwest::{redirect, Client, Url};
use std::time::Duration;
use tracing::debug;

/// Maximum redirect hops replayed before giving up with a transport error.
const MAX_REDIRECT_HOPS: usize = 10;

/// A fully buffered upstream response.
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Shared outbound HTTP client, built lazily from the process settings.
///
/// Lazy construction keeps the upstream-proxy URL check at forward time: a
/// malformed `settings.proxy` surfaces per-request as a 502, matching the
/// configuration contract, instead of failing startup.
pub struct Forwarder {
    settings: Settings,
    client: OnceCell<Client>,
}

impl Forwarder {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            client: OnceCell::new(),
        }
    }

    fn client(&self) -> Result<&Client, ProxyError> {
        self.client.get_or_try_init(|| {
            let mut builder = Client::builder()
                .redirect(redirect::Policy::none())
                .timeout(Duration::from_secs(self.settings.request_timeout_secs));

            if let Some(ref proxy_url) = self.settings.proxy {
                let proxy = reqwest::Proxy::all(proxy_url.as_str()).map_err(|e| {
                    ProxyError::InvalidUpstreamProxy {
                        message: format!("{proxy_url}: {e}"),
                    }
                })?;
                builder = builder.proxy(proxy);
            }

            builder
                .build()
                .map_err(|e| ProxyError::transport(format!("failed to build outbound client: {e}")))
        })
    }

    /// Execute the outbound request, replaying it across redirects.
    ///
    /// Any transport-level failure (connection refused, DNS, TLS, timeout)
    /// surfaces as a single [`ProxyError::Transport`]; there is no retry.
    pub async fn forward(
        &self,
        method: Method,
        url: Url,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<UpstreamResponse, ProxyError> {
        let client = self.client()?;

        let mut url = url;
        for hop in 0..MAX_REDIRECT_HOPS {
            let response = client
                .request(method.clone(), url.clone())
                .headers(headers.clone())
                .body(body.clone())
                .send()
                .await
                .map_err(|e| ProxyError::transport(e.to_string()))?;

            if let Some(next) = redirect_target(&response, &url)? {
                debug!(hop, from = %url, to = %next, "replaying request across redirect");
                url = next;
                continue;
            }

            let status = response.status();
            let response_headers = response.headers().clone();
            let body = response
                .bytes()
                .await
                .map_err(|e| ProxyError::transport(format!("failed to read upstream body: {e}")))?;
            return Ok(UpstreamResponse {
                status,
                headers: response_headers,
                body,
            });
        }

        Err(ProxyError::transport(format!(
            "stopped after {MAX_REDIRECT_HOPS} redirects for {url}"
        )))
    }
}

/// The next URL to replay against, if this response is a followable
/// redirect.
///
/// Only genuine redirect statuses with a `Location` header are followed;
/// a 304 is 3xx but carries no redirect semantics, and a redirect status
/// without a `Location` is delivered to the client as-is (after rewriting).
fn redirect_target(response: &reqwest::Response, current: &Url) -> Result<Option<Url>, ProxyError> {
    let followable = matches!(
        response.status(),
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    );
    if !followable {
        return Ok(None);
    }

    let Some(location) = response.headers().get(LOCATION).and_then(|v| v.to_str().ok()) else {
        return Ok(None);
    };

    // Location may be relative; resolve it against the current URL.
    let next = current.join(location).map_err(|e| {
        ProxyError::transport(format!("invalid redirect target '{location}': {e}"))
    })?;
    Ok(Some(next))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_without_proxy_builds() {
        let forwarder = Forwarder::new(Settings::default());
        assert!(forwarder.client().is_ok());
    }

    #[test]
    fn test_client_with_valid_proxy_builds() {
        let settings = Settings {
            proxy: Some("http://squid.internal:3128".to_string()),
            ..Default::default()
        };
        let forwarder = Forwarder::new(settings);
        assert!(forwarder.client().is_ok());
    }

    #[test]
    fn test_invalid_proxy_url_is_per_request_error() {
        let settings = Settings {
            proxy: Some("not a valid proxy url".to_string()),
            ..Default::default()
        };
        let forwarder = Forwarder::new(settings);

        // Construction succeeds; the bad URL only surfaces when a forward
        // first needs the client.
        let err = forwarder.client().unwrap_err();
        assert!(matches!(err, ProxyError::InvalidUpstreamProxy { .. }));
        assert_eq!(err.client_status(), 502);
    }
}
