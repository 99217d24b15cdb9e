//! The response pipeline: classify, decode, substitute.

use super::{classify, codec, substitute};
use crate::config::Config;
use crate::error::ProxyError;
use bytes::Bytes;
use hyper::header::{
    HeaderMap, HeaderValue, CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE, TRANSFER_ENCODING,
};
use hyper::StatusCode;
use tracing::debug;

/// Rewrite an upstream response in place: headers always, the body only when
/// the response is rewritable.
///
/// A 304 is never body-rewritten (it carries no body), and non-textual
/// content is passed through byte-identical. When the body is rewritten the
/// `Content-Encoding`, `Content-Length`, and `Transfer-Encoding` headers are
/// removed: the outbound body is sent uncompressed and unchunked, with the
/// length implied by framing, rather than re-compressed.
///
/// A decode failure aborts the whole response; there is no degraded delivery
/// of an un-rewritten body.
pub fn rewrite_response(
    status: StatusCode,
    headers: &mut HeaderMap,
    body: Bytes,
    config: &Config,
) -> Result<Bytes, ProxyError> {
    let content_type = header_str(headers, &CONTENT_TYPE);
    let content_encoding = header_str(headers, &CONTENT_ENCODING);

    let body = if status != StatusCode::NOT_MODIFIED && classify::is_textual(&content_type) {
        let text = codec::decode(&body, &content_encoding)?;
        let rewritten =
            substitute::rewrite_hosts(&text, &config.host_rules, config.alias_uses_https);
        debug!(
            content_type = %content_type,
            decoded_len = text.len(),
            rewritten_len = rewritten.len(),
            "rewrote textual body"
        );
        headers.remove(CONTENT_ENCODING);
        headers.remove(CONTENT_LENGTH);
        headers.remove(TRANSFER_ENCODING);
        Bytes::from(rewritten)
    } else {
        body
    };

    rewrite_headers(headers, config);
    Ok(body)
}

/// Run the substitutor over every header value, in place.
///
/// All headers are rewritten, not just body-related ones: origin hostnames
/// leak through `Location`, `Set-Cookie` domain attributes, and the like.
/// Multi-valued headers are rewritten independently, preserving order.
/// Values that are not valid UTF-8 (or whose rewritten form is not a valid
/// header value) pass through untouched.
pub fn rewrite_headers(headers: &mut HeaderMap, config: &Config) {
    let mut rewritten = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers.iter() {
        let replacement = value
            .to_str()
            .ok()
            .map(|text| {
                substitute::rewrite_hosts(text, &config.host_rules, config.alias_uses_https)
            })
            .and_then(|text| HeaderValue::from_str(&text).ok());
        match replacement {
            Some(new_value) => rewritten.append(name.clone(), new_value),
            None => rewritten.append(name.clone(), value.clone()),
        };
    }
    *headers = rewritten;
}

fn header_str(headers: &HeaderMap, name: &hyper::header::HeaderName) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string()
}
