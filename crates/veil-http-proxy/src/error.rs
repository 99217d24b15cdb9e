//! Error types for the proxy.
//!
//! Everything except configuration loading is handled at the request-handler
//! boundary: the error is logged with method and URL context, translated to a
//! client-visible status via [`ProxyError::client_status`], and the request
//! terminates. Nothing is retried and nothing crashes the process.

use thiserror::Error;

/// Main error type for the proxy.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// Configuration file missing or malformed. Fatal at startup.
    #[error("failed to load configuration: {message}")]
    ConfigLoad { message: String },

    /// The inbound request's host has no alias rule.
    #[error("no host rule for alias '{alias}'")]
    HostNotMapped { alias: String },

    /// Malformed upstream proxy URL in configuration. Checked lazily at
    /// forward time, not at startup.
    #[error("invalid upstream proxy URL: {message}")]
    InvalidUpstreamProxy { message: String },

    /// Any failure reaching or reading from the origin.
    #[error("upstream transport error: {message}")]
    Transport { message: String },

    /// Malformed compressed response body.
    #[error("failed to decode response body: {message}")]
    BodyDecode { message: String },

    /// I/O error wrapper.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProxyError {
    /// Creates a new transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates a new body decode error.
    pub fn body_decode(message: impl Into<String>) -> Self {
        Self::BodyDecode {
            message: message.into(),
        }
    }

    /// The HTTP status the original client receives for this error.
    pub fn client_status(&self) -> u16 {
        match self {
            Self::HostNotMapped { .. } => 404,
            Self::InvalidUpstreamProxy { .. } | Self::Transport { .. } => 502,
            Self::BodyDecode { .. } => 500,
            Self::ConfigLoad { .. } | Self::Io(_) => 500,
        }
    }
}

/// Result type alias using ProxyError.
pub type Result<T> = std::result::Result<T, ProxyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProxyError::HostNotMapped {
            alias: "alias.example".to_string(),
        };
        assert!(err.to_string().contains("alias.example"));

        let err = ProxyError::body_decode("gzip reader error");
        assert!(err.to_string().contains("gzip reader error"));
    }

    #[test]
    fn test_client_status_mapping() {
        let not_mapped = ProxyError::HostNotMapped {
            alias: "a".to_string(),
        };
        assert_eq!(not_mapped.client_status(), 404);

        assert_eq!(ProxyError::transport("refused").client_status(), 502);
        let bad_proxy = ProxyError::InvalidUpstreamProxy {
            message: "no scheme".to_string(),
        };
        assert_eq!(bad_proxy.client_status(), 502);
        assert_eq!(ProxyError::body_decode("truncated").client_status(), 500);
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let proxy_err: ProxyError = io_err.into();
        assert!(matches!(proxy_err, ProxyError::Io(_)));
    }
}
