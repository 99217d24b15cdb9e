//! # Veil
//!
//! A transparent HTTP reverse proxy that lets alias hostnames stand in for
//! origin hostnames. Requests addressed to an alias are forwarded to the
//! matching origin, and origin-identifying strings in the response (header
//! values and textual bodies) are rewritten back to the alias form before
//! the response reaches the client.
//!
//! # Module Structure
//!
//! - `config` - YAML configuration loading and validation
//! - `error` - Error types and client status mapping
//! - `hostmap` - Alias-to-origin hostname resolution
//! - `rewrite` - Content classification, body decoding, and host substitution
//! - `proxy` - The HTTP server, request handler, and outbound forwarder

pub mod config;
pub mod error;
pub mod hostmap;
pub mod proxy;
pub mod rewrite;

pub use config::{Config, HostRule, Settings};
pub use error::{ProxyError, Result};
pub use hostmap::HostMap;
pub use proxy::ProxyServer;
