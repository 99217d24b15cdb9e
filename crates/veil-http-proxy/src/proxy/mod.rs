//! Proxy server module.
//!
//! # Module Structure
//!
//! - `server` - ProxyServer struct and accept loop
//! - `handler` - per-request handling and error translation
//! - `forwarder` - outbound HTTP client with redirect replay
//! - `network` - network listener utilities

mod forwarder;
mod handler;
mod network;
mod server;

pub use forwarder::{Forwarder, UpstreamResponse};
pub use handler::error_response;
pub use server::ProxyServer;
