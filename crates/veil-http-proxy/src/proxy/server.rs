//! ProxyServer struct and main run loop.
//!
//! This module contains the ProxyServer struct which holds all shared state,
//! and the main run loop that accepts connections and handles requests.

use super::forwarder::Forwarder;
use super::handler::{handle_request, RequestHandlerContext};
use super::network::create_reusable_listener;
use crate::config::Config;
use crate::hostmap::HostMap;
use anyhow::Context;
use bytes::Bytes;
use http_body_util::Full;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

/// The main proxy server struct.
pub struct ProxyServer {
    config: Arc<Config>,
    host_map: Arc<HostMap>,
    forwarder: Arc<Forwarder>,
}

impl ProxyServer {
    /// Create a new ProxyServer from configuration.
    pub fn new(config: Config) -> Self {
        let host_map = HostMap::new(&config.host_rules);
        let forwarder = Forwarder::new(config.settings.clone());
        Self {
            config: Arc::new(config),
            host_map: Arc::new(host_map),
            forwarder: Arc::new(forwarder),
        }
    }

    /// Run the proxy server on the configured address.
    pub async fn run(self) -> Result<(), anyhow::Error> {
        let addr: SocketAddr = self
            .config
            .settings
            .address
            .parse()
            .with_context(|| format!("invalid listen address '{}'", self.config.settings.address))?;
        let listener = create_reusable_listener(addr)?;
        self.serve(listener).await
    }

    /// Accept connections on an already-bound listener and handle requests.
    pub async fn serve(self, listener: TcpListener) -> Result<(), anyhow::Error> {
        info!("Listening on http://{}", listener.local_addr()?);
        info!("Loaded {} host rules", self.config.host_rules.len());
        if let Some(ref proxy) = self.config.settings.proxy {
            info!("Forwarding through upstream proxy {}", proxy);
        }

        let server = Arc::new(self);

        loop {
            let (stream, remote_addr) = listener.accept().await?;
            let server = Arc::clone(&server);

            tokio::spawn(async move {
                let io = TokioIo::new(stream);
                let service = service_fn(move |req| {
                    let server = Arc::clone(&server);
                    async move { server.handle_request_internal(req).await }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    error!("Error serving connection from {}: {}", remote_addr, err);
                }
            });
        }
    }

    /// Internal request handler that builds the context and delegates to the
    /// handler module.
    async fn handle_request_internal(
        &self,
        req: hyper::Request<hyper::body::Incoming>,
    ) -> Result<hyper::Response<Full<Bytes>>, Infallible> {
        let ctx = RequestHandlerContext {
            config: self.config.as_ref(),
            host_map: self.host_map.as_ref(),
            forwarder: self.forwarder.as_ref(),
        };

        handle_request(&ctx, req).await
    }
}
