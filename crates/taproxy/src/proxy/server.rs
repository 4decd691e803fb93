//! ProxyServer struct and main run loop.

use super::client::{create_http_client, HttpClient};
use super::handler::{handle_request, ProxyContext};
use crate::audit::AuditLog;
use crate::config::Config;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

/// The proxy server: one listener, one upstream, one audit log.
pub struct ProxyServer {
    config: Arc<Config>,
    http_client: HttpClient,
    audit: Arc<AuditLog>,
}

impl ProxyServer {
    /// Create a new ProxyServer from validated configuration.
    pub fn new(config: Config, audit: AuditLog) -> Result<Self, anyhow::Error> {
        let http_client = create_http_client()?;
        Ok(Self {
            config: Arc::new(config),
            http_client,
            audit: Arc::new(audit),
        })
    }

    /// Bind the configured listen address and serve until the process exits.
    pub async fn run(self) -> Result<(), anyhow::Error> {
        let listener = TcpListener::bind(self.config.listen).await?;
        self.serve(listener).await
    }

    /// Accept connections on an already-bound listener.
    ///
    /// Each connection gets its own task; a failing connection or request
    /// is logged and contained there, never propagated to the accept loop.
    pub async fn serve(self, listener: TcpListener) -> Result<(), anyhow::Error> {
        let addr = listener.local_addr()?;
        info!("Listening on http://{}", addr);
        info!("Forwarding requests to {}", self.config.target);

        let server = Arc::new(self);

        loop {
            let (stream, remote_addr) = listener.accept().await?;
            let server = Arc::clone(&server);

            tokio::spawn(async move {
                let io = TokioIo::new(stream);
                let service = service_fn(move |req| {
                    let server = Arc::clone(&server);
                    async move {
                        let ctx = ProxyContext {
                            client: &server.http_client,
                            target: &server.config.target,
                            audit: &server.audit,
                        };
                        handle_request(&ctx, req).await
                    }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    error!("Error serving connection from {}: {}", remote_addr, err);
                }
            });
        }
    }
}
