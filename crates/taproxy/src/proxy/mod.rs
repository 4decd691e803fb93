//! Proxy server module.
//!
//! # Module Structure
//!
//! - `server` - ProxyServer struct and main run loop
//! - `handler` - per-request forwarding pipeline
//! - `forwarding` - request rewriting and upstream dispatch
//! - `client` - shared outbound HTTP client

mod client;
mod forwarding;
mod handler;
mod server;

pub use client::{create_http_client, HttpClient};
pub use forwarding::{error_response, forward_request, rewrite_request, ForwardError};
pub use server::ProxyServer;
