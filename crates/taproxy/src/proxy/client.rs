//! HTTP client creation and configuration.
//!
//! The proxy keeps one shared client for its outbound side; hyper's
//! legacy client pools connections to the upstream per host.

use anyhow::Context;
use bytes::Bytes;
use http_body_util::Full;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

/// Type alias for the HTTP client used by the proxy.
pub type HttpClient = Client<hyper_rustls::HttpsConnector<HttpConnector>, Full<Bytes>>;

/// Create the shared outbound HTTP client.
///
/// Speaks plain HTTP or TLS depending on the target scheme; certificates
/// are verified against the platform's native roots.
pub fn create_http_client() -> Result<HttpClient, anyhow::Error> {
    let https_connector = hyper_rustls::HttpsConnectorBuilder::new()
        .with_native_roots()
        .context("failed to load native root certificates")?
        .https_or_http()
        .enable_http1()
        .build();

    Ok(Client::builder(TokioExecutor::new()).build(https_connector))
}
