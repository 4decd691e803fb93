//! Request rewriting and upstream dispatch.
//!
//! `rewrite_request` is the one policy point that decides where a request
//! goes: it swaps the destination onto the configured target and corrects
//! the `Host` header, touching nothing else. Future routing (path
//! rewrites, multi-target selection) belongs here.

use super::client::HttpClient;
use crate::config::Target;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::{
    HeaderName, CONNECTION, HOST, PROXY_AUTHENTICATE, PROXY_AUTHORIZATION, TE, TRAILER,
    TRANSFER_ENCODING, UPGRADE,
};
use hyper::http::response;
use hyper::http::uri::PathAndQuery;
use hyper::{HeaderMap, Request, Response, Uri};
use thiserror::Error;
use tracing::debug;

static KEEP_ALIVE: HeaderName = HeaderName::from_static("keep-alive");
static PROXY_CONNECTION: HeaderName = HeaderName::from_static("proxy-connection");

#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("upstream request failed: {0}")]
    Dispatch(#[from] hyper_util::client::legacy::Error),
    #[error("failed to read upstream response body: {0}")]
    UpstreamBody(#[from] hyper::Error),
}

/// Helper function to create an error response.
pub fn error_response(status: u16, message: &str) -> Response<Full<Bytes>> {
    let body = format!(r#"{{"error": "{message}"}}"#);
    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from(body)))
        .unwrap()
}

/// Point a request at the configured target.
///
/// Sets the URI scheme and authority and the `Host` header; method, path,
/// query, remaining headers, and body pass through untouched.
pub fn rewrite_request(req: &mut Request<Full<Bytes>>, target: &Target) {
    let mut uri_parts = req.uri().clone().into_parts();
    uri_parts.scheme = Some(target.scheme().clone());
    uri_parts.authority = Some(target.authority().clone());
    if uri_parts.path_and_query.is_none() {
        uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    if let Ok(uri) = Uri::from_parts(uri_parts) {
        *req.uri_mut() = uri;
    }
    req.headers_mut().insert(HOST, target.host_value());
}

/// Dispatch a rewritten request and materialize the upstream response.
///
/// The response body is collected into memory so the caller can both
/// record it and deliver it. Connection failures and unreadable response
/// bodies surface as `ForwardError`; the caller degrades them to a
/// gateway error.
pub async fn forward_request(
    client: &HttpClient,
    mut req: Request<Full<Bytes>>,
) -> Result<(response::Parts, Bytes), ForwardError> {
    strip_hop_by_hop_headers(req.headers_mut());
    debug!("Forwarding to: {}", req.uri());

    let upstream_response = client.request(req).await?;
    let (mut parts, body) = upstream_response.into_parts();
    let body_bytes = body.collect().await?.to_bytes();
    strip_hop_by_hop_headers(&mut parts.headers);

    Ok((parts, body_bytes))
}

/// Remove hop-by-hop headers, which apply to a single connection only.
fn strip_hop_by_hop_headers(headers: &mut HeaderMap) {
    // Headers named by Connection are connection-scoped too.
    let named: Vec<HeaderName> = headers
        .get_all(&CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|token| HeaderName::from_bytes(token.trim().as_bytes()).ok())
        .collect();
    for name in named {
        headers.remove(&name);
    }

    headers.remove(&CONNECTION);
    headers.remove(&KEEP_ALIVE);
    headers.remove(&PROXY_CONNECTION);
    headers.remove(&PROXY_AUTHENTICATE);
    headers.remove(&PROXY_AUTHORIZATION);
    headers.remove(&TE);
    headers.remove(&TRAILER);
    headers.remove(&TRANSFER_ENCODING);
    headers.remove(&UPGRADE);
}
