//! Per-request forwarding pipeline.
//!
//! One inbound request flows through a fixed sequence: record the request
//! dump, rewrite the destination, dispatch upstream, record the response
//! dump, deliver. Bodies are single-consumption streams, so each side of
//! the exchange is buffered exactly once and the same buffer feeds both
//! the audit log and the wire.

use super::client::HttpClient;
use super::forwarding::{error_response, forward_request, rewrite_request};
use crate::audit::{render_request, render_response, AuditLog, REQUEST_LABEL, RESPONSE_LABEL};
use crate::config::Target;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::{Request, Response};
use std::convert::Infallible;
use tracing::{debug, error};

/// Per-request view of the shared server state.
pub struct ProxyContext<'a> {
    pub client: &'a HttpClient,
    pub target: &'a Target,
    pub audit: &'a AuditLog,
}

/// Handle one inbound request.
///
/// Never returns an error: upstream failures degrade to a gateway error
/// response and audit failures are swallowed by the sink, so a bad
/// exchange cannot take down the connection task serving it.
pub async fn handle_request(
    ctx: &ProxyContext<'_>,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let (parts, body) = req.into_parts();
    debug!("Received request: {} {}", parts.method, parts.uri);

    let body_bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            error!("Failed to read request body: {}", e);
            // The headers still make it into the audit trail.
            ctx.audit
                .record(REQUEST_LABEL, &render_request(&parts, b""))
                .await;
            return Ok(error_response(400, "Failed to read request body"));
        }
    };

    ctx.audit
        .record(REQUEST_LABEL, &render_request(&parts, &body_bytes))
        .await;

    let mut upstream_req = Request::from_parts(parts, Full::new(body_bytes));
    rewrite_request(&mut upstream_req, ctx.target);

    match forward_request(ctx.client, upstream_req).await {
        Ok((parts, body_bytes)) => {
            ctx.audit
                .record(RESPONSE_LABEL, &render_response(&parts, &body_bytes))
                .await;
            Ok(Response::from_parts(parts, Full::new(body_bytes)))
        }
        Err(e) => {
            error!("Failed to forward request to upstream: {}", e);
            Ok(error_response(502, "Bad Gateway"))
        }
    }
}
