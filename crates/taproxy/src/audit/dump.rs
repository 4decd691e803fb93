//! Wire-format dumps of HTTP messages.
//!
//! Rendering operates on message parts plus an already-buffered body, so
//! producing a dump can never consume a stream another stage still needs.
//! Bodies are copied verbatim; no attempt is made to re-encode or pretty
//! print them.

use hyper::http::{request, response};
use hyper::HeaderMap;

/// Render a request as start line, header lines, and raw body bytes.
pub fn render_request(parts: &request::Parts, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + 256);
    let path = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    out.extend_from_slice(format!("{} {} {:?}\r\n", parts.method, path, parts.version).as_bytes());
    render_headers(&parts.headers, &mut out);
    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(body);
    out
}

/// Render a response as status line, header lines, and raw body bytes.
pub fn render_response(parts: &response::Parts, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + 256);
    let reason = parts.status.canonical_reason().unwrap_or("");
    out.extend_from_slice(
        format!("{:?} {} {}\r\n", parts.version, parts.status.as_str(), reason).as_bytes(),
    );
    render_headers(&parts.headers, &mut out);
    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(body);
    out
}

fn render_headers(headers: &HeaderMap, out: &mut Vec<u8>) {
    for (name, value) in headers {
        out.extend_from_slice(name.as_str().as_bytes());
        out.extend_from_slice(b": ");
        out.extend_from_slice(value.as_bytes());
        out.extend_from_slice(b"\r\n");
    }
}
