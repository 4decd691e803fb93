//! Upstream target resolution.

use std::fmt;

use hyper::header::HeaderValue;
use hyper::http::uri::{Authority, Scheme};
use hyper::Uri;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TargetError {
    #[error("invalid target address '{raw}': {source}")]
    Invalid {
        raw: String,
        #[source]
        source: hyper::http::uri::InvalidUri,
    },
    #[error("target address '{0}' is missing a scheme (expected e.g. http://host:port)")]
    MissingScheme(String),
    #[error("target address '{0}' has a missing or invalid host")]
    MissingHost(String),
    #[error("unsupported target scheme '{0}'. Currently supported: http, https")]
    UnsupportedScheme(String),
}

/// The single upstream every request is forwarded to.
///
/// Parsed once at startup and shared read-only for the process lifetime.
/// The `Host` header value sent upstream is pre-computed here so the
/// per-request rewrite never has to re-validate it.
#[derive(Debug, Clone)]
pub struct Target {
    scheme: Scheme,
    authority: Authority,
    host_header: HeaderValue,
}

impl Target {
    /// Parse and validate a raw target address.
    ///
    /// The address must carry a supported scheme and a host; anything
    /// else refuses to resolve so the process never starts serving
    /// against a half-specified upstream.
    pub fn resolve(raw: &str) -> Result<Self, TargetError> {
        let uri: Uri = raw.parse().map_err(|source| TargetError::Invalid {
            raw: raw.to_string(),
            source,
        })?;

        let scheme = uri
            .scheme()
            .cloned()
            .ok_or_else(|| TargetError::MissingScheme(raw.to_string()))?;
        match scheme.as_str() {
            "http" | "https" => {}
            other => return Err(TargetError::UnsupportedScheme(other.to_string())),
        }

        let authority = uri
            .authority()
            .cloned()
            .ok_or_else(|| TargetError::MissingHost(raw.to_string()))?;
        let host_header = HeaderValue::from_str(authority.as_str())
            .map_err(|_| TargetError::MissingHost(raw.to_string()))?;

        Ok(Self {
            scheme,
            authority,
            host_header,
        })
    }

    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// `Host` header value for outbound requests.
    pub fn host_value(&self) -> HeaderValue {
        self.host_header.clone()
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.authority)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_http_target() {
        let target = Target::resolve("http://localhost:9000").unwrap();
        assert_eq!(target.scheme().as_str(), "http");
        assert_eq!(target.authority().as_str(), "localhost:9000");
        assert_eq!(target.host_value().to_str().unwrap(), "localhost:9000");
    }

    #[test]
    fn test_resolve_https_target_without_port() {
        let target = Target::resolve("https://example.com").unwrap();
        assert_eq!(target.scheme().as_str(), "https");
        assert_eq!(target.authority().as_str(), "example.com");
    }

    #[test]
    fn test_resolve_missing_scheme() {
        assert!(matches!(
            Target::resolve("example.com:8000"),
            Err(TargetError::MissingScheme(_))
        ));
    }

    #[test]
    fn test_resolve_unsupported_scheme() {
        assert!(matches!(
            Target::resolve("ftp://example.com"),
            Err(TargetError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn test_resolve_rejects_garbage() {
        assert!(Target::resolve("http://").is_err());
        assert!(Target::resolve("not a url").is_err());
    }

    #[test]
    fn test_display_round_trips() {
        let target = Target::resolve("http://backend:9000").unwrap();
        assert_eq!(target.to_string(), "http://backend:9000");
    }
}
