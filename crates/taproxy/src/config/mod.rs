//! Configuration for the proxy process.
//!
//! Everything here is read once at startup, validated, and frozen before
//! the listener binds; request handlers only ever see it by shared
//! reference.

mod target;

pub use target::{Target, TargetError};

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    /// Address the proxy listens on.
    pub listen: SocketAddr,
    /// The upstream every request is forwarded to.
    pub target: Target,
    /// Path of the append-only audit log.
    pub log_path: PathBuf,
}

impl Config {
    /// Build and validate the process configuration from raw flag values.
    pub fn new(
        listen: &str,
        target: &str,
        log_path: impl Into<PathBuf>,
    ) -> Result<Self, anyhow::Error> {
        let listen = parse_listen_addr(listen)
            .with_context(|| format!("invalid listen address '{listen}'"))?;
        let target = Target::resolve(target)?;

        Ok(Self {
            listen,
            target,
            log_path: log_path.into(),
        })
    }
}

/// Parse a listen flag, accepting bare `:port` for all interfaces.
pub fn parse_listen_addr(raw: &str) -> Result<SocketAddr, std::net::AddrParseError> {
    if let Some(port) = raw.strip_prefix(':') {
        format!("0.0.0.0:{port}").parse()
    } else {
        raw.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_listen_addr_port_only() {
        let addr = parse_listen_addr(":8090").unwrap();
        assert_eq!(addr.to_string(), "0.0.0.0:8090");
    }

    #[test]
    fn test_parse_listen_addr_full() {
        let addr = parse_listen_addr("127.0.0.1:8080").unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:8080");
    }

    #[test]
    fn test_parse_listen_addr_invalid() {
        assert!(parse_listen_addr("not-an-address").is_err());
        assert!(parse_listen_addr(":").is_err());
    }

    #[test]
    fn test_config_validates_target() {
        assert!(Config::new(":8090", "example.com", "proxy.log").is_err());
        let config = Config::new(":8090", "http://example.com", "proxy.log").unwrap();
        assert_eq!(config.target.authority().as_str(), "example.com");
        assert_eq!(config.log_path, PathBuf::from("proxy.log"));
    }
}
