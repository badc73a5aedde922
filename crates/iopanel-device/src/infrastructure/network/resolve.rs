//! Server address resolution.
//!
//! # Two ways to name a server (for beginners)
//!
//! - **IP literal** (`"10.0.0.24"`): the server listens on the fixed default
//!   port, so the address is simply `ip:1976`.
//! - **Hostname** (`"panel.example.org"`): the server sits behind a router
//!   that assigns ports dynamically.  The device first asks the router which
//!   port to use with an HTTP `GET http://<host><port_lookup_path>`; the
//!   response body is the port as decimal text.  Then the hostname is
//!   resolved through DNS as usual.
//!
//! Resolution runs on every connect, so a server that moved to another port
//! is found again after a reconnect.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use tokio::net::lookup_host;
use tracing::debug;

use super::NetworkError;
use crate::infrastructure::storage::config::NetworkConfig;

/// Where the server is, as configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerTarget {
    pub host: String,
    pub default_port: u16,
    pub port_lookup_path: String,
}

impl ServerTarget {
    pub fn from_config(cfg: &NetworkConfig) -> Self {
        Self {
            host: cfg.server_address.trim().to_string(),
            default_port: cfg.default_port,
            port_lookup_path: cfg.port_lookup_path.clone(),
        }
    }

    /// The address to use directly if `host` is an IP literal.
    pub fn literal_addr(&self) -> Option<SocketAddr> {
        self.host
            .parse::<IpAddr>()
            .ok()
            .map(|ip| SocketAddr::new(ip, self.default_port))
    }

    pub fn port_lookup_url(&self) -> String {
        format!("http://{}{}", self.host, self.port_lookup_path)
    }
}

/// Builds the HTTP client used for port lookups.
///
/// # Errors
///
/// Returns the underlying [`reqwest::Error`] if the TLS backend cannot be
/// initialised.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().timeout(timeout).build()
}

/// Parses the body of a port lookup response.
///
/// # Errors
///
/// Returns [`NetworkError::InvalidPort`] unless the trimmed body is a
/// decimal number in `1..=65535`.
pub fn parse_port(body: &str) -> Result<u16, NetworkError> {
    match body.trim().parse::<u16>() {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(NetworkError::InvalidPort {
            body: body.to_string(),
        }),
    }
}

/// Resolves `target` to a socket address.
///
/// # Errors
///
/// - [`NetworkError::PortLookup`] if the HTTP request fails or returns a
///   non-success status.
/// - [`NetworkError::InvalidPort`] if the response body is not a port.
/// - [`NetworkError::Unresolved`] if DNS yields no address.
pub async fn resolve_server(
    target: &ServerTarget,
    http: &reqwest::Client,
) -> Result<SocketAddr, NetworkError> {
    if let Some(addr) = target.literal_addr() {
        return Ok(addr);
    }

    let url = target.port_lookup_url();
    debug!("looking up server port at {url}");
    let body = http
        .get(&url)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|source| NetworkError::PortLookup {
            url: url.clone(),
            source,
        })?
        .text()
        .await
        .map_err(|source| NetworkError::PortLookup { url, source })?;
    let port = parse_port(&body)?;

    lookup_host((target.host.as_str(), port))
        .await?
        .next()
        .ok_or_else(|| NetworkError::Unresolved {
            host: target.host.clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(host: &str) -> ServerTarget {
        ServerTarget::from_config(&NetworkConfig {
            server_address: host.to_string(),
            ..NetworkConfig::default()
        })
    }

    #[test]
    fn test_ip_literal_uses_default_port() {
        let addr = target("10.0.0.24").literal_addr().unwrap();
        assert_eq!(addr, "10.0.0.24:1976".parse().unwrap());
    }

    #[test]
    fn test_ipv6_literal_is_recognised() {
        let addr = target("::1").literal_addr().unwrap();
        assert_eq!(addr.port(), 1976);
        assert!(addr.is_ipv6());
    }

    #[test]
    fn test_hostname_is_not_a_literal() {
        let t = target(" panel.example.org ");
        assert!(t.literal_addr().is_none());
        assert_eq!(
            t.port_lookup_url(),
            "http://panel.example.org/services/routes/phone-iot/port"
        );
    }

    #[test]
    fn test_parse_port_accepts_decimal_with_whitespace() {
        assert_eq!(parse_port("4242\n").unwrap(), 4242);
    }

    #[test]
    fn test_parse_port_rejects_garbage_and_zero() {
        assert!(parse_port("not a port").is_err());
        assert!(parse_port("0").is_err());
        assert!(parse_port("70000").is_err());
    }

    #[tokio::test]
    async fn test_literal_resolves_without_http() {
        // Arrange – a client that would fail any request instantly
        let http = http_client(Duration::from_millis(1)).unwrap();

        // Act
        let addr = resolve_server(&target("127.0.0.1"), &http).await.unwrap();

        // Assert
        assert_eq!(addr, "127.0.0.1:1976".parse().unwrap());
    }
}
