//! Network infrastructure for the device.
//!
//! Architecture:
//! - A [`Connector`] resolves the server address and opens a
//!   [`DatagramLink`]: a UDP socket `connect`ed to the server, so `recv`
//!   only ever sees the server's datagrams.
//! - [`runtime::PanelRuntime`] owns the engine and the current link and
//!   runs the event loop.
//!
//! Both seams are traits so tests can drive the runtime over in-memory
//! channels instead of real sockets.

pub mod resolve;
pub mod runtime;

use std::net::SocketAddr;

use async_trait::async_trait;
use thiserror::Error;
use tokio::net::UdpSocket;
use tracing::info;

use self::resolve::{resolve_server, ServerTarget};

/// Largest datagram the device accepts.
pub const MAX_DATAGRAM: usize = 65_536;

/// Errors that can occur in the device network layer.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// The server host could not be resolved to a socket address.
    #[error("could not resolve server {host}")]
    Unresolved { host: String },

    /// The HTTP routing-port lookup failed.
    #[error("port lookup at {url} failed: {source}")]
    PortLookup {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The routing-port lookup answered with something that is not a port.
    #[error("port lookup returned an invalid port: {body:?}")]
    InvalidPort { body: String },

    /// Binding or connecting the UDP socket failed.
    #[error("failed to connect to {addr}: {source}")]
    ConnectFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// An I/O error occurred on the established link.
    #[error("link I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The link was closed locally or by the transport.
    #[error("link closed")]
    Closed,
}

/// A connected, message-oriented link to the server.
#[async_trait]
pub trait DatagramLink: Send + Sync {
    /// Waits for the next datagram and copies it into `buf`.
    async fn recv(&self, buf: &mut [u8]) -> Result<usize, NetworkError>;

    /// Sends without waiting.  A full socket buffer is an error, not a wait.
    fn try_send(&self, datagram: &[u8]) -> Result<(), NetworkError>;
}

/// Opens fresh links to the server.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn DatagramLink>, NetworkError>;
}

// ── UDP ───────────────────────────────────────────────────────────────────────

pub struct UdpLink {
    socket: UdpSocket,
}

impl UdpLink {
    /// Binds an ephemeral local port and connects it to `server`.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::ConnectFailed`] if binding or connecting fails.
    pub async fn connect(server: SocketAddr) -> Result<Self, NetworkError> {
        let local: SocketAddr = if server.is_ipv4() {
            SocketAddr::from(([0, 0, 0, 0], 0))
        } else {
            SocketAddr::from(([0u16; 8], 0))
        };
        let socket = UdpSocket::bind(local)
            .await
            .map_err(|source| NetworkError::ConnectFailed { addr: server, source })?;
        socket
            .connect(server)
            .await
            .map_err(|source| NetworkError::ConnectFailed { addr: server, source })?;
        Ok(Self { socket })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, NetworkError> {
        Ok(self.socket.local_addr()?)
    }
}

#[async_trait]
impl DatagramLink for UdpLink {
    async fn recv(&self, buf: &mut [u8]) -> Result<usize, NetworkError> {
        Ok(self.socket.recv(buf).await?)
    }

    fn try_send(&self, datagram: &[u8]) -> Result<(), NetworkError> {
        self.socket.try_send(datagram)?;
        Ok(())
    }
}

/// Resolves the configured server on every connect, then opens a [`UdpLink`].
pub struct UdpConnector {
    target: ServerTarget,
    http: reqwest::Client,
}

impl UdpConnector {
    pub fn new(target: ServerTarget, http: reqwest::Client) -> Self {
        Self { target, http }
    }
}

#[async_trait]
impl Connector for UdpConnector {
    async fn connect(&self) -> Result<Box<dyn DatagramLink>, NetworkError> {
        let addr = resolve_server(&self.target, &self.http).await?;
        let link = UdpLink::connect(addr).await?;
        info!("UDP link to {addr} open");
        Ok(Box::new(link))
    }
}
