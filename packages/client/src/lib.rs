//! # Sockslane client
//!
//! Asynchronous SOCKS5 client for tokio. Connects to a target through a
//! SOCKS5 proxy, optionally authenticating with a username and password, and
//! optionally upgrades the resulting tunnel to TLS.
//!
//! ## Features
//!
//! - **Sans-I/O handshake**: [`socks::Socks5Handshake`] consumes bytes and
//!   produces frames without touching a socket
//! - **Stage-tagged errors**: every failure says whether it happened while
//!   dialing the proxy, negotiating SOCKS5 or establishing TLS
//! - **Pluggable collaborators**: dialer, TLS upgrader and deadline are traits
//! - **Cancellation**: background attempts report exactly once or not at all
//!
//! ## Usage
//!
//! ```no_run
//! use sockslane_client::connect::{ConnectionRequest, Socks5Connector, TcpDialer};
//! use sockslane_client::proxy::Endpoint;
//!
//! # async fn run() -> Result<(), sockslane_client::error::TaggedError> {
//! let connector = Socks5Connector::new(TcpDialer::default());
//! let request = ConnectionRequest::new(
//!     Endpoint::new("93.184.216.34", 80),
//!     Endpoint::proxy("127.0.0.1"),
//! );
//! let stream = connector.establish(request).await?;
//! println!("proxy bound {}", stream.bound_address());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod config;
pub mod connect;
pub mod error;
pub mod proxy;
pub mod socks;

pub use config::ConnectorConfig;
pub use connect::{
    CancelHandle, CancelOutcome, ConnectionRequest, ConnectorBuilder, Deadline, Dialer,
    EstablishedStream, NoDeadline, NoTls, PendingConnection, RustlsUpgrader, Socks5Connector,
    TcpDialer, TlsOptions, TlsUpgrader, Tunnel, TunnelStream,
};
pub use error::{Cause, DialError, SocksError, SslError, Stage, TaggedError};
pub use proxy::{DEFAULT_PROXY_PORT, Endpoint, EndpointError};
pub use socks::{BoundAddress, Credentials, ProxyAuth, ReplyCode};
