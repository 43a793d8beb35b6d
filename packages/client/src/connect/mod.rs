//! Connection establishment through a SOCKS5 proxy
//!
//! Dial the proxy, run the handshake over the resulting transport, then
//! optionally upgrade the tunnel to TLS. Each step is a collaborator trait
//! ([`Dialer`], [`TlsUpgrader`], [`Deadline`]) so transports and TLS stacks
//! can be swapped without touching the sequencing.

pub mod builder;
pub mod completion;
pub mod deadline;
pub(crate) mod driver;
pub mod request;
pub mod service;
pub mod tcp;
pub mod tls;
pub mod types;

pub use builder::ConnectorBuilder;
pub use completion::{CancelHandle, CancelOutcome, PendingConnection};
pub use deadline::{Deadline, NoDeadline};
pub use request::ConnectionRequest;
pub use service::{EstablishedStream, Socks5Connector};
pub use tcp::{Dialer, TcpDialer, configure_tcp_socket};
pub use tls::{NoTls, RustlsUpgrader, TlsOptions, TlsUpgrader};
pub use types::{Tunnel, TunnelStream};
