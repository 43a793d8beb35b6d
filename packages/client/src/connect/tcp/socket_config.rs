//! TCP socket configuration utilities
//!
//! Applies nodelay and keepalive settings to a freshly dialed proxy connection.

use std::io;

use socket2::{SockRef, TcpKeepalive};
use tokio::net::TcpStream;

use crate::config::ConnectorConfig;

/// Configure a proxy connection according to `config`.
pub fn configure_tcp_socket(stream: &TcpStream, config: &ConnectorConfig) -> io::Result<()> {
    if config.nodelay {
        stream.set_nodelay(true)?;
    }

    if let Some(idle) = config.keepalive {
        SockRef::from(stream).set_tcp_keepalive(&TcpKeepalive::new().with_time(idle))?;
    }

    Ok(())
}
