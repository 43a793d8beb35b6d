//! Proxy dialing
//!
//! The [`Dialer`] trait is the byte transport collaborator: it turns a proxy
//! endpoint into a connected duplex stream. [`TcpDialer`] is the tokio TCP
//! implementation, resolving the host and trying each address in turn.

use std::future::Future;
use std::io;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

use super::socket_config::configure_tcp_socket;
use crate::config::ConnectorConfig;
use crate::error::DialError;
use crate::proxy::Endpoint;

/// Opens transports to a proxy.
///
/// Writes on the returned transport must reach the peer in call order; a
/// read returning 0 bytes means the peer closed. Dropping the transport
/// releases it.
pub trait Dialer: Send + Sync + 'static {
    type Transport: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    fn dial(
        &self,
        proxy: &Endpoint,
    ) -> impl Future<Output = Result<Self::Transport, DialError>> + Send;
}

/// Dials the proxy over TCP.
#[derive(Clone, Debug, Default)]
pub struct TcpDialer {
    config: ConnectorConfig,
}

impl TcpDialer {
    #[must_use]
    pub fn new(config: ConnectorConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }
}

impl Dialer for TcpDialer {
    type Transport = TcpStream;

    async fn dial(&self, proxy: &Endpoint) -> Result<TcpStream, DialError> {
        let addrs: Vec<_> = tokio::net::lookup_host((proxy.host(), proxy.port()))
            .await
            .map_err(|source| DialError::Resolve {
                endpoint: proxy.to_string(),
                source,
            })?
            .collect();

        if addrs.is_empty() {
            return Err(DialError::NoAddress(proxy.to_string()));
        }

        let mut last_error: Option<io::Error> = None;
        for addr in addrs {
            match TcpStream::connect(addr).await {
                Ok(stream) => {
                    if let Err(e) = configure_tcp_socket(&stream, &self.config) {
                        tracing::debug!(
                            target: "sockslane::connect",
                            %addr,
                            error = %e,
                            "failed to configure proxy socket"
                        );
                    }
                    tracing::debug!(target: "sockslane::connect", %addr, "connected to proxy");
                    return Ok(stream);
                }
                Err(e) => {
                    tracing::debug!(
                        target: "sockslane::connect",
                        %addr,
                        error = %e,
                        "proxy address refused connection"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(DialError::Connect {
            endpoint: proxy.to_string(),
            source: last_error
                .unwrap_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no address tried")),
        })
    }
}
