//! Core `Socks5Builder` structure and base functionality

use std::fmt;
use std::time::Duration;

use sockslane_client::config::ConnectorConfig;
use sockslane_client::connect::TlsOptions;
use sockslane_client::proxy::Endpoint;
use sockslane_client::socks::ProxyAuth;

/// Proxy used when [`Socks5Builder::via`] is never called.
pub const DEFAULT_PROXY_HOST: &str = "127.0.0.1";

/// Builder for one connection through a SOCKS5 proxy.
#[derive(Clone)]
#[must_use]
pub struct Socks5Builder {
    pub(crate) target: Endpoint,
    pub(crate) proxy: Endpoint,
    pub(crate) auth: ProxyAuth,
    pub(crate) tls: Option<TlsOptions>,
    pub(crate) timeout: Option<Duration>,
    pub(crate) config: ConnectorConfig,
}

impl Socks5Builder {
    /// Start building a connection to `host:port`.
    ///
    /// The target host must be an IPv4 literal; anything else fails with a
    /// `socks` stage error when the connection is attempted.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            target: Endpoint::new(host, port),
            proxy: Endpoint::proxy(DEFAULT_PROXY_HOST),
            auth: ProxyAuth::None,
            tls: None,
            timeout: None,
            config: ConnectorConfig::default(),
        }
    }

    #[must_use]
    pub fn target(&self) -> &Endpoint {
        &self.target
    }

    #[must_use]
    pub fn proxy(&self) -> &Endpoint {
        &self.proxy
    }

    /// Route through the proxy at `host:port`.
    pub fn via(mut self, host: impl Into<String>, port: u16) -> Self {
        self.proxy = Endpoint::new(host, port);
        self
    }
}

impl fmt::Debug for Socks5Builder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Socks5Builder")
            .field("target", &self.target)
            .field("proxy", &self.proxy)
            .field("auth", &self.auth)
            .field("tls", &self.tls)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
