//! TLS, deadline and socket options

use std::time::Duration;

use sockslane_client::connect::TlsOptions;

use crate::builder::core::Socks5Builder;

impl Socks5Builder {
    /// Upgrade the tunnel to TLS, verifying the target host against the
    /// webpki roots.
    pub fn tls(self) -> Self {
        self.tls_with(TlsOptions::new())
    }

    /// Upgrade the tunnel to TLS with explicit options.
    pub fn tls_with(mut self, options: TlsOptions) -> Self {
        self.tls = Some(options);
        self
    }

    /// Give up if the whole attempt takes longer than `timeout`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn nodelay(mut self, nodelay: bool) -> Self {
        self.config = self.config.with_nodelay(nodelay);
        self
    }

    /// TCP keepalive for the proxy connection; `None` disables it.
    pub fn keepalive(mut self, keepalive: Option<Duration>) -> Self {
        self.config = self.config.with_keepalive(keepalive);
        self
    }
}
