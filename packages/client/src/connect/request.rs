//! Connection request
//!
//! Everything one attempt needs: where to go, which proxy to go through, how
//! to authenticate, and whether to upgrade to TLS afterwards.

use super::tls::TlsOptions;
use crate::proxy::Endpoint;
use crate::socks::ProxyAuth;

#[derive(Clone, Debug)]
pub struct ConnectionRequest {
    target: Endpoint,
    proxy: Endpoint,
    auth: ProxyAuth,
    tls: Option<TlsOptions>,
}

impl ConnectionRequest {
    pub fn new(target: Endpoint, proxy: Endpoint) -> Self {
        Self {
            target,
            proxy,
            auth: ProxyAuth::None,
            tls: None,
        }
    }

    #[must_use]
    pub fn with_auth(mut self, auth: ProxyAuth) -> Self {
        self.auth = auth;
        self
    }

    /// Upgrade the tunnel to TLS once the proxy has connected it.
    #[must_use]
    pub fn with_tls(mut self, options: TlsOptions) -> Self {
        self.tls = Some(options);
        self
    }

    #[must_use]
    pub fn target(&self) -> &Endpoint {
        &self.target
    }

    #[must_use]
    pub fn proxy(&self) -> &Endpoint {
        &self.proxy
    }

    #[must_use]
    pub fn auth(&self) -> &ProxyAuth {
        &self.auth
    }

    #[must_use]
    pub fn tls(&self) -> Option<&TlsOptions> {
        self.tls.as_ref()
    }
}
