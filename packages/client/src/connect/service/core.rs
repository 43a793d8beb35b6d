//! Core connector service structure
//!
//! `Socks5Connector` bundles the injected collaborators. It is a plain value
//! with no global registration; clones share the same collaborators.

use std::sync::Arc;

use crate::config::ConnectorConfig;
use crate::connect::deadline::{Deadline, NoDeadline};
use crate::connect::tcp::Dialer;
use crate::connect::tls::NoTls;

pub(crate) struct ConnectorInner<D, U, L> {
    pub(crate) dialer: D,
    pub(crate) upgrader: U,
    pub(crate) deadline: L,
    pub(crate) config: ConnectorConfig,
}

/// Establishes tunnels through a SOCKS5 proxy.
///
/// Generic over the dialer `D` (byte transport), the TLS upgrader `U` and the
/// deadline hook `L`.
pub struct Socks5Connector<D, U = NoTls, L = NoDeadline> {
    pub(crate) inner: Arc<ConnectorInner<D, U, L>>,
}

impl<D, U, L> Clone for Socks5Connector<D, U, L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D: Dialer> Socks5Connector<D> {
    /// Plaintext-only connector without a deadline.
    pub fn new(dialer: D) -> Self {
        crate::connect::builder::ConnectorBuilder::new(dialer).build()
    }
}

impl<D, U, L> Socks5Connector<D, U, L>
where
    D: Dialer,
    L: Deadline,
{
    pub(crate) fn from_parts(dialer: D, upgrader: U, deadline: L, config: ConnectorConfig) -> Self {
        Self {
            inner: Arc::new(ConnectorInner {
                dialer,
                upgrader,
                deadline,
                config,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ConnectorConfig {
        &self.inner.config
    }

    pub fn dialer(&self) -> &D {
        &self.inner.dialer
    }

    pub fn upgrader(&self) -> &U {
        &self.inner.upgrader
    }
}

impl<D, U, L> std::fmt::Debug for Socks5Connector<D, U, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Socks5Connector")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}
