//! Connector builder
//!
//! Assembles a [`Socks5Connector`] from a dialer plus optional TLS upgrader,
//! deadline hook and configuration.

use crate::config::ConnectorConfig;
use crate::connect::deadline::{Deadline, NoDeadline};
use crate::connect::service::Socks5Connector;
use crate::connect::tcp::Dialer;
use crate::connect::tls::NoTls;

/// Builder for [`Socks5Connector`].
#[must_use]
pub struct ConnectorBuilder<D, U = NoTls, L = NoDeadline> {
    dialer: D,
    upgrader: U,
    deadline: L,
    config: ConnectorConfig,
}

impl<D: Dialer> ConnectorBuilder<D> {
    pub fn new(dialer: D) -> Self {
        Self {
            dialer,
            upgrader: NoTls,
            deadline: NoDeadline,
            config: ConnectorConfig::default(),
        }
    }
}

impl<D: Dialer, U, L: Deadline> ConnectorBuilder<D, U, L> {
    /// Use `upgrader` for requests that carry TLS options.
    pub fn tls_upgrader<U2>(self, upgrader: U2) -> ConnectorBuilder<D, U2, L> {
        ConnectorBuilder {
            dialer: self.dialer,
            upgrader,
            deadline: self.deadline,
            config: self.config,
        }
    }

    /// Give up on attempts once `deadline` expires.
    pub fn deadline<L2: Deadline>(self, deadline: L2) -> ConnectorBuilder<D, U, L2> {
        ConnectorBuilder {
            dialer: self.dialer,
            upgrader: self.upgrader,
            deadline,
            config: self.config,
        }
    }

    pub fn config(mut self, config: ConnectorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Socks5Connector<D, U, L> {
        Socks5Connector::from_parts(self.dialer, self.upgrader, self.deadline, self.config)
    }
}
