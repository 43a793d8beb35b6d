//! Connector Configuration Module
//!
//! Socket and handshake settings shared by the dialer and the orchestrator.

use std::time::Duration;

/// Runtime connector configuration
#[derive(Debug, Clone)]
pub struct ConnectorConfig {
    /// Set `TCP_NODELAY` on the proxy connection
    pub nodelay: bool,
    /// TCP keepalive idle time for the proxy connection
    pub keepalive: Option<Duration>,
    /// Bytes requested per transport read while handshaking
    pub read_chunk_size: usize,
    /// Shut the transport down before reporting a failure
    pub shutdown_on_failure: bool,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            nodelay: true,
            keepalive: Some(Duration::from_secs(60)),
            read_chunk_size: 512,
            shutdown_on_failure: true,
        }
    }
}

impl ConnectorConfig {
    /// Configuration for interactive traffic: no keepalive probing, small reads.
    #[must_use]
    pub fn low_latency() -> Self {
        Self {
            keepalive: None,
            read_chunk_size: 64,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_nodelay(mut self, nodelay: bool) -> Self {
        self.nodelay = nodelay;
        self
    }

    #[must_use]
    pub fn with_keepalive(mut self, keepalive: Option<Duration>) -> Self {
        self.keepalive = keepalive;
        self
    }

    /// Read chunk size; clamped to at least 1 byte.
    #[must_use]
    pub fn with_read_chunk_size(mut self, size: usize) -> Self {
        self.read_chunk_size = size.max(1);
        self
    }
}
