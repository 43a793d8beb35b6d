//! TLS upgrade of an established tunnel
//!
//! The [`TlsUpgrader`] trait is the TLS collaborator. It takes ownership of
//! the tunnel and returns a stream that wraps it, so the pre-upgrade stream
//! can never be used afterwards. [`RustlsUpgrader`] is the rustls
//! implementation; [`NoTls`] refuses every upgrade.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use rustls::pki_types::ServerName;
use rustls::{ClientConfig, RootCertStore};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;

use crate::error::SslError;

/// Settings handed through to the TLS upgrader.
#[derive(Clone, Default)]
pub struct TlsOptions {
    server_name: Option<String>,
    alpn_protocols: Vec<Vec<u8>>,
    client_config: Option<Arc<ClientConfig>>,
}

impl TlsOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Name to verify the peer certificate against; defaults to the target host.
    #[must_use]
    pub fn server_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn alpn_protocols<I, P>(mut self, protocols: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Vec<u8>>,
    {
        self.alpn_protocols = protocols.into_iter().map(Into::into).collect();
        self
    }

    /// Use a pre-built rustls configuration instead of the webpki defaults.
    #[must_use]
    pub fn client_config(mut self, config: Arc<ClientConfig>) -> Self {
        self.client_config = Some(config);
        self
    }

    #[must_use]
    pub fn get_server_name(&self) -> Option<&str> {
        self.server_name.as_deref()
    }

    #[must_use]
    pub fn get_alpn_protocols(&self) -> &[Vec<u8>] {
        &self.alpn_protocols
    }

    #[must_use]
    pub fn get_client_config(&self) -> Option<&Arc<ClientConfig>> {
        self.client_config.as_ref()
    }

    /// Copy of these options with the server name filled in.
    pub(crate) fn resolved_for(&self, target_host: &str) -> Self {
        let mut options = self.clone();
        if options.server_name.is_none() {
            options.server_name = Some(target_host.to_string());
        }
        options
    }
}

impl fmt::Debug for TlsOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsOptions")
            .field("server_name", &self.server_name)
            .field("alpn_protocols", &self.alpn_protocols.len())
            .field("custom_config", &self.client_config.is_some())
            .finish()
    }
}

/// Wraps an established stream in TLS.
pub trait TlsUpgrader<S>: Send + Sync + 'static {
    type Output: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    fn upgrade(
        &self,
        stream: S,
        options: &TlsOptions,
    ) -> impl Future<Output = Result<Self::Output, SslError>> + Send;
}

/// Upgrader for connectors that never negotiate TLS.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTls;

impl<S> TlsUpgrader<S> for NoTls
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    type Output = S;

    async fn upgrade(&self, _stream: S, _options: &TlsOptions) -> Result<S, SslError> {
        Err(SslError::Refused)
    }
}

/// rustls-backed upgrader using the ring provider and webpki roots.
#[derive(Clone, Copy, Debug, Default)]
pub struct RustlsUpgrader;

impl RustlsUpgrader {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn client_config(options: &TlsOptions) -> Result<Arc<ClientConfig>, SslError> {
        let base = match options.get_client_config() {
            Some(config) => Arc::clone(config),
            None => default_client_config()?,
        };
        if options.get_alpn_protocols().is_empty() {
            return Ok(base);
        }

        let mut config = (*base).clone();
        config.alpn_protocols = options.get_alpn_protocols().to_vec();
        Ok(Arc::new(config))
    }
}

impl<S> TlsUpgrader<S> for RustlsUpgrader
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    type Output = TlsStream<S>;

    async fn upgrade(&self, stream: S, options: &TlsOptions) -> Result<TlsStream<S>, SslError> {
        let name = options.get_server_name().unwrap_or_default().to_string();
        let server_name = ServerName::try_from(name.clone())
            .map_err(|_| SslError::InvalidServerName(name.clone()))?;
        let config = Self::client_config(options)?;

        tracing::debug!(target: "sockslane::tls", server_name = %name, "starting TLS handshake");
        let stream = TlsConnector::from(config)
            .connect(server_name, stream)
            .await
            .map_err(SslError::Handshake)?;

        tracing::debug!(
            target: "sockslane::tls",
            server_name = %name,
            alpn = ?stream.get_ref().1.alpn_protocol(),
            "TLS established"
        );
        Ok(stream)
    }
}

fn default_client_config() -> Result<Arc<ClientConfig>, SslError> {
    let roots = RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    let config =
        ClientConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
            .with_safe_default_protocol_versions()?
            .with_root_certificates(roots)
            .with_no_client_auth();
    Ok(Arc::new(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_name_defaults_to_target_host() {
        let options = TlsOptions::new().resolved_for("198.51.100.4");
        assert_eq!(options.get_server_name(), Some("198.51.100.4"));

        let explicit = TlsOptions::new()
            .server_name("api.example.com")
            .resolved_for("198.51.100.4");
        assert_eq!(explicit.get_server_name(), Some("api.example.com"));
    }

    #[test]
    fn alpn_is_applied_to_the_config() {
        let options = TlsOptions::new().alpn_protocols(["h2", "http/1.1"]);
        let config = RustlsUpgrader::client_config(&options).unwrap();
        assert_eq!(config.alpn_protocols, vec![b"h2".to_vec(), b"http/1.1".to_vec()]);
    }

    #[tokio::test]
    async fn empty_server_name_is_rejected_before_any_io() {
        let (client, _server) = tokio::io::duplex(64);
        let err = RustlsUpgrader::new()
            .upgrade(client, &TlsOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SslError::InvalidServerName(name) if name.is_empty()));
    }
}
