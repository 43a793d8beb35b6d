//! Terminal methods
//!
//! Run the attempt inline, in the background, or with completion callbacks.
//! All three use the tokio TCP dialer and the rustls upgrader.

use std::time::Duration;

use sockslane_client::connect::{
    CancelHandle, ConnectionRequest, ConnectorBuilder, EstablishedStream, PendingConnection,
    RustlsUpgrader, Socks5Connector, TcpDialer,
};
use sockslane_client::error::TaggedError;

use crate::builder::core::Socks5Builder;

/// Connection returned by the builder: the tunnel, TLS-wrapped if requested.
pub type ProxyStream = EstablishedStream<TcpDialer, RustlsUpgrader>;

type DefaultConnector = Socks5Connector<TcpDialer, RustlsUpgrader, Option<Duration>>;

impl Socks5Builder {
    fn into_parts(self) -> (DefaultConnector, ConnectionRequest) {
        let connector = ConnectorBuilder::new(TcpDialer::new(self.config.clone()))
            .tls_upgrader(RustlsUpgrader::new())
            .deadline(self.timeout)
            .config(self.config)
            .build();

        let mut request = ConnectionRequest::new(self.target, self.proxy).with_auth(self.auth);
        if let Some(options) = self.tls {
            request = request.with_tls(options);
        }
        (connector, request)
    }

    /// Connect and wait for the result.
    ///
    /// # Examples
    /// ```no_run
    /// use sockslane::Socks5;
    /// use tokio::io::AsyncWriteExt;
    ///
    /// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut stream = Socks5::to("93.184.216.34", 80)
    ///     .via("127.0.0.1", 9050)
    ///     .connect()
    ///     .await?;
    /// stream.write_all(b"GET / HTTP/1.0\r\n\r\n").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(self) -> Result<ProxyStream, TaggedError> {
        let (connector, request) = self.into_parts();
        tracing::debug!(
            target: "sockslane::connect",
            target_addr = %request.target(),
            proxy = %request.proxy(),
            tls = request.tls().is_some(),
            "connecting"
        );
        connector.establish(request).await
    }

    /// Start the attempt in the background.
    ///
    /// Must be called within a tokio runtime. Dropping the returned handle
    /// cancels the attempt.
    pub fn spawn(self) -> PendingConnection<ProxyStream> {
        let (connector, request) = self.into_parts();
        connector.spawn(request)
    }

    /// Start the attempt in the background and report through callbacks.
    ///
    /// Exactly one callback runs unless the attempt is cancelled through the
    /// returned handle first.
    pub fn on_complete<C, F>(self, on_connected: C, on_failed: F) -> CancelHandle
    where
        C: FnOnce(ProxyStream) + Send + 'static,
        F: FnOnce(TaggedError) + Send + 'static,
    {
        let (connector, request) = self.into_parts();
        connector.establish_with(request, on_connected, on_failed)
    }
}
