//! Proxy connection establishment
//!
//! Sequences dial, SOCKS5 handshake and the optional TLS upgrade, racing each
//! stage against the connector's deadline and tagging failures with the
//! stage they came from.

use std::future::Future;
use std::pin::{Pin, pin};

use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::core::Socks5Connector;
use crate::connect::completion::StageProbe;
use crate::connect::deadline::Deadline;
use crate::connect::driver::run_handshake;
use crate::connect::request::ConnectionRequest;
use crate::connect::tcp::Dialer;
use crate::connect::tls::TlsUpgrader;
use crate::connect::types::{Tunnel, TunnelStream};
use crate::error::{SocksError, SslError, Stage, TaggedError};
use crate::socks::Socks5Handshake;

/// Stream produced by a connector with dialer `D` and upgrader `U`.
pub type EstablishedStream<D, U> = TunnelStream<
    <D as Dialer>::Transport,
    <U as TlsUpgrader<Tunnel<<D as Dialer>::Transport>>>::Output,
>;

impl<D, U, L> Socks5Connector<D, U, L>
where
    D: Dialer,
    U: TlsUpgrader<Tunnel<D::Transport>>,
    L: Deadline,
{
    /// Connect to the request's target through its proxy.
    ///
    /// Resolves to the tunnel (TLS-wrapped when the request carries TLS
    /// options) or to the first failure, tagged `dial`, `socks` or `ssl`.
    /// Dropping the future closes any transport it has opened.
    pub async fn establish(
        &self,
        request: ConnectionRequest,
    ) -> Result<EstablishedStream<D, U>, TaggedError> {
        self.establish_tracked(request, &StageProbe::default()).await
    }

    pub(crate) async fn establish_tracked(
        &self,
        request: ConnectionRequest,
        probe: &StageProbe,
    ) -> Result<EstablishedStream<D, U>, TaggedError> {
        let inner = &self.inner;
        let mut deadline = pin!(inner.deadline.expired());
        let proxy = request.proxy();

        // Validate the target before touching the network.
        let session = Socks5Handshake::new(request.target(), request.auth().clone())?;

        probe.set(Stage::Dial);
        tracing::debug!(
            target: "sockslane::connect",
            proxy = %proxy,
            target_addr = %request.target(),
            "dialing proxy"
        );
        let mut transport = tokio::select! {
            biased;
            dialed = inner.dialer.dial(proxy) => dialed?,
            () = &mut deadline => return Err(TaggedError::timed_out(Stage::Dial, &proxy.to_string())),
        };

        probe.set(Stage::Socks);
        let (handshake, expired) = tokio::select! {
            biased;
            outcome = run_handshake(&mut transport, session, inner.config.read_chunk_size) => (outcome, false),
            () = &mut deadline => (Err(SocksError::TimedOut), true),
        };
        let outcome = match handshake {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::debug!(
                    target: "sockslane::connect",
                    proxy = %proxy,
                    error = %err,
                    "closing proxy transport after handshake failure"
                );
                // An expired deadline cannot be polled again; drop without shutdown.
                if !expired {
                    self.close(transport, deadline.as_mut()).await;
                }
                return Err(err.into());
            }
        };

        let bound = outcome.bound.clone();
        let tunnel = Tunnel::new(transport, outcome.bound, outcome.surplus);
        let Some(options) = request.tls() else {
            tracing::debug!(target: "sockslane::connect", bound = %bound, "tunnel ready");
            return Ok(TunnelStream::plain(tunnel));
        };

        probe.set(Stage::Ssl);
        let options = options.resolved_for(request.target().host());
        // The upgrader owns the tunnel from here; on failure it is dropped
        // (and closed) inside the upgrade.
        let upgraded = tokio::select! {
            biased;
            upgraded = inner.upgrader.upgrade(tunnel, &options) => upgraded,
            () = &mut deadline => Err(SslError::TimedOut),
        };
        match upgraded {
            Ok(stream) => {
                tracing::debug!(target: "sockslane::connect", bound = %bound, "TLS tunnel ready");
                Ok(TunnelStream::tls(bound, stream))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Shut `transport` down, bounded by the attempt's deadline, then drop it.
    async fn close<T, F>(&self, mut transport: T, deadline: Pin<&mut F>)
    where
        T: AsyncWrite + Unpin,
        F: Future<Output = ()>,
    {
        if !self.inner.config.shutdown_on_failure {
            return;
        }
        tokio::select! {
            biased;
            shutdown = transport.shutdown() => {
                if let Err(e) = shutdown {
                    tracing::trace!(target: "sockslane::connect", error = %e, "transport shutdown failed");
                }
            }
            () = deadline => {
                tracing::trace!(target: "sockslane::connect", "transport shutdown abandoned at deadline");
            }
        }
    }
}
