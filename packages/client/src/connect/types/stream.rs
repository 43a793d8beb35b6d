//! Final stream handed to the caller: the plain tunnel or its TLS upgrade

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use super::tunnel::Tunnel;
use crate::socks::BoundAddress;

enum Inner<T, S> {
    Plain(Tunnel<T>),
    Tls(S),
}

/// A usable connection to the destination, proxied and optionally encrypted.
pub struct TunnelStream<T, S> {
    bound: BoundAddress,
    inner: Inner<T, S>,
}

impl<T, S> TunnelStream<T, S> {
    pub(crate) fn plain(tunnel: Tunnel<T>) -> Self {
        Self {
            bound: tunnel.bound_address().clone(),
            inner: Inner::Plain(tunnel),
        }
    }

    pub(crate) fn tls(bound: BoundAddress, stream: S) -> Self {
        Self {
            bound,
            inner: Inner::Tls(stream),
        }
    }

    /// Address the proxy bound for the tunnel.
    #[must_use]
    pub fn bound_address(&self) -> &BoundAddress {
        &self.bound
    }

    #[must_use]
    pub fn is_tls(&self) -> bool {
        matches!(self.inner, Inner::Tls(_))
    }

    pub fn into_plain(self) -> Option<Tunnel<T>> {
        match self.inner {
            Inner::Plain(tunnel) => Some(tunnel),
            Inner::Tls(_) => None,
        }
    }

    pub fn into_tls(self) -> Option<S> {
        match self.inner {
            Inner::Tls(stream) => Some(stream),
            Inner::Plain(_) => None,
        }
    }
}

impl<T, S> std::fmt::Debug for TunnelStream<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TunnelStream")
            .field("bound", &self.bound)
            .field("tls", &self.is_tls())
            .finish_non_exhaustive()
    }
}

impl<T, S> AsyncRead for TunnelStream<T, S>
where
    T: AsyncRead + Unpin,
    S: AsyncRead + Unpin,
{
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match &mut self.inner {
            Inner::Plain(tunnel) => Pin::new(tunnel).poll_read(cx, buf),
            Inner::Tls(stream) => Pin::new(stream).poll_read(cx, buf),
        }
    }
}

impl<T, S> AsyncWrite for TunnelStream<T, S>
where
    T: AsyncWrite + Unpin,
    S: AsyncWrite + Unpin,
{
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match &mut self.inner {
            Inner::Plain(tunnel) => Pin::new(tunnel).poll_write(cx, buf),
            Inner::Tls(stream) => Pin::new(stream).poll_write(cx, buf),
        }
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match &mut self.inner {
            Inner::Plain(tunnel) => Pin::new(tunnel).poll_flush(cx),
            Inner::Tls(stream) => Pin::new(stream).poll_flush(cx),
        }
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match &mut self.inner {
            Inner::Plain(tunnel) => Pin::new(tunnel).poll_shutdown(cx),
            Inner::Tls(stream) => Pin::new(stream).poll_shutdown(cx),
        }
    }
}
