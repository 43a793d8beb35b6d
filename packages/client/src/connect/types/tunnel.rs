//! Established tunnel and the stream delivered to callers

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use crate::socks::BoundAddress;

/// Transport after a successful CONNECT: a transparent pipe to the destination.
///
/// Bytes the proxy delivered together with the CONNECT reply are replayed
/// before anything is read from the transport.
#[derive(Debug)]
pub struct Tunnel<T> {
    inner: T,
    surplus: Bytes,
    bound: BoundAddress,
}

impl<T> Tunnel<T> {
    pub fn new(inner: T, bound: BoundAddress, surplus: Bytes) -> Self {
        Self {
            inner,
            surplus,
            bound,
        }
    }

    /// Address the proxy bound for this tunnel.
    #[must_use]
    pub fn bound_address(&self) -> &BoundAddress {
        &self.bound
    }

    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Unwrap the transport along with any bytes not yet read from the tunnel.
    pub fn into_parts(self) -> (T, Bytes) {
        (self.inner, self.surplus)
    }
}

impl<T: AsyncRead + Unpin> AsyncRead for Tunnel<T> {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        if !self.surplus.is_empty() {
            let n = self.surplus.len().min(buf.remaining());
            let chunk = self.surplus.split_to(n);
            buf.put_slice(&chunk);
            return Poll::Ready(Ok(()));
        }
        Pin::new(&mut self.inner).poll_read(cx, buf)
    }
}

impl<T: AsyncWrite + Unpin> AsyncWrite for Tunnel<T> {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.inner).poll_write(cx, buf)
    }

    fn poll_write_vectored(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        bufs: &[io::IoSlice<'_>],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.inner).poll_write_vectored(cx, bufs)
    }

    fn is_write_vectored(&self) -> bool {
        self.inner.is_write_vectored()
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use tokio::io::{AsyncReadExt, AsyncWriteExt, duplex};

    use super::*;

    fn bound() -> BoundAddress {
        BoundAddress::Ip(SocketAddr::from(([10, 0, 0, 1], 8080)))
    }

    #[tokio::test]
    async fn surplus_is_read_before_the_transport() {
        let (client, mut server) = duplex(64);
        let mut tunnel = Tunnel::new(client, bound(), Bytes::from_static(b"early "));
        server.write_all(b"late").await.unwrap();

        let mut buf = [0u8; 10];
        tunnel.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"early late");
    }

    #[tokio::test]
    async fn get_mut_writes_past_the_wrapper() {
        let (client, mut server) = duplex(64);
        let mut tunnel = Tunnel::new(client, bound(), Bytes::from_static(b"pending"));

        tunnel.get_mut().write_all(b"raw").await.unwrap();
        let mut buf = [0u8; 3];
        server.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"raw");

        let (_, surplus) = tunnel.into_parts();
        assert_eq!(&surplus[..], b"pending");
    }
}
