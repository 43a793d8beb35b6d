//! Scripted proxies and collaborators shared by the connector tests

#![allow(dead_code)]

use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use sockslane_client::connect::{Dialer, TlsOptions, TlsUpgrader};
use sockslane_client::error::{DialError, SslError};
use sockslane_client::proxy::Endpoint;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, DuplexStream, ReadBuf};
use tokio::sync::Notify;

pub const GREETING: [u8; 3] = [0x05, 0x01, 0x00];
pub const GREETING_WITH_AUTH: [u8; 4] = [0x05, 0x02, 0x00, 0x02];
/// CONNECT to 93.184.216.34:80
pub const CONNECT: [u8; 10] = [0x05, 0x01, 0x00, 0x01, 93, 184, 216, 34, 0x00, 0x50];
/// Success, bound to 10.0.0.1:8080
pub const CONNECT_OK: [u8; 10] = [0x05, 0x00, 0x00, 0x01, 10, 0, 0, 1, 0x1f, 0x90];

pub fn target() -> Endpoint {
    Endpoint::new("93.184.216.34", 80)
}

pub fn proxy() -> Endpoint {
    Endpoint::proxy("127.0.0.1")
}

/// Hands out a single pre-built transport and counts dial attempts.
pub struct OnceDialer<T> {
    transport: Mutex<Option<T>>,
    dials: AtomicUsize,
}

impl<T> OnceDialer<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport: Mutex::new(Some(transport)),
            dials: AtomicUsize::new(0),
        }
    }

    pub fn dials(&self) -> usize {
        self.dials.load(Ordering::SeqCst)
    }
}

impl<T> Dialer for OnceDialer<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    type Transport = T;

    async fn dial(&self, proxy: &Endpoint) -> Result<T, DialError> {
        self.dials.fetch_add(1, Ordering::SeqCst);
        let transport = self.transport.lock().expect("dialer lock poisoned").take();
        transport.ok_or_else(|| DialError::Connect {
            endpoint: proxy.to_string(),
            source: io::Error::from(io::ErrorKind::ConnectionRefused),
        })
    }
}

/// Fails every dial with connection refused.
pub struct RefusingDialer;

impl Dialer for RefusingDialer {
    type Transport = DuplexStream;

    async fn dial(&self, proxy: &Endpoint) -> Result<DuplexStream, DialError> {
        Err(DialError::Connect {
            endpoint: proxy.to_string(),
            source: io::Error::from(io::ErrorKind::ConnectionRefused),
        })
    }
}

/// Dial that only completes once `release` is notified.
pub struct GatedDialer {
    pub release: Arc<Notify>,
    pub entered: Arc<Notify>,
    transport: Mutex<Option<DuplexStream>>,
}

impl GatedDialer {
    pub fn new(transport: DuplexStream) -> Self {
        Self {
            release: Arc::new(Notify::new()),
            entered: Arc::new(Notify::new()),
            transport: Mutex::new(Some(transport)),
        }
    }
}

impl Dialer for GatedDialer {
    type Transport = DuplexStream;

    async fn dial(&self, proxy: &Endpoint) -> Result<DuplexStream, DialError> {
        self.entered.notify_one();
        self.release.notified().await;
        let transport = self.transport.lock().expect("dialer lock poisoned").take();
        transport.ok_or_else(|| DialError::NoAddress(proxy.to_string()))
    }
}

/// Upgrader that keeps the stream as-is and records the server name it was asked for.
#[derive(Default)]
pub struct RecordingUpgrader {
    pub server_names: Mutex<Vec<String>>,
}

impl<S> TlsUpgrader<S> for RecordingUpgrader
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    type Output = S;

    async fn upgrade(&self, stream: S, options: &TlsOptions) -> Result<S, SslError> {
        self.server_names
            .lock()
            .expect("upgrader lock poisoned")
            .push(options.get_server_name().unwrap_or_default().to_string());
        Ok(stream)
    }
}

/// Upgrader whose handshake always fails.
pub struct FailingUpgrader;

impl<S> TlsUpgrader<S> for FailingUpgrader
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    type Output = S;

    async fn upgrade(&self, stream: S, _options: &TlsOptions) -> Result<S, SslError> {
        drop(stream);
        Err(SslError::Handshake(io::Error::new(
            io::ErrorKind::InvalidData,
            "certificate verify failed",
        )))
    }
}

/// Upgrader whose handshake never completes.
pub struct HangingUpgrader;

impl<S> TlsUpgrader<S> for HangingUpgrader
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    type Output = S;

    async fn upgrade(&self, stream: S, _options: &TlsOptions) -> Result<S, SslError> {
        let _held = stream;
        std::future::pending().await
    }
}

/// Duplex transport whose shutdown never completes.
pub struct StallingShutdown(pub DuplexStream);

impl AsyncRead for StallingShutdown {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.0).poll_read(cx, buf)
    }
}

impl AsyncWrite for StallingShutdown {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.0).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.0).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Pending
    }
}

/// Read exactly `expected.len()` bytes and check them.
pub async fn expect_bytes(server: &mut DuplexStream, expected: &[u8]) {
    let mut buf = vec![0u8; expected.len()];
    server
        .read_exact(&mut buf)
        .await
        .expect("proxy side read failed");
    assert_eq!(buf, expected);
}

/// Serve a no-auth handshake that succeeds, then write `trailing` bytes.
pub async fn serve_no_auth(server: &mut DuplexStream, trailing: &[u8]) {
    expect_bytes(server, &GREETING).await;
    server.write_all(&[0x05, 0x00]).await.expect("write method");
    expect_bytes(server, &CONNECT).await;
    let mut reply = CONNECT_OK.to_vec();
    reply.extend_from_slice(trailing);
    server.write_all(&reply).await.expect("write reply");
}

/// True once the peer has closed its side.
pub async fn peer_closed(server: &mut DuplexStream) -> bool {
    let mut buf = [0u8; 64];
    matches!(server.read(&mut buf).await, Ok(0) | Err(_))
}
