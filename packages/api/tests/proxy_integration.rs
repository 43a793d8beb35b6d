//! End-to-end tests against a miniature SOCKS5 proxy on loopback

use std::net::{SocketAddr, SocketAddrV4};
use std::time::Duration;

use sockslane::{Cause, SocksError, SslError, Stage, Socks5};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio_test::{assert_err, assert_ok};

/// Echo server; returns its address.
async fn echo_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind echo listener");
    let addr = listener.local_addr().expect("echo address");
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let (mut reader, mut writer) = socket.split();
                let _ = tokio::io::copy(&mut reader, &mut writer).await;
            });
        }
    });
    addr
}

#[derive(Clone, Copy)]
enum ProxyMode {
    Open,
    Credentials(&'static str, &'static str),
    Silent,
}

/// Minimal SOCKS5 proxy supporting CONNECT to IPv4 targets.
async fn socks_proxy(mode: ProxyMode) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind proxy listener");
    let addr = listener.local_addr().expect("proxy address");
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            tokio::spawn(serve(socket, mode));
        }
    });
    addr
}

async fn serve(mut client: TcpStream, mode: ProxyMode) -> std::io::Result<()> {
    let mut header = [0u8; 2];
    client.read_exact(&mut header).await?;
    let mut methods = vec![0u8; header[1] as usize];
    client.read_exact(&mut methods).await?;

    match mode {
        ProxyMode::Silent => {
            let mut sink = [0u8; 16];
            while client.read(&mut sink).await? > 0 {}
            return Ok(());
        }
        ProxyMode::Open => client.write_all(&[0x05, 0x00]).await?,
        ProxyMode::Credentials(user, pass) => {
            if !methods.contains(&0x02) {
                client.write_all(&[0x05, 0xFF]).await?;
                return Ok(());
            }
            client.write_all(&[0x05, 0x02]).await?;

            let mut version_and_len = [0u8; 2];
            client.read_exact(&mut version_and_len).await?;
            let mut username = vec![0u8; version_and_len[1] as usize];
            client.read_exact(&mut username).await?;
            let mut plen = [0u8; 1];
            client.read_exact(&mut plen).await?;
            let mut password = vec![0u8; plen[0] as usize];
            client.read_exact(&mut password).await?;

            if username != user.as_bytes() || password != pass.as_bytes() {
                client.write_all(&[0x01, 0x01]).await?;
                return Ok(());
            }
            client.write_all(&[0x01, 0x00]).await?;
        }
    }

    let mut request = [0u8; 10];
    client.read_exact(&mut request).await?;
    assert_eq!(&request[..4], &[0x05, 0x01, 0x00, 0x01]);
    let target = SocketAddrV4::new(
        [request[4], request[5], request[6], request[7]].into(),
        u16::from_be_bytes([request[8], request[9]]),
    );

    let mut upstream = match TcpStream::connect(target).await {
        Ok(stream) => stream,
        Err(_) => {
            client
                .write_all(&[0x05, 0x05, 0x00, 0x01, 0, 0, 0, 0, 0, 0])
                .await?;
            return Ok(());
        }
    };

    let SocketAddr::V4(bound) = upstream.local_addr()? else {
        unreachable!("loopback IPv4 only");
    };
    let mut reply = vec![0x05, 0x00, 0x00, 0x01];
    reply.extend_from_slice(&bound.ip().octets());
    reply.extend_from_slice(&bound.port().to_be_bytes());
    client.write_all(&reply).await?;

    tokio::io::copy_bidirectional(&mut client, &mut upstream).await?;
    Ok(())
}

async fn roundtrip(stream: &mut sockslane::ProxyStream, payload: &[u8]) -> Vec<u8> {
    stream.write_all(payload).await.expect("write through tunnel");
    stream.flush().await.expect("flush tunnel");
    let mut echoed = vec![0u8; payload.len()];
    stream
        .read_exact(&mut echoed)
        .await
        .expect("read through tunnel");
    echoed
}

#[tokio::test]
async fn test_connect_through_open_proxy() {
    let echo = echo_server().await;
    let proxy = socks_proxy(ProxyMode::Open).await;

    let mut stream = assert_ok!(
        Socks5::to(echo.ip().to_string(), echo.port())
            .via(proxy.ip().to_string(), proxy.port())
            .connect()
            .await
    );

    assert!(!stream.is_tls());
    assert_eq!(roundtrip(&mut stream, b"over the tunnel").await, b"over the tunnel");
}

#[tokio::test]
async fn test_credentials_from_proxy_url() {
    let echo = echo_server().await;
    let proxy = socks_proxy(ProxyMode::Credentials("alice", "p@ss")).await;

    let mut stream = Socks5::to(echo.ip().to_string(), echo.port())
        .via_url(&format!("socks5://alice:p%40ss@{proxy}"))
        .expect("valid proxy URL")
        .connect()
        .await
        .expect("authenticated connection");

    assert_eq!(roundtrip(&mut stream, b"authenticated").await, b"authenticated");
}

#[tokio::test]
async fn test_wrong_credentials_are_rejected() {
    let echo = echo_server().await;
    let proxy = socks_proxy(ProxyMode::Credentials("alice", "secret")).await;

    let err = Socks5::to(echo.ip().to_string(), echo.port())
        .via(proxy.ip().to_string(), proxy.port())
        .credentials("alice", "guess")
        .expect("valid credentials")
        .connect()
        .await
        .expect_err("proxy should reject the password");

    assert_eq!(err.stage(), Stage::Socks);
    assert!(matches!(err.cause(), Cause::Socks(SocksError::AuthRejected(_))));
}

#[tokio::test]
async fn test_proxy_requiring_auth_without_credentials() {
    let echo = echo_server().await;
    let proxy = socks_proxy(ProxyMode::Credentials("alice", "secret")).await;

    let err = assert_err!(
        Socks5::to(echo.ip().to_string(), echo.port())
            .via(proxy.ip().to_string(), proxy.port())
            .connect()
            .await
    );

    assert!(matches!(err.cause(), Cause::Socks(SocksError::NoAcceptableMethod)));
}

#[tokio::test]
async fn test_unreachable_proxy_fails_in_dial_stage() {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind placeholder");
    let free = listener.local_addr().expect("placeholder address");
    drop(listener);

    let err = assert_err!(
        Socks5::to("127.0.0.1", 80)
            .via(free.ip().to_string(), free.port())
            .connect()
            .await
    );

    assert!(err.is_dial());
}

#[tokio::test]
async fn test_silent_proxy_times_out_in_socks_stage() {
    let proxy = socks_proxy(ProxyMode::Silent).await;

    let err = Socks5::to("127.0.0.1", 80)
        .via(proxy.ip().to_string(), proxy.port())
        .timeout(Duration::from_millis(100))
        .connect()
        .await
        .expect_err("proxy never answers");

    assert_eq!(err.stage(), Stage::Socks);
    assert!(err.is_timeout());
}

#[tokio::test]
async fn test_tls_against_plaintext_target_fails_in_ssl_stage() {
    let echo = echo_server().await;
    let proxy = socks_proxy(ProxyMode::Open).await;

    let err = Socks5::to(echo.ip().to_string(), echo.port())
        .via(proxy.ip().to_string(), proxy.port())
        .tls()
        .timeout(Duration::from_secs(5))
        .connect()
        .await
        .expect_err("an echo server is not a TLS server");

    assert_eq!(err.stage(), Stage::Ssl);
    assert!(matches!(err.cause(), Cause::Ssl(SslError::Handshake(_))));
}

#[tokio::test]
async fn test_spawned_connection() {
    let echo = echo_server().await;
    let proxy = socks_proxy(ProxyMode::Open).await;

    let pending = Socks5::to(echo.ip().to_string(), echo.port())
        .via(proxy.ip().to_string(), proxy.port())
        .spawn();
    let mut stream = pending.await.expect("spawned connection");

    assert_eq!(roundtrip(&mut stream, b"spawned").await, b"spawned");
}

#[tokio::test]
async fn test_completion_callbacks() {
    let echo = echo_server().await;
    let proxy = socks_proxy(ProxyMode::Open).await;
    let (tx, rx) = oneshot::channel();

    let _handle = Socks5::to(echo.ip().to_string(), echo.port())
        .via(proxy.ip().to_string(), proxy.port())
        .on_complete(
            move |stream| {
                let _ = tx.send(Ok(stream.bound_address().to_string()));
            },
            |err| panic!("unexpected failure: {err}"),
        );

    let bound: Result<String, ()> = rx.await.expect("a callback should fire");
    assert!(bound.expect("success callback").starts_with("127.0.0.1:"));
}
