//! Byte transport adapter for the handshake state machine
//!
//! Pumps queued frames into the transport in generation order, then performs
//! one read and hands the bytes (or end of stream) to the machine. A read is
//! only issued after every queued frame has been written and flushed.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::SocksError;
use crate::socks::{HandshakeOutcome, Phase, Socks5Handshake};

/// Run `session` to a terminal phase over `transport`.
///
/// A failure recorded by the machine takes precedence over any transport
/// error that could follow it, because nothing is written or read once the
/// machine has failed.
pub(crate) async fn run_handshake<T>(
    transport: &mut T,
    mut session: Socks5Handshake,
    read_chunk_size: usize,
) -> Result<HandshakeOutcome, SocksError>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    let mut scratch = vec![0u8; read_chunk_size.max(1)];
    session.start();

    loop {
        if session.phase() == Phase::Failed {
            break;
        }

        let mut wrote = false;
        while let Some(frame) = session.poll_transmit() {
            transport.write_all(&frame).await?;
            wrote = true;
        }
        if wrote {
            transport.flush().await?;
        }

        if session.phase().is_terminal() {
            break;
        }

        let n = transport.read(&mut scratch).await?;
        if n == 0 {
            session.feed_eof();
        } else {
            tracing::trace!(
                target: "sockslane::socks",
                bytes = n,
                phase = ?session.phase(),
                "received handshake bytes"
            );
            session.feed(&scratch[..n]);
        }
    }

    session.into_outcome()
}
