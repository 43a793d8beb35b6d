//! State machine types and data structures
//!
//! This module contains the handshake state enum, the public phase view of
//! it, and the session struct that owns buffers and statistics.

use std::collections::VecDeque;
use std::fmt;
use std::net::SocketAddrV4;

use bytes::{Bytes, BytesMut};

use crate::error::SocksError;
use crate::socks::auth::ProxyAuth;
use crate::socks::protocol::BoundAddress;

/// Externally visible handshake phase.
///
/// Phases are ordered: a session only ever moves to a greater phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Init,
    AwaitingMethodSelection,
    Authenticating,
    ReadyToConnect,
    AwaitingConnectReply,
    Established,
    Failed,
}

impl Phase {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Established | Phase::Failed)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Init => "starting the handshake",
            Phase::AwaitingMethodSelection => "negotiating the authentication method",
            Phase::Authenticating => "authenticating",
            Phase::ReadyToConnect => "sending the CONNECT request",
            Phase::AwaitingConnectReply => "waiting for the CONNECT reply",
            Phase::Established => "tunneling",
            Phase::Failed => "failed",
        })
    }
}

/// Handshake state carrying the data each terminal state owns.
#[derive(Debug)]
pub enum HandshakeState {
    Init,
    AwaitingMethodSelection,
    Authenticating,
    ReadyToConnect,
    AwaitingConnectReply,
    Established(BoundAddress),
    Failed(SocksError),
}

impl HandshakeState {
    #[must_use]
    pub fn phase(&self) -> Phase {
        match self {
            HandshakeState::Init => Phase::Init,
            HandshakeState::AwaitingMethodSelection => Phase::AwaitingMethodSelection,
            HandshakeState::Authenticating => Phase::Authenticating,
            HandshakeState::ReadyToConnect => Phase::ReadyToConnect,
            HandshakeState::AwaitingConnectReply => Phase::AwaitingConnectReply,
            HandshakeState::Established(_) => Phase::Established,
            HandshakeState::Failed(_) => Phase::Failed,
        }
    }
}

/// Result of applying the transition function to the buffered input.
#[derive(Debug)]
pub enum Transition {
    /// The current state needs more bytes before it can decide.
    NeedMore,
    /// Move to `next`, dropping `consumed` bytes from the front of the
    /// buffer and queueing `emit` for the transport.
    Advance {
        next: HandshakeState,
        consumed: usize,
        emit: Option<Bytes>,
    },
}

/// Read-only inputs the transition function needs besides the buffer.
pub struct Context<'a> {
    pub target: SocketAddrV4,
    pub auth: &'a ProxyAuth,
}

/// Handshake statistics, useful for tracing and tests.
#[derive(Debug, Clone, Default)]
pub struct HandshakeStats {
    /// Bytes handed to the machine through `feed`
    pub bytes_received: u64,
    /// Bytes queued for the transport
    pub bytes_sent: u64,
    /// Frames queued for the transport
    pub frames_sent: u32,
    /// State transitions performed
    pub state_transitions: u32,
}

/// Successful handshake result.
#[derive(Debug)]
pub struct HandshakeOutcome {
    /// Address the proxy bound for the tunnel
    pub bound: BoundAddress,
    /// Bytes that arrived after the CONNECT reply; they belong to the tunnel
    pub surplus: Bytes,
    /// Authentication method the proxy selected
    pub method: u8,
}

/// Client-side SOCKS5 handshake session.
///
/// Pure protocol logic: it never touches I/O. Feed it received bytes with
/// [`feed`](Self::feed) and drain frames to send with
/// [`poll_transmit`](Self::poll_transmit).
#[derive(Debug)]
pub struct Socks5Handshake {
    pub(super) state: HandshakeState,
    pub(super) stats: HandshakeStats,
    pub(super) target: SocketAddrV4,
    pub(super) auth: ProxyAuth,
    pub(super) method: Option<u8>,
    /// Received bytes not yet consumed by a state
    pub(super) buffer: BytesMut,
    /// Frames waiting to be written, oldest first
    pub(super) outbound: VecDeque<Bytes>,
}
