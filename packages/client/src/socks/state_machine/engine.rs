//! Handshake processing engine
//!
//! Applies the transition function to buffered input until the current state
//! needs more bytes or a terminal state is reached.

use std::collections::VecDeque;
use std::net::{Ipv4Addr, SocketAddrV4};

use bytes::{Buf, Bytes, BytesMut};

use super::transitions::transition;
use super::types::{
    Context, HandshakeOutcome, HandshakeState, HandshakeStats, Phase, Socks5Handshake, Transition,
};
use crate::error::SocksError;
use crate::proxy::Endpoint;
use crate::socks::auth::ProxyAuth;
use crate::socks::protocol::{METHOD_NO_AUTH, METHOD_USERNAME_PASSWORD};

impl Socks5Handshake {
    /// Create a session for one connection attempt.
    ///
    /// The target must be an IPv4 literal with a non-zero port; nothing is
    /// emitted until [`start`](Self::start) or the first [`feed`](Self::feed).
    pub fn new(target: &Endpoint, auth: ProxyAuth) -> Result<Self, SocksError> {
        let ip: Ipv4Addr = target
            .host()
            .parse()
            .map_err(|_| SocksError::UnsupportedTarget(target.host().to_string()))?;
        if target.port() == 0 {
            return Err(SocksError::InvalidTargetPort);
        }

        Ok(Self {
            state: HandshakeState::Init,
            stats: HandshakeStats::default(),
            target: SocketAddrV4::new(ip, target.port()),
            auth,
            method: None,
            buffer: BytesMut::new(),
            outbound: VecDeque::new(),
        })
    }

    /// Get current phase
    #[inline]
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    #[inline]
    #[must_use]
    pub fn stats(&self) -> &HandshakeStats {
        &self.stats
    }

    /// Authentication method the proxy selected, once known.
    #[must_use]
    pub fn negotiated_method(&self) -> Option<u8> {
        self.method
    }

    /// Queue the method negotiation request.
    pub fn start(&mut self) {
        self.run();
    }

    /// Hand received bytes to the machine.
    ///
    /// Bytes arriving after the CONNECT reply are kept as tunnel surplus;
    /// bytes arriving after a failure are discarded.
    pub fn feed(&mut self, data: &[u8]) {
        match self.phase() {
            Phase::Failed => {}
            Phase::Established => self.buffer.extend_from_slice(data),
            _ => {
                self.stats.bytes_received += data.len() as u64;
                self.buffer.extend_from_slice(data);
                self.run();
            }
        }
    }

    /// Signal that the peer closed its side of the transport.
    pub fn feed_eof(&mut self) {
        let phase = self.phase();
        if !phase.is_terminal() {
            self.enter(HandshakeState::Failed(SocksError::UnexpectedClose { phase }));
        }
    }

    /// Next frame to write, in generation order.
    pub fn poll_transmit(&mut self) -> Option<Bytes> {
        self.outbound.pop_front()
    }

    #[must_use]
    pub fn has_pending_output(&self) -> bool {
        !self.outbound.is_empty()
    }

    /// Consume the session, yielding the tunnel details or the failure.
    ///
    /// A session that has not reached a terminal phase reports
    /// [`SocksError::Interrupted`].
    pub fn into_outcome(self) -> Result<HandshakeOutcome, SocksError> {
        match self.state {
            HandshakeState::Established(bound) => Ok(HandshakeOutcome {
                bound,
                surplus: self.buffer.freeze(),
                method: self.method.unwrap_or(METHOD_NO_AUTH),
            }),
            HandshakeState::Failed(err) => Err(err),
            _ => Err(SocksError::Interrupted),
        }
    }

    fn run(&mut self) {
        while !self.phase().is_terminal() {
            let ctx = Context {
                target: self.target,
                auth: &self.auth,
            };
            match transition(&self.state, &self.buffer, &ctx) {
                Transition::NeedMore => break,
                Transition::Advance {
                    next,
                    consumed,
                    emit,
                } => {
                    self.buffer.advance(consumed);
                    if let Some(frame) = emit {
                        self.stats.bytes_sent += frame.len() as u64;
                        self.stats.frames_sent += 1;
                        self.outbound.push_back(frame);
                    }
                    self.enter(next);
                }
            }
        }
    }

    fn enter(&mut self, next: HandshakeState) {
        let from = self.phase();
        let to = next.phase();
        debug_assert!(to > from, "handshake moved backwards: {from:?} -> {to:?}");

        if from == Phase::AwaitingMethodSelection {
            match to {
                Phase::ReadyToConnect => self.method = Some(METHOD_NO_AUTH),
                Phase::Authenticating => self.method = Some(METHOD_USERNAME_PASSWORD),
                _ => {}
            }
        }

        match &next {
            HandshakeState::Established(bound) => {
                tracing::debug!(
                    target: "sockslane::socks",
                    target_addr = %self.target,
                    bound = %bound,
                    "SOCKS5 tunnel established"
                );
            }
            HandshakeState::Failed(err) => {
                // Nothing queued may reach the wire after a failure.
                self.outbound.clear();
                tracing::debug!(
                    target: "sockslane::socks",
                    target_addr = %self.target,
                    phase = ?from,
                    error = %err,
                    "SOCKS5 handshake failed"
                );
            }
            _ => {
                tracing::trace!(target: "sockslane::socks", ?from, ?to, "handshake transition");
            }
        }

        self.state = next;
        self.stats.state_transitions += 1;
    }
}
