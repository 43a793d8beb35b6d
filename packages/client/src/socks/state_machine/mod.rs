//! SOCKS5 client handshake state machine
//!
//! Sans-I/O implementation of the client side of RFC 1928 with RFC 1929
//! username/password authentication. The machine is driven entirely by the
//! bytes handed to it and never blocks or performs I/O, so it behaves the
//! same whether replies arrive whole, split byte by byte, or coalesced with
//! the first bytes of the tunnel.
//!
//! # Architecture
//!
//! - `types`: State enum, public phase view, session struct and statistics
//! - `transitions`: Pure transition function over buffered input
//! - `engine`: Applies transitions and manages the buffers
//!
//! # Usage
//!
//! ```rust
//! use sockslane_client::proxy::Endpoint;
//! use sockslane_client::socks::{Phase, ProxyAuth, Socks5Handshake};
//!
//! let mut session = Socks5Handshake::new(&Endpoint::new("192.0.2.10", 80), ProxyAuth::None)
//!     .expect("IPv4 target");
//! session.start();
//! assert_eq!(session.poll_transmit().as_deref(), Some(&[0x05, 0x01, 0x00][..]));
//!
//! session.feed(&[0x05, 0x00]);
//! let connect = session.poll_transmit().expect("CONNECT request");
//! assert_eq!(connect[1], 0x01);
//!
//! session.feed(&[0x05, 0x00, 0x00, 0x01, 10, 0, 0, 1, 0x1F, 0x90]);
//! assert_eq!(session.phase(), Phase::Established);
//! ```

mod engine;
mod transitions;
mod types;

pub use types::{HandshakeOutcome, HandshakeStats, Phase, Socks5Handshake};
