//! SOCKS5 protocol support
//!
//! Wire codecs, authentication parameters and the client handshake state
//! machine. Only CONNECT with an IPv4 target is produced; replies carrying
//! any address type are understood.

pub mod auth;
pub mod protocol;
pub mod state_machine;

pub use auth::{Credentials, CredentialsError, ProxyAuth};
pub use protocol::{AddressType, BoundAddress, ReplyCode};
pub use state_machine::{HandshakeOutcome, HandshakeStats, Phase, Socks5Handshake};
