//! Connector service
//!
//! The connector itself, the `establish` pipeline and its background
//! variants.

pub mod core;
pub mod interface;
pub mod proxy;

pub use self::core::Socks5Connector;
pub use proxy::EstablishedStream;
