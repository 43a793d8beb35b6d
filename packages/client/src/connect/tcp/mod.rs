//! TCP transport to the proxy
//!
//! Address resolution, sequential connection attempts and socket tuning.

pub mod dialer;
pub mod socket_config;

pub use dialer::{Dialer, TcpDialer};
pub use socket_config::configure_tcp_socket;
