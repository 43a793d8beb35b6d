//! Stream types produced by a successful connection attempt

pub mod stream;
pub mod tunnel;

pub use stream::TunnelStream;
pub use tunnel::Tunnel;
