pub mod classification;
pub mod types;

pub use types::{Cause, DialError, Result, SocksError, SslError, Stage, TaggedError};
