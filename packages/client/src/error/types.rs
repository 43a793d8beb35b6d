//! Stage-tagged error types for tunnel establishment
//!
//! Every failure an establish attempt can produce originates in exactly one of
//! three stages. Each stage has its own error enum, and `TaggedError` is the
//! only shape that crosses the orchestrator boundary.

use std::fmt;
use std::io;

use crate::socks::{Phase, ReplyCode};

/// A Result alias where the Err case is [`TaggedError`].
pub type Result<T> = std::result::Result<T, TaggedError>;

/// Pipeline stage in which a failure originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Connecting to the proxy itself
    Dial,
    /// SOCKS5 negotiation with the proxy
    Socks,
    /// TLS upgrade on top of the established tunnel
    Ssl,
}

impl Stage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Dial => "dial",
            Stage::Socks => "socks",
            Stage::Ssl => "ssl",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures while reaching the proxy endpoint.
#[derive(Debug, thiserror::Error)]
pub enum DialError {
    #[error("failed to resolve proxy {endpoint}: {source}")]
    Resolve {
        endpoint: String,
        #[source]
        source: io::Error,
    },
    #[error("proxy {0} resolved to no addresses")]
    NoAddress(String),
    #[error("failed to connect to proxy {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: io::Error,
    },
    #[error("timed out connecting to proxy {0}")]
    TimedOut(String),
    #[error("connection attempt was interrupted while dialing")]
    Interrupted,
}

/// Failures during SOCKS5 negotiation, including request validation.
#[derive(Debug, thiserror::Error)]
pub enum SocksError {
    #[error("unsupported CONNECT target {0:?}: only IPv4 literals are supported")]
    UnsupportedTarget(String),
    #[error("CONNECT target port must be non-zero")]
    InvalidTargetPort,
    #[error("unexpected protocol version {found:#04x} (expected {expected:#04x})")]
    UnexpectedVersion { expected: u8, found: u8 },
    #[error("proxy accepted none of the offered authentication methods")]
    NoAcceptableMethod,
    #[error("proxy selected authentication method {0:#04x} which was not offered")]
    UnexpectedMethod(u8),
    #[error("proxy rejected the supplied credentials (status {0:#04x})")]
    AuthRejected(u8),
    #[error("proxy rejected CONNECT: {0}")]
    ConnectRejected(ReplyCode),
    #[error("malformed proxy reply: {0}")]
    MalformedReply(&'static str),
    #[error("proxy closed the connection while {phase}")]
    UnexpectedClose { phase: Phase },
    #[error("transport error during handshake: {0}")]
    Io(#[from] io::Error),
    #[error("timed out waiting for the proxy handshake")]
    TimedOut,
    #[error("connection attempt was interrupted during the handshake")]
    Interrupted,
}

/// Failures while layering TLS over the tunnel.
#[derive(Debug, thiserror::Error)]
pub enum SslError {
    #[error("invalid TLS server name {0:?}")]
    InvalidServerName(String),
    #[error("failed to build TLS configuration: {0}")]
    Config(#[from] rustls::Error),
    #[error("TLS handshake failed: {0}")]
    Handshake(#[source] io::Error),
    #[error("TLS upgrade requested but this connector has no TLS upgrader")]
    Refused,
    #[error("timed out during the TLS handshake")]
    TimedOut,
    #[error("connection attempt was interrupted during the TLS upgrade")]
    Interrupted,
}

/// The underlying failure of a [`TaggedError`].
#[derive(Debug)]
pub enum Cause {
    Dial(DialError),
    Socks(SocksError),
    Ssl(SslError),
}

impl Cause {
    fn stage(&self) -> Stage {
        match self {
            Cause::Dial(_) => Stage::Dial,
            Cause::Socks(_) => Stage::Socks,
            Cause::Ssl(_) => Stage::Ssl,
        }
    }

    fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        match self {
            Cause::Dial(e) => e,
            Cause::Socks(e) => e,
            Cause::Ssl(e) => e,
        }
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_error(), f)
    }
}

/// A failure annotated with the stage it originated in.
///
/// The stage is derived from the cause, so the two can never disagree.
#[derive(Debug)]
pub struct TaggedError {
    stage: Stage,
    cause: Cause,
}

impl TaggedError {
    #[must_use]
    pub fn new(cause: Cause) -> Self {
        Self {
            stage: cause.stage(),
            cause,
        }
    }

    /// Build the "task ended without delivering" error for a stage.
    pub(crate) fn interrupted(stage: Stage) -> Self {
        match stage {
            Stage::Dial => DialError::Interrupted.into(),
            Stage::Socks => SocksError::Interrupted.into(),
            Stage::Ssl => SslError::Interrupted.into(),
        }
    }

    /// Build the deadline-expired error for a stage.
    pub(crate) fn timed_out(stage: Stage, proxy: &str) -> Self {
        match stage {
            Stage::Dial => DialError::TimedOut(proxy.to_string()).into(),
            Stage::Socks => SocksError::TimedOut.into(),
            Stage::Ssl => SslError::TimedOut.into(),
        }
    }

    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    #[must_use]
    pub fn cause(&self) -> &Cause {
        &self.cause
    }

    #[must_use]
    pub fn into_cause(self) -> Cause {
        self.cause
    }
}

impl fmt::Display for TaggedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} stage failed: {}", self.stage, self.cause)
    }
}

impl std::error::Error for TaggedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.cause.as_error())
    }
}

impl From<DialError> for TaggedError {
    fn from(err: DialError) -> Self {
        TaggedError::new(Cause::Dial(err))
    }
}

impl From<SocksError> for TaggedError {
    fn from(err: SocksError) -> Self {
        TaggedError::new(Cause::Socks(err))
    }
}

impl From<SslError> for TaggedError {
    fn from(err: SslError) -> Self {
        TaggedError::new(Cause::Ssl(err))
    }
}
