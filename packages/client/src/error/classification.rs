use std::error::Error as StdError;
use std::io;

use super::types::{Cause, DialError, SocksError, SslError, Stage, TaggedError};
use crate::socks::ReplyCode;

impl TaggedError {
    /// Returns true if the proxy could not be reached.
    #[must_use]
    pub fn is_dial(&self) -> bool {
        self.stage() == Stage::Dial
    }

    /// Returns true if the SOCKS5 negotiation failed.
    #[must_use]
    pub fn is_socks(&self) -> bool {
        self.stage() == Stage::Socks
    }

    /// Returns true if the TLS upgrade failed.
    #[must_use]
    pub fn is_ssl(&self) -> bool {
        self.stage() == Stage::Ssl
    }

    /// Returns true if the error is related to a timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self.cause() {
            Cause::Dial(DialError::TimedOut(_))
            | Cause::Socks(SocksError::TimedOut)
            | Cause::Ssl(SslError::TimedOut) => return true,
            _ => {}
        }

        let mut source = self.source();
        while let Some(err) = source {
            if let Some(io) = err.downcast_ref::<io::Error>()
                && io.kind() == io::ErrorKind::TimedOut
            {
                return true;
            }
            source = err.source();
        }

        false
    }

    /// Returns true if the proxy dropped the connection mid-handshake.
    ///
    /// This distinguishes "the proxy went away" from "the proxy said no".
    #[must_use]
    pub fn is_unexpected_close(&self) -> bool {
        matches!(
            self.cause(),
            Cause::Socks(SocksError::UnexpectedClose { .. })
        )
    }

    /// Returns true if the proxy actively refused the attempt
    /// (method, credentials or CONNECT rejection).
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(
            self.cause(),
            Cause::Socks(
                SocksError::NoAcceptableMethod
                    | SocksError::AuthRejected(_)
                    | SocksError::ConnectRejected(_)
            )
        )
    }

    /// The CONNECT reply code, if the proxy rejected the CONNECT request.
    #[must_use]
    pub fn reply_code(&self) -> Option<ReplyCode> {
        match self.cause() {
            Cause::Socks(SocksError::ConnectRejected(code)) => Some(*code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::socks::Phase;

    #[test]
    fn stage_follows_cause() {
        let dial: TaggedError = DialError::NoAddress("proxy:1080".into()).into();
        assert!(dial.is_dial());
        assert_eq!(dial.stage().to_string(), "dial");

        let socks: TaggedError = SocksError::NoAcceptableMethod.into();
        assert!(socks.is_socks());
        assert!(socks.is_rejection());

        let ssl: TaggedError = SslError::Refused.into();
        assert!(ssl.is_ssl());
        assert!(!ssl.is_rejection());
    }

    #[test]
    fn close_is_not_a_rejection() {
        let err: TaggedError = SocksError::UnexpectedClose {
            phase: Phase::AwaitingConnectReply,
        }
        .into();
        assert!(err.is_unexpected_close());
        assert!(!err.is_rejection());
        assert_eq!(err.reply_code(), None);
    }

    #[test]
    fn timeout_detected_through_io_source() {
        let err: TaggedError =
            SocksError::Io(io::Error::new(io::ErrorKind::TimedOut, "read timed out")).into();
        assert!(err.is_timeout());
        assert!(TaggedError::timed_out(Stage::Ssl, "proxy:1080").is_timeout());
        assert!(!TaggedError::interrupted(Stage::Dial).is_timeout());
    }

    #[test]
    fn display_names_the_stage() {
        let err: TaggedError = SocksError::ConnectRejected(ReplyCode::ConnectionRefused).into();
        let rendered = err.to_string();
        assert!(rendered.starts_with("socks stage failed"));
        assert!(rendered.contains("connection refused"));
        assert_eq!(err.reply_code(), Some(ReplyCode::ConnectionRefused));
    }
}
