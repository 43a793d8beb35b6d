//! Proxy authentication parameters
//!
//! Username/password credentials per RFC 1929. Both fields are limited to
//! 1..=255 bytes because the wire format carries one-byte lengths.

use std::fmt;

use zeroize::Zeroizing;

use super::protocol::{METHOD_NO_AUTH, METHOD_USERNAME_PASSWORD};

/// Credential validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialsError {
    #[error("proxy username must not be empty")]
    EmptyUsername,
    #[error("proxy password must not be empty")]
    EmptyPassword,
    #[error("proxy username is {0} bytes long (maximum 255)")]
    UsernameTooLong(usize),
    #[error("proxy password is {0} bytes long (maximum 255)")]
    PasswordTooLong(usize),
}

/// Username and password for the proxy; the password is wiped on drop.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: Zeroizing<String>,
}

impl Credentials {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, CredentialsError> {
        let username = username.into();
        let password = Zeroizing::new(password.into());

        match username.len() {
            0 => return Err(CredentialsError::EmptyUsername),
            len if len > 255 => return Err(CredentialsError::UsernameTooLong(len)),
            _ => {}
        }
        match password.len() {
            0 => return Err(CredentialsError::EmptyPassword),
            len if len > 255 => return Err(CredentialsError::PasswordTooLong(len)),
            _ => {}
        }

        Ok(Self { username, password })
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// How to authenticate against the proxy.
#[derive(Clone, Debug, Default)]
pub enum ProxyAuth {
    #[default]
    None,
    UsernamePassword(Credentials),
}

impl ProxyAuth {
    /// Build username/password auth, validating both fields.
    pub fn username_password(
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, CredentialsError> {
        Credentials::new(username, password).map(ProxyAuth::UsernamePassword)
    }

    /// Methods offered in the negotiation request, in preference order.
    #[must_use]
    pub fn offered_methods(&self) -> &'static [u8] {
        match self {
            ProxyAuth::None => &[METHOD_NO_AUTH],
            ProxyAuth::UsernamePassword(_) => &[METHOD_NO_AUTH, METHOD_USERNAME_PASSWORD],
        }
    }

    #[must_use]
    pub fn credentials(&self) -> Option<&Credentials> {
        match self {
            ProxyAuth::None => None,
            ProxyAuth::UsernamePassword(credentials) => Some(credentials),
        }
    }
}
