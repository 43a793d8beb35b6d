//! Proxy URL parsing
//!
//! Accepts `socks5://[user[:password]@]host[:port]` and splits it into the
//! proxy endpoint and the authentication parameters.

use url::{Host, Url};

use super::endpoint::{DEFAULT_PROXY_PORT, Endpoint};
use crate::socks::{CredentialsError, ProxyAuth};

/// Proxy URL parsing failures.
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    #[error("invalid proxy URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("unsupported proxy scheme {0:?}: only socks5 is supported")]
    UnsupportedScheme(String),
    #[error("proxy URL must have a host")]
    MissingHost,
    #[error("proxy URL credentials are not valid UTF-8")]
    InvalidEncoding,
    #[error("invalid proxy credentials: {0}")]
    Credentials(#[from] CredentialsError),
}

impl Endpoint {
    /// Parse a `socks5://` proxy URL into an endpoint and its auth.
    ///
    /// The port defaults to 1080. Credentials are percent-decoded; a
    /// username without a password is rejected.
    pub fn from_proxy_url(input: &str) -> Result<(Endpoint, ProxyAuth), EndpointError> {
        let url = Url::parse(input)?;
        if url.scheme() != "socks5" {
            return Err(EndpointError::UnsupportedScheme(url.scheme().to_string()));
        }

        let host = match url.host() {
            Some(Host::Domain(name)) if !name.is_empty() => name.to_string(),
            Some(Host::Ipv4(ip)) => ip.to_string(),
            Some(Host::Ipv6(ip)) => ip.to_string(),
            _ => return Err(EndpointError::MissingHost),
        };
        let endpoint = Endpoint::new(host, url.port().unwrap_or(DEFAULT_PROXY_PORT));

        let auth = if url.username().is_empty() && url.password().is_none() {
            ProxyAuth::None
        } else {
            let username = decode(url.username())?;
            let password = decode(url.password().unwrap_or_default())?;
            ProxyAuth::username_password(username, password)?
        };

        tracing::trace!(
            target: "sockslane::proxy",
            endpoint = %endpoint,
            authenticated = auth.credentials().is_some(),
            "parsed proxy URL"
        );
        Ok((endpoint, auth))
    }
}

fn decode(component: &str) -> Result<String, EndpointError> {
    urlencoding::decode(component)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| EndpointError::InvalidEncoding)
}
