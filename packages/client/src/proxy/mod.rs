//! Proxy and destination addressing
//!
//! Endpoints for the proxy and the final destination, plus `socks5://` URL
//! parsing into an endpoint and its authentication parameters.

mod endpoint;
mod url_handling;

pub use endpoint::{DEFAULT_PROXY_PORT, Endpoint};
pub use url_handling::EndpointError;
