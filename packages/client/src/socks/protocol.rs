//! SOCKS5 wire format
//!
//! Frame encoders for the client side of RFC 1928 / RFC 1929 and decoders for
//! the server replies. Decoders work on a borrowed prefix of the receive
//! buffer and report how many bytes a complete frame needs, so callers can
//! buffer partial input without copying.

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV4, SocketAddrV6};

use bytes::{BufMut, Bytes, BytesMut};

use super::auth::Credentials;
use crate::error::SocksError;

pub const SOCKS_VERSION: u8 = 0x05;
pub const AUTH_SUBNEGOTIATION_VERSION: u8 = 0x01;

pub const METHOD_NO_AUTH: u8 = 0x00;
pub const METHOD_USERNAME_PASSWORD: u8 = 0x02;
pub const METHOD_NONE_ACCEPTABLE: u8 = 0xFF;

pub const CMD_CONNECT: u8 = 0x01;
pub const RESERVED: u8 = 0x00;
pub const AUTH_SUCCESS: u8 = 0x00;

/// Size of the method selection and auth status replies.
pub const SHORT_REPLY_LEN: usize = 2;
/// `VER REP RSV ATYP` before the bound address.
pub const CONNECT_REPLY_HEADER_LEN: usize = 4;

/// Address type field of CONNECT requests and replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AddressType {
    Ipv4 = 0x01,
    DomainName = 0x03,
    Ipv6 = 0x04,
}

impl TryFrom<u8> for AddressType {
    type Error = SocksError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(AddressType::Ipv4),
            0x03 => Ok(AddressType::DomainName),
            0x04 => Ok(AddressType::Ipv6),
            _ => Err(SocksError::MalformedReply("unknown address type")),
        }
    }
}

/// REP field of a CONNECT reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyCode {
    Succeeded,
    GeneralFailure,
    NotAllowed,
    NetworkUnreachable,
    HostUnreachable,
    ConnectionRefused,
    TtlExpired,
    CommandNotSupported,
    AddressTypeNotSupported,
    Unknown(u8),
}

impl From<u8> for ReplyCode {
    fn from(value: u8) -> Self {
        match value {
            0x00 => ReplyCode::Succeeded,
            0x01 => ReplyCode::GeneralFailure,
            0x02 => ReplyCode::NotAllowed,
            0x03 => ReplyCode::NetworkUnreachable,
            0x04 => ReplyCode::HostUnreachable,
            0x05 => ReplyCode::ConnectionRefused,
            0x06 => ReplyCode::TtlExpired,
            0x07 => ReplyCode::CommandNotSupported,
            0x08 => ReplyCode::AddressTypeNotSupported,
            other => ReplyCode::Unknown(other),
        }
    }
}

impl fmt::Display for ReplyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplyCode::Succeeded => f.write_str("succeeded"),
            ReplyCode::GeneralFailure => f.write_str("general SOCKS server failure"),
            ReplyCode::NotAllowed => f.write_str("connection not allowed by ruleset"),
            ReplyCode::NetworkUnreachable => f.write_str("network unreachable"),
            ReplyCode::HostUnreachable => f.write_str("host unreachable"),
            ReplyCode::ConnectionRefused => f.write_str("connection refused"),
            ReplyCode::TtlExpired => f.write_str("TTL expired"),
            ReplyCode::CommandNotSupported => f.write_str("command not supported"),
            ReplyCode::AddressTypeNotSupported => f.write_str("address type not supported"),
            ReplyCode::Unknown(code) => write!(f, "unknown reply code {code:#04x}"),
        }
    }
}

/// Address the proxy bound for the tunnel, as reported in the CONNECT reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundAddress {
    Ip(SocketAddr),
    Domain(String, u16),
}

impl fmt::Display for BoundAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundAddress::Ip(addr) => write!(f, "{addr}"),
            BoundAddress::Domain(host, port) => write!(f, "{host}:{port}"),
        }
    }
}

/// `[VER, NMETHODS, METHODS...]`
pub fn encode_method_request(methods: &[u8]) -> Bytes {
    let mut frame = BytesMut::with_capacity(2 + methods.len());
    frame.put_u8(SOCKS_VERSION);
    // At most two methods are ever offered.
    frame.put_u8(methods.len() as u8);
    frame.put_slice(methods);
    frame.freeze()
}

/// `[0x01, ULEN, UNAME, PLEN, PASSWD]`
pub fn encode_auth_request(credentials: &Credentials) -> Bytes {
    let username = credentials.username().as_bytes();
    let password = credentials.password().as_bytes();

    let mut frame = BytesMut::with_capacity(3 + username.len() + password.len());
    frame.put_u8(AUTH_SUBNEGOTIATION_VERSION);
    // Lengths are bounded to 255 when the credentials are built.
    frame.put_u8(username.len() as u8);
    frame.put_slice(username);
    frame.put_u8(password.len() as u8);
    frame.put_slice(password);
    frame.freeze()
}

/// `[0x05, CMD_CONNECT, RSV, ATYP_IPV4, ADDR(4), PORT(2)]`
pub fn encode_connect_request(target: SocketAddrV4) -> Bytes {
    let mut frame = BytesMut::with_capacity(10);
    frame.put_u8(SOCKS_VERSION);
    frame.put_u8(CMD_CONNECT);
    frame.put_u8(RESERVED);
    frame.put_u8(AddressType::Ipv4 as u8);
    frame.put_slice(&target.ip().octets());
    frame.put_u16(target.port());
    frame.freeze()
}

/// Total length of a CONNECT reply, once enough of it is buffered to tell.
///
/// Returns `Ok(None)` when the header (or the domain length byte) has not
/// arrived yet.
pub fn connect_reply_len(buf: &[u8]) -> Result<Option<usize>, SocksError> {
    if buf.len() < CONNECT_REPLY_HEADER_LEN {
        return Ok(None);
    }
    let addr_len = match AddressType::try_from(buf[3])? {
        AddressType::Ipv4 => 4,
        AddressType::Ipv6 => 16,
        AddressType::DomainName => match buf.get(CONNECT_REPLY_HEADER_LEN) {
            Some(len) => 1 + usize::from(*len),
            None => return Ok(None),
        },
    };
    Ok(Some(CONNECT_REPLY_HEADER_LEN + addr_len + 2))
}

/// Decode the bound address of a complete CONNECT reply frame.
pub fn decode_bound_address(frame: &[u8]) -> Result<BoundAddress, SocksError> {
    let body = &frame[CONNECT_REPLY_HEADER_LEN..];
    let port_at = body.len() - 2;
    let port = u16::from_be_bytes([body[port_at], body[port_at + 1]]);

    match AddressType::try_from(frame[3])? {
        AddressType::Ipv4 => {
            let octets: [u8; 4] = body[..4]
                .try_into()
                .map_err(|_| SocksError::MalformedReply("truncated IPv4 bound address"))?;
            Ok(BoundAddress::Ip(SocketAddr::V4(SocketAddrV4::new(
                Ipv4Addr::from(octets),
                port,
            ))))
        }
        AddressType::Ipv6 => {
            let octets: [u8; 16] = body[..16]
                .try_into()
                .map_err(|_| SocksError::MalformedReply("truncated IPv6 bound address"))?;
            Ok(BoundAddress::Ip(SocketAddr::V6(SocketAddrV6::new(
                Ipv6Addr::from(octets),
                port,
                0,
                0,
            ))))
        }
        AddressType::DomainName => {
            let name = &body[1..port_at];
            let host = std::str::from_utf8(name)
                .map_err(|_| SocksError::MalformedReply("bound domain name is not UTF-8"))?;
            Ok(BoundAddress::Domain(host.to_string(), port))
        }
    }
}
