//! State transition function
//!
//! `transition` looks at the current state and the buffered input and decides
//! the next state. It does not mutate anything; the engine applies the result.

use super::types::{Context, HandshakeState, Transition};
use crate::error::SocksError;
use crate::socks::protocol::{
    self, AUTH_SUBNEGOTIATION_VERSION, AUTH_SUCCESS, METHOD_NO_AUTH, METHOD_NONE_ACCEPTABLE,
    METHOD_USERNAME_PASSWORD, RESERVED, ReplyCode, SHORT_REPLY_LEN, SOCKS_VERSION,
};

pub fn transition(state: &HandshakeState, input: &[u8], ctx: &Context<'_>) -> Transition {
    match state {
        HandshakeState::Init => advance(
            HandshakeState::AwaitingMethodSelection,
            0,
            Some(protocol::encode_method_request(ctx.auth.offered_methods())),
        ),
        HandshakeState::AwaitingMethodSelection => method_selection(input, ctx),
        HandshakeState::Authenticating => auth_status(input),
        HandshakeState::ReadyToConnect => advance(
            HandshakeState::AwaitingConnectReply,
            0,
            Some(protocol::encode_connect_request(ctx.target)),
        ),
        HandshakeState::AwaitingConnectReply => connect_reply(input),
        HandshakeState::Established(_) | HandshakeState::Failed(_) => Transition::NeedMore,
    }
}

fn method_selection(input: &[u8], ctx: &Context<'_>) -> Transition {
    let Some(&[version, method]) = input.get(..SHORT_REPLY_LEN) else {
        return Transition::NeedMore;
    };
    if version != SOCKS_VERSION {
        return fail(
            SocksError::UnexpectedVersion {
                expected: SOCKS_VERSION,
                found: version,
            },
            SHORT_REPLY_LEN,
        );
    }

    match (method, ctx.auth.credentials()) {
        (METHOD_NO_AUTH, _) => advance(HandshakeState::ReadyToConnect, SHORT_REPLY_LEN, None),
        (METHOD_USERNAME_PASSWORD, Some(credentials)) => advance(
            HandshakeState::Authenticating,
            SHORT_REPLY_LEN,
            Some(protocol::encode_auth_request(credentials)),
        ),
        (METHOD_NONE_ACCEPTABLE, _) => fail(SocksError::NoAcceptableMethod, SHORT_REPLY_LEN),
        (other, _) => fail(SocksError::UnexpectedMethod(other), SHORT_REPLY_LEN),
    }
}

fn auth_status(input: &[u8]) -> Transition {
    let Some(&[version, status]) = input.get(..SHORT_REPLY_LEN) else {
        return Transition::NeedMore;
    };
    if version != AUTH_SUBNEGOTIATION_VERSION {
        return fail(
            SocksError::UnexpectedVersion {
                expected: AUTH_SUBNEGOTIATION_VERSION,
                found: version,
            },
            SHORT_REPLY_LEN,
        );
    }
    if status == AUTH_SUCCESS {
        advance(HandshakeState::ReadyToConnect, SHORT_REPLY_LEN, None)
    } else {
        fail(SocksError::AuthRejected(status), SHORT_REPLY_LEN)
    }
}

fn connect_reply(input: &[u8]) -> Transition {
    let Some(&[version, rep]) = input.get(..SHORT_REPLY_LEN) else {
        return Transition::NeedMore;
    };
    if version != SOCKS_VERSION {
        return fail(
            SocksError::UnexpectedVersion {
                expected: SOCKS_VERSION,
                found: version,
            },
            SHORT_REPLY_LEN,
        );
    }
    // A rejecting proxy may close right after the status byte.
    let code = ReplyCode::from(rep);
    if code != ReplyCode::Succeeded {
        return fail(SocksError::ConnectRejected(code), SHORT_REPLY_LEN);
    }
    if input.len() > 2 && input[2] != RESERVED {
        return fail(SocksError::MalformedReply("non-zero reserved byte"), 3);
    }

    let frame_len = match protocol::connect_reply_len(input) {
        Ok(Some(len)) if input.len() >= len => len,
        Ok(_) => return Transition::NeedMore,
        Err(err) => return fail(err, input.len()),
    };
    match protocol::decode_bound_address(&input[..frame_len]) {
        Ok(bound) => advance(HandshakeState::Established(bound), frame_len, None),
        Err(err) => fail(err, frame_len),
    }
}

fn advance(next: HandshakeState, consumed: usize, emit: Option<bytes::Bytes>) -> Transition {
    Transition::Advance {
        next,
        consumed,
        emit,
    }
}

fn fail(err: SocksError, consumed: usize) -> Transition {
    advance(HandshakeState::Failed(err), consumed, None)
}
