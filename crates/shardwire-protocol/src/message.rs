//! The message-under-construction and the state it carries across calls.
//!
//! A [`Message`] is cheap, `Copy`-free state: a handful of byte offsets and
//! small enums. It never owns the bytes it describes — those live in
//! whichever [`crate::buffer::Buf`] is current when the parser is called.

use shardwire_core::ParseFailure;

use crate::commands::CommandTag;

/// States of the unified-request state machine (`nc_parse.c::parse_request`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Start,
    Narg,
    NargLf,
    ReqTypeLen,
    ReqTypeLenLf,
    ReqType,
    ReqTypeLf,
    KeyLen,
    KeyLenLf,
    Key,
    KeyLf,
    Arg1Len,
    Arg1LenLf,
    Arg1,
    Arg1Lf,
    Arg2Len,
    Arg2LenLf,
    Arg2,
    Arg2Lf,
    ArgNLen,
    ArgNLenLf,
    ArgN,
    ArgNLf,
    Fragment,
}

/// States of the reply state machine (`nc_parse.c::parse_response`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseState {
    Start,
    Status,
    Error,
    Integer,
    Bulk,
    BulkLf,
    BulkArg,
    BulkArgLf,
    Multibulk,
    MultibulkNargLf,
    MultibulkArgNLen,
    MultibulkArgNLenLf,
    MultibulkArgN,
    MultibulkArgNLf,
    RunToCrlf,
    AlmostDone,
}

/// Which of the two state machines a [`Message`] is mid-parse in.
///
/// The original C parser tracks this with a separate `request: bool` flag
/// that could in principle disagree with the opaque `state` integer. Here
/// the two are fused: a `Message` is either mid-request or mid-response,
/// never both, and that is enforced by the type rather than by convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineState {
    Request(RequestState),
    Response(ResponseState),
}

impl MachineState {
    pub fn is_request(self) -> bool {
        matches!(self, MachineState::Request(_))
    }
}

/// The reply kind once the first sigil byte has been seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    Status,
    Error,
    Integer,
    Bulk,
    Multibulk,
}

/// What a framed message turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Unknown,
    Request(CommandTag),
    Response(ReplyKind),
}

/// The five-way verdict a parser call can return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A complete message was framed; `Message` has been reset and is ready
    /// to parse the next one starting at the returned position.
    Ok,
    /// Buffer exhausted mid-message; call again once more bytes arrive.
    Again,
    /// Buffer exhausted mid-message *and* physically full; the straddling
    /// token must be copied into a fresh buffer before the next call.
    Repair,
    /// A multi-key request (`ArgX` arity) framed its first key; the
    /// remaining raw argument bytes still need splitting — see
    /// [`crate::fragment`].
    Fragment,
    /// The input violates the grammar; the message is dead.
    Error(ParseFailure),
}

/// A message under construction, plus all state needed to resume parsing
/// it across buffer boundaries.
#[derive(Debug, Clone)]
pub struct Message {
    pub state: MachineState,
    /// Offset into the current buffer where the next byte to consume is.
    pub pos: usize,
    /// Offset where the message started, within the current buffer.
    pub start: usize,
    /// Offset where the currently-open token began, if any.
    pub token: Option<usize>,
    pub rnarg: u32,
    pub narg: u32,
    pub narg_start: Option<usize>,
    pub narg_end: Option<usize>,
    pub rlen: u32,
    pub classification: Classification,
    pub key_start: Option<usize>,
    pub key_end: Option<usize>,
    pub result: Option<Outcome>,
}

impl Message {
    /// A fresh message ready to parse a unified request starting at `pos`.
    pub fn new_request(pos: usize) -> Self {
        Message {
            state: MachineState::Request(RequestState::Start),
            pos,
            start: pos,
            token: None,
            rnarg: 0,
            narg: 0,
            narg_start: None,
            narg_end: None,
            rlen: 0,
            classification: Classification::Unknown,
            key_start: None,
            key_end: None,
            result: None,
        }
    }

    /// A fresh message ready to parse a reply starting at `pos`.
    pub fn new_response(pos: usize) -> Self {
        Message {
            state: MachineState::Response(ResponseState::Start),
            pos,
            start: pos,
            token: None,
            rnarg: 0,
            narg: 0,
            narg_start: None,
            narg_end: None,
            rlen: 0,
            classification: Classification::Unknown,
            key_start: None,
            key_end: None,
            result: None,
        }
    }

    pub fn is_request(&self) -> bool {
        self.state.is_request()
    }

    /// The key's byte range within the current buffer, once framed.
    pub fn key_range(&self) -> Option<std::ops::Range<usize>> {
        match (self.key_start, self.key_end) {
            (Some(s), Some(e)) => Some(s..e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_request_starts_clean() {
        let msg = Message::new_request(0);
        assert!(msg.is_request());
        assert_eq!(msg.pos, 0);
        assert_eq!(msg.token, None);
        assert_eq!(msg.classification, Classification::Unknown);
    }

    #[test]
    fn new_response_is_not_a_request() {
        let msg = Message::new_response(3);
        assert!(!msg.is_request());
        assert_eq!(msg.start, 3);
    }

    #[test]
    fn key_range_requires_both_bounds() {
        let mut msg = Message::new_request(0);
        assert_eq!(msg.key_range(), None);
        msg.key_start = Some(4);
        assert_eq!(msg.key_range(), None);
        msg.key_end = Some(7);
        assert_eq!(msg.key_range(), Some(4..7));
    }
}
