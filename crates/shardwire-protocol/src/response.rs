//! The reply state machine.
//!
//! A 1:1 port of `nc_parse.c::parse_response`, covering all five RESP reply
//! forms. Status/error/integer replies are single lines run straight to
//! CR LF without remembering their payload — this parser only frames
//! messages, it never inspects reply *values*. Bulk and multibulk replies
//! additionally track a declared byte length, including the `$-1` nil-bulk
//! shortcut and its per-element counterpart inside a multibulk.
//!
//! The original re-examines the sigil byte once under its own state after
//! spotting it in `SW_START` (by walking the scan pointer back one byte).
//! Status/error/integer don't need that — every non-CR byte is a no-op in
//! [`ResponseState::RunToCrlf`] whether or not the sigil passed through it
//! — so those three fold the dispatch inline instead. Bulk and multibulk do
//! need the sigil to open their length token, so that setup happens inline
//! here too, with identical results to re-examining the byte.

use shardwire_core::constants::{
    BULK_SIGIL, CR, ERROR_SIGIL, INTEGER_SIGIL, LF, MULTIBULK_SIGIL, STATUS_SIGIL, is_digit,
};
use shardwire_core::ParseFailure;

use crate::buffer::Buf;
use crate::message::{Classification, MachineState, Message, Outcome, ReplyKind, ResponseState};

fn fail(msg: &mut Message, state: ResponseState, failure: ParseFailure) -> Outcome {
    msg.state = MachineState::Response(state);
    let outcome = Outcome::Error(failure);
    msg.result = Some(outcome);
    outcome
}

/// Parse as much of a reply as `buf` currently holds, resuming from
/// `msg.pos`/`msg.state`.
///
/// # Panics
/// Panics if `msg` is mid-parse of a request rather than a reply.
pub fn parse_response(msg: &mut Message, buf: &Buf) -> Outcome {
    use ResponseState::*;

    let mut state = match msg.state {
        MachineState::Response(s) => s,
        MachineState::Request(_) => panic!("parse_response called on a request-mode message"),
    };

    let data = buf.filled();
    let mut p = msg.pos;

    while p < data.len() {
        let ch = data[p];

        match state {
            Start => {
                match ch {
                    STATUS_SIGIL => {
                        msg.classification = Classification::Response(ReplyKind::Status);
                        state = RunToCrlf;
                    }
                    ERROR_SIGIL => {
                        msg.classification = Classification::Response(ReplyKind::Error);
                        state = RunToCrlf;
                    }
                    INTEGER_SIGIL => {
                        msg.classification = Classification::Response(ReplyKind::Integer);
                        state = RunToCrlf;
                    }
                    BULK_SIGIL => {
                        msg.classification = Classification::Response(ReplyKind::Bulk);
                        msg.token = Some(p);
                        msg.rlen = 0;
                        state = Bulk;
                    }
                    MULTIBULK_SIGIL => {
                        msg.classification = Classification::Response(ReplyKind::Multibulk);
                        msg.token = Some(p);
                        msg.narg_start = Some(p + 1);
                        msg.rnarg = 0;
                        state = Multibulk;
                    }
                    _ => return fail(msg, state, ParseFailure::UnexpectedByte),
                }
            }

            // Unreachable: Status/Error/Integer fold directly into
            // RunToCrlf from Start above and never become the current
            // state themselves.
            Status | Error | Integer => unreachable!("folded into Start"),

            RunToCrlf => match ch {
                CR => state = AlmostDone,
                _ => {}
            },

            AlmostDone => match ch {
                LF => {
                    msg.pos = p + 1;
                    msg.state = MachineState::Response(Start);
                    msg.token = None;
                    let outcome = Outcome::Ok;
                    msg.result = Some(outcome);
                    return outcome;
                }
                _ => return fail(msg, state, ParseFailure::MissingCrLf),
            },

            Bulk => {
                if msg.token.is_none() {
                    if ch != BULK_SIGIL {
                        return fail(msg, state, ParseFailure::UnexpectedByte);
                    }
                    msg.token = Some(p);
                    msg.rlen = 0;
                } else if ch == b'-' {
                    state = RunToCrlf;
                } else if is_digit(ch) {
                    msg.rlen = msg.rlen * 10 + (ch - b'0') as u32;
                } else if ch == CR {
                    let token_start = msg.token.unwrap();
                    if p - token_start <= 1 {
                        return fail(msg, state, ParseFailure::EmptyLength);
                    }
                    msg.token = None;
                    state = BulkLf;
                } else {
                    return fail(msg, state, ParseFailure::UnexpectedByte);
                }
            }

            BulkLf => match ch {
                LF => state = BulkArg,
                _ => return fail(msg, state, ParseFailure::MissingCrLf),
            },

            BulkArg => {
                let m = p + msg.rlen as usize;
                if m >= data.len() {
                    msg.rlen -= (data.len() - p) as u32;
                    p = data.len() - 1;
                } else {
                    if data[m] != CR {
                        return fail(msg, state, ParseFailure::MissingCrLf);
                    }
                    p = m;
                    msg.rlen = 0;
                    state = BulkArgLf;
                }
            }

            BulkArgLf => match ch {
                LF => {
                    msg.pos = p + 1;
                    msg.state = MachineState::Response(Start);
                    msg.token = None;
                    let outcome = Outcome::Ok;
                    msg.result = Some(outcome);
                    return outcome;
                }
                _ => return fail(msg, state, ParseFailure::MissingCrLf),
            },

            Multibulk => {
                if msg.token.is_none() {
                    if ch != MULTIBULK_SIGIL {
                        return fail(msg, state, ParseFailure::UnexpectedByte);
                    }
                    msg.token = Some(p);
                    msg.narg_start = Some(p + 1);
                    msg.rnarg = 0;
                } else if is_digit(ch) {
                    msg.rnarg = msg.rnarg * 10 + (ch - b'0') as u32;
                } else if ch == CR {
                    let token_start = msg.token.unwrap();
                    if p - token_start <= 1 {
                        return fail(msg, state, ParseFailure::EmptyLength);
                    }
                    msg.narg = msg.rnarg;
                    msg.narg_end = Some(p);
                    msg.token = None;
                    state = MultibulkNargLf;
                } else {
                    return fail(msg, state, ParseFailure::UnexpectedByte);
                }
            }

            MultibulkNargLf => match ch {
                LF => {
                    if msg.rnarg == 0 {
                        // '*0\r\n' — an empty multibulk reply.
                        msg.pos = p + 1;
                        msg.state = MachineState::Response(Start);
                        msg.token = None;
                        let outcome = Outcome::Ok;
                        msg.result = Some(outcome);
                        return outcome;
                    }
                    state = MultibulkArgNLen;
                }
                _ => return fail(msg, state, ParseFailure::MissingCrLf),
            },

            MultibulkArgNLen => {
                if msg.token.is_none() {
                    if ch != BULK_SIGIL {
                        return fail(msg, state, ParseFailure::UnexpectedByte);
                    }
                    msg.token = Some(p);
                    msg.rlen = 0;
                } else if is_digit(ch) {
                    msg.rlen = msg.rlen * 10 + (ch - b'0') as u32;
                } else if ch == b'-' {
                    // tolerated only as part of the '$-1' nil-element form,
                    // confirmed at CR below.
                } else if ch == CR {
                    let token_start = msg.token.unwrap();
                    if p - token_start <= 1 || msg.rnarg == 0 {
                        return fail(msg, state, ParseFailure::EmptyLength);
                    }
                    if msg.rlen == 1 && p - token_start == 3 {
                        // '$-1' nil element.
                        msg.rlen = 0;
                        state = MultibulkArgNLf;
                    } else {
                        state = MultibulkArgNLenLf;
                    }
                    msg.rnarg -= 1;
                    msg.token = None;
                } else {
                    return fail(msg, state, ParseFailure::UnexpectedByte);
                }
            }

            MultibulkArgNLenLf => match ch {
                LF => state = MultibulkArgN,
                _ => return fail(msg, state, ParseFailure::MissingCrLf),
            },

            MultibulkArgN => {
                let m = p + msg.rlen as usize;
                if m >= data.len() {
                    msg.rlen -= (data.len() - p) as u32;
                    p = data.len() - 1;
                } else {
                    if data[m] != CR {
                        return fail(msg, state, ParseFailure::MissingCrLf);
                    }
                    p += msg.rlen as usize;
                    msg.rlen = 0;
                    state = MultibulkArgNLf;
                }
            }

            MultibulkArgNLf => match ch {
                LF => {
                    if msg.rnarg == 0 {
                        msg.pos = p + 1;
                        msg.state = MachineState::Response(Start);
                        msg.token = None;
                        let outcome = Outcome::Ok;
                        msg.result = Some(outcome);
                        return outcome;
                    }
                    state = MultibulkArgNLen;
                }
                _ => return fail(msg, state, ParseFailure::MissingCrLf),
            },
        }

        p += 1;
    }

    msg.pos = p;
    msg.state = MachineState::Response(state);

    let outcome = if buf.is_full() && msg.token.is_some() {
        let repair_from = msg.token.unwrap();
        msg.pos = repair_from;
        msg.token = None;
        Outcome::Repair
    } else {
        Outcome::Again
    };
    msg.result = Some(outcome);
    outcome
}
