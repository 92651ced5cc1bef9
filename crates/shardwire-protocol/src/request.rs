//! The unified-request state machine.
//!
//! A 1:1 port of `nc_parse.c::parse_request`: same states, same transition
//! guards, same multi-buffer-spanning arithmetic, including the two quirks
//! called out in the design notes (the `LINSERT`/`Arg4` dead end at
//! [`RequestState::KeyLf`], and [`RequestState::ReqType`]/[`RequestState::Key`]
//! not decrementing `rlen` on a partial scan the way
//! [`RequestState::Arg1`]/[`RequestState::Arg2`]/[`RequestState::ArgN`] do).

use shardwire_core::constants::{BULK_SIGIL, CR, LF, MULTIBULK_SIGIL, is_digit};
use shardwire_core::ParseFailure;

use crate::buffer::Buf;
use crate::commands::{Arity, CommandTag};
use crate::message::{Classification, MachineState, Message, Outcome, RequestState};

fn fail(msg: &mut Message, state: RequestState, failure: ParseFailure) -> Outcome {
    msg.state = MachineState::Request(state);
    let outcome = Outcome::Error(failure);
    msg.result = Some(outcome);
    outcome
}

/// Parse as much of a unified request as `buf` currently holds, resuming
/// from `msg.pos`/`msg.state`.
///
/// # Panics
/// Panics if `msg` is mid-parse of a response rather than a request; the
/// caller owns that invariant (see [`MachineState`]).
pub fn parse_request(msg: &mut Message, buf: &Buf) -> Outcome {
    use RequestState::*;

    let mut state = match msg.state {
        MachineState::Request(s) => s,
        MachineState::Response(_) => panic!("parse_request called on a response-mode message"),
    };

    let data = buf.filled();
    let mut p = msg.pos;

    while p < data.len() {
        let ch = data[p];

        match state {
            Start | Narg => {
                if msg.token.is_none() {
                    if ch != MULTIBULK_SIGIL {
                        return fail(msg, state, ParseFailure::UnexpectedByte);
                    }
                    msg.token = Some(p);
                    msg.narg_start = Some(p + 1);
                    msg.rnarg = 0;
                    state = Narg;
                } else if is_digit(ch) {
                    msg.rnarg = msg.rnarg * 10 + (ch - b'0') as u32;
                } else if ch == CR {
                    if msg.rnarg == 0 {
                        return fail(msg, state, ParseFailure::EmptyLength);
                    }
                    msg.narg = msg.rnarg;
                    msg.narg_end = Some(p);
                    msg.token = None;
                    state = NargLf;
                } else {
                    return fail(msg, state, ParseFailure::UnexpectedByte);
                }
            }

            NargLf => match ch {
                LF => state = ReqTypeLen,
                _ => return fail(msg, state, ParseFailure::MissingCrLf),
            },

            ReqTypeLen => {
                if msg.token.is_none() {
                    if ch != BULK_SIGIL {
                        return fail(msg, state, ParseFailure::UnexpectedByte);
                    }
                    msg.token = Some(p);
                    msg.rlen = 0;
                } else if is_digit(ch) {
                    msg.rlen = msg.rlen * 10 + (ch - b'0') as u32;
                } else if ch == CR {
                    if msg.rlen == 0 || msg.rnarg == 0 {
                        return fail(msg, state, ParseFailure::EmptyLength);
                    }
                    msg.rnarg -= 1;
                    msg.token = None;
                    state = ReqTypeLenLf;
                } else {
                    return fail(msg, state, ParseFailure::UnexpectedByte);
                }
            }

            ReqTypeLenLf => match ch {
                LF => state = ReqType,
                _ => return fail(msg, state, ParseFailure::MissingCrLf),
            },

            ReqType => {
                let token_start = *msg.token.get_or_insert(p);
                let m = p + msg.rlen as usize;
                if m >= data.len() {
                    p = data.len() - 1;
                } else {
                    if data[m] != CR {
                        return fail(msg, state, ParseFailure::MissingCrLf);
                    }
                    p = m;
                    msg.rlen = 0;
                    msg.token = None;
                    let name = &data[token_start..p];
                    msg.classification = match CommandTag::classify(name) {
                        Some(tag) => Classification::Request(tag),
                        None => return fail(msg, state, ParseFailure::UnknownCommand),
                    };
                    state = ReqTypeLf;
                }
            }

            ReqTypeLf => match ch {
                LF => state = KeyLen,
                _ => return fail(msg, state, ParseFailure::MissingCrLf),
            },

            KeyLen => {
                if msg.token.is_none() {
                    if ch != BULK_SIGIL {
                        return fail(msg, state, ParseFailure::UnexpectedByte);
                    }
                    msg.token = Some(p);
                    msg.rlen = 0;
                } else if is_digit(ch) {
                    msg.rlen = msg.rlen * 10 + (ch - b'0') as u32;
                } else if ch == CR {
                    if msg.rlen == 0 || msg.rnarg == 0 {
                        return fail(msg, state, ParseFailure::EmptyLength);
                    }
                    msg.rnarg -= 1;
                    msg.token = None;
                    state = KeyLenLf;
                } else {
                    return fail(msg, state, ParseFailure::UnexpectedByte);
                }
            }

            KeyLenLf => match ch {
                LF => state = Key,
                _ => return fail(msg, state, ParseFailure::MissingCrLf),
            },

            Key => {
                let token_start = *msg.token.get_or_insert(p);
                let m = p + msg.rlen as usize;
                if m >= data.len() {
                    p = data.len() - 1;
                } else {
                    if data[m] != CR {
                        return fail(msg, state, ParseFailure::MissingCrLf);
                    }
                    p += msg.rlen as usize;
                    msg.rlen = 0;
                    msg.token = None;
                    msg.key_start = Some(token_start);
                    msg.key_end = Some(p);
                    state = KeyLf;
                }
            }

            KeyLf => match ch {
                LF => {
                    let tag = match msg.classification {
                        Classification::Request(t) => t,
                        _ => unreachable!("ReqType always sets a request classification"),
                    };
                    match tag.arity() {
                        Arity::Arg1 => {
                            if msg.rnarg != 0 {
                                return fail(msg, state, ParseFailure::ArityMismatch);
                            }
                            msg.pos = p + 1;
                            msg.state = MachineState::Request(Start);
                            msg.token = None;
                            let outcome = Outcome::Ok;
                            msg.result = Some(outcome);
                            return outcome;
                        }
                        Arity::Arg2 => {
                            if msg.rnarg != 1 {
                                return fail(msg, state, ParseFailure::ArityMismatch);
                            }
                            state = Arg1Len;
                        }
                        Arity::Arg3 => {
                            if msg.rnarg != 2 {
                                return fail(msg, state, ParseFailure::ArityMismatch);
                            }
                            state = Arg1Len;
                        }
                        Arity::ArgN => {
                            if msg.rnarg < 1 {
                                return fail(msg, state, ParseFailure::ArityMismatch);
                            }
                            state = Arg1Len;
                        }
                        Arity::ArgX => {
                            if msg.rnarg == 0 {
                                msg.pos = p + 1;
                                msg.state = MachineState::Request(Start);
                                msg.token = None;
                                let outcome = Outcome::Ok;
                                msg.result = Some(outcome);
                                return outcome;
                            }
                            state = Fragment;
                        }
                        // LINSERT classifies but has no key-consumed handler,
                        // same as upstream's unconsulted parse_arg4.
                        Arity::Arg4 => return fail(msg, state, ParseFailure::ArityMismatch),
                    }
                }
                _ => return fail(msg, state, ParseFailure::MissingCrLf),
            },

            Fragment => {
                msg.pos = p;
                msg.token = None;
                msg.state = MachineState::Request(Fragment);
                let outcome = Outcome::Fragment;
                msg.result = Some(outcome);
                return outcome;
            }

            Arg1Len => {
                if msg.token.is_none() {
                    if ch != BULK_SIGIL {
                        return fail(msg, state, ParseFailure::UnexpectedByte);
                    }
                    msg.rlen = 0;
                    msg.token = Some(p);
                } else if is_digit(ch) {
                    msg.rlen = msg.rlen * 10 + (ch - b'0') as u32;
                } else if ch == CR {
                    let token_start = msg.token.unwrap();
                    if p - token_start <= 1 || msg.rnarg == 0 {
                        return fail(msg, state, ParseFailure::EmptyLength);
                    }
                    msg.rnarg -= 1;
                    msg.token = None;
                    state = Arg1LenLf;
                } else {
                    return fail(msg, state, ParseFailure::UnexpectedByte);
                }
            }

            Arg1LenLf => match ch {
                LF => state = Arg1,
                _ => return fail(msg, state, ParseFailure::MissingCrLf),
            },

            Arg1 => {
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
                    state = Arg1Lf;
                }
            }

            Arg1Lf => match ch {
                LF => {
                    let tag = match msg.classification {
                        Classification::Request(t) => t,
                        _ => unreachable!(),
                    };
                    match tag.arity() {
                        Arity::Arg2 => {
                            if msg.rnarg != 0 {
                                return fail(msg, state, ParseFailure::ArityMismatch);
                            }
                            msg.pos = p + 1;
                            msg.state = MachineState::Request(Start);
                            msg.token = None;
                            let outcome = Outcome::Ok;
                            msg.result = Some(outcome);
                            return outcome;
                        }
                        Arity::Arg3 => {
                            if msg.rnarg != 1 {
                                return fail(msg, state, ParseFailure::ArityMismatch);
                            }
                            state = Arg2Len;
                        }
                        Arity::ArgN => {
                            if msg.rnarg == 0 {
                                msg.pos = p + 1;
                                msg.state = MachineState::Request(Start);
                                msg.token = None;
                                let outcome = Outcome::Ok;
                                msg.result = Some(outcome);
                                return outcome;
                            }
                            state = ArgNLen;
                        }
                        _ => return fail(msg, state, ParseFailure::ArityMismatch),
                    }
                }
                _ => return fail(msg, state, ParseFailure::MissingCrLf),
            },

            Arg2Len => {
                if msg.token.is_none() {
                    if ch != BULK_SIGIL {
                        return fail(msg, state, ParseFailure::UnexpectedByte);
                    }
                    msg.rlen = 0;
                    msg.token = Some(p);
                } else if is_digit(ch) {
                    msg.rlen = msg.rlen * 10 + (ch - b'0') as u32;
                } else if ch == CR {
                    let token_start = msg.token.unwrap();
                    if p - token_start <= 1 || msg.rnarg == 0 {
                        return fail(msg, state, ParseFailure::EmptyLength);
                    }
                    msg.rnarg -= 1;
                    msg.token = None;
                    state = Arg2LenLf;
                } else {
                    return fail(msg, state, ParseFailure::UnexpectedByte);
                }
            }

            Arg2LenLf => match ch {
                LF => state = Arg2,
                _ => return fail(msg, state, ParseFailure::MissingCrLf),
            },

            Arg2 => {
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
                    state = Arg2Lf;
                }
            }

            Arg2Lf => match ch {
                LF => {
                    let tag = match msg.classification {
                        Classification::Request(t) => t,
                        _ => unreachable!(),
                    };
                    match tag.arity() {
                        Arity::Arg3 => {
                            if msg.rnarg != 0 {
                                return fail(msg, state, ParseFailure::ArityMismatch);
                            }
                            msg.pos = p + 1;
                            msg.state = MachineState::Request(Start);
                            msg.token = None;
                            let outcome = Outcome::Ok;
                            msg.result = Some(outcome);
                            return outcome;
                        }
                        Arity::ArgN => {
                            if msg.rnarg == 0 {
                                msg.pos = p + 1;
                                msg.state = MachineState::Request(Start);
                                msg.token = None;
                                let outcome = Outcome::Ok;
                                msg.result = Some(outcome);
                                return outcome;
                            }
                            state = ArgNLen;
                        }
                        _ => return fail(msg, state, ParseFailure::ArityMismatch),
                    }
                }
                _ => return fail(msg, state, ParseFailure::MissingCrLf),
            },

            ArgNLen => {
                if msg.token.is_none() {
                    if ch != BULK_SIGIL {
                        return fail(msg, state, ParseFailure::UnexpectedByte);
                    }
                    msg.rlen = 0;
                    msg.token = Some(p);
                } else if is_digit(ch) {
                    msg.rlen = msg.rlen * 10 + (ch - b'0') as u32;
                } else if ch == CR {
                    let token_start = msg.token.unwrap();
                    if p - token_start <= 1 || msg.rnarg == 0 {
                        return fail(msg, state, ParseFailure::EmptyLength);
                    }
                    msg.rnarg -= 1;
                    msg.token = None;
                    state = ArgNLenLf;
                } else {
                    return fail(msg, state, ParseFailure::UnexpectedByte);
                }
            }

            ArgNLenLf => match ch {
                LF => state = ArgN,
                _ => return fail(msg, state, ParseFailure::MissingCrLf),
            },

            ArgN => {
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
                    state = ArgNLf;
                }
            }

            ArgNLf => match ch {
                LF => {
                    let tag = match msg.classification {
                        Classification::Request(t) => t,
                        _ => unreachable!(),
                    };
                    if tag.arity() != Arity::ArgN {
                        return fail(msg, state, ParseFailure::ArityMismatch);
                    }
                    if msg.rnarg == 0 {
                        msg.pos = p + 1;
                        msg.state = MachineState::Request(Start);
                        msg.token = None;
                        let outcome = Outcome::Ok;
                        msg.result = Some(outcome);
                        return outcome;
                    }
                    state = ArgNLen;
                }
                _ => return fail(msg, state, ParseFailure::MissingCrLf),
            },
        }

        p += 1;
    }

    msg.pos = p;
    msg.state = MachineState::Request(state);

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
