//! The fragment cue contract.
//!
//! When [`crate::request::parse_request`] returns
//! [`crate::message::Outcome::Fragment`] for an `ArgX` command (`MGET`,
//! `DEL`) with more than one key, the first key has already been framed at
//! `msg.key_start`/`msg.key_end`; the remaining `msg.rnarg` keys are still
//! raw, unparsed bytes in the buffer starting at `msg.pos`. This module
//! names what the proxy's (out-of-scope) fan-out layer does with that cue,
//! and provides a reference implementation the cue can be tested against.

use std::ops::Range;

use crate::buffer::Buf;
use crate::commands::CommandTag;
use crate::message::{Classification, Message};

/// What the proxy's fan-out layer does with a multi-key request once the
/// parser has cued a [`crate::message::Outcome::Fragment`].
///
/// Consistent-hash routing and backend selection are out of scope here;
/// this trait only names the contract so the cue is testable in isolation.
pub trait Fragmenter {
    /// Called once per key in a fragmented request, including the one
    /// already framed before the cue fired.
    fn route_key(&mut self, command: CommandTag, key: &[u8]);
}

/// Split the remaining raw argument bytes of a fragmented request into
/// per-key byte ranges.
///
/// `msg` must be in the state left by a just-returned
/// [`crate::message::Outcome::Fragment`]: `msg.pos` points at the `$` of the
/// next key's length token, and `msg.rnarg` counts how many keys follow.
/// Returns one range per remaining key, in wire order; the already-framed
/// first key (`msg.key_range()`) is not included.
///
/// # Panics
/// Panics if `msg` is not mid-parse of a request, or if the bytes at `msg.pos`
/// don't form the `rnarg` bulk tokens the cue promises are there.
pub fn split_request(msg: &Message, buf: &Buf) -> Vec<Range<usize>> {
    assert!(msg.is_request(), "split_request only applies to requests");

    let data = buf.filled();
    let mut p = msg.pos;
    let mut ranges = Vec::with_capacity(msg.rnarg as usize);

    for _ in 0..msg.rnarg {
        assert_eq!(data[p], b'$', "expected a bulk length token");
        p += 1;
        let mut len = 0usize;
        while data[p] != b'\r' {
            len = len * 10 + (data[p] - b'0') as usize;
            p += 1;
        }
        p += 2; // CR LF
        let key_start = p;
        let key_end = p + len;
        ranges.push(key_start..key_end);
        p = key_end + 2; // past the key's own CR LF
    }

    ranges
}

/// Drive a [`Fragmenter`] over every key in a fragmented request: the one
/// already framed at `msg.key_range()`, then each of [`split_request`]'s
/// remaining ranges.
///
/// # Panics
/// Panics if `msg` isn't a classified request.
pub fn dispatch_fragments(msg: &Message, buf: &Buf, fragmenter: &mut impl Fragmenter) {
    let command = match msg.classification {
        Classification::Request(tag) => tag,
        _ => panic!("dispatch_fragments requires a classified request"),
    };
    let data = buf.filled();

    if let Some(first) = msg.key_range() {
        fragmenter.route_key(command, &data[first]);
    }
    for range in split_request(msg, buf) {
        fragmenter.route_key(command, &data[range]);
    }
}
