//! Property-based tests for the RESP parser's chunking equivalence.
//!
//! These generate a known-good request or reply and drive it through a
//! buffer whose capacity is derived from a random fraction of the wire's
//! length, rather than feeding it whole. A buffer that small forces the
//! resume/repair protocol to kick in wherever the random capacity happens
//! to land — mid-token straddles go through `Repair` (the only path that
//! can resume a command-name or key scan), clean boundaries through a
//! plain grow. Either way the result must match the one-shot framing: the
//! same command/reply kind and argument count.

use proptest::prelude::*;

use shardwire_protocol::message::{Classification, Outcome, ReplyKind};
use shardwire_protocol::{CommandTag, RequestStream, ResponseStream};

fn valid_request_wire() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        Just(b"*2\r\n$3\r\nGET\r\n$3\r\nfoo\r\n".to_vec()),
        Just(b"*3\r\n$3\r\nSET\r\n$3\r\nfoo\r\n$3\r\nbar\r\n".to_vec()),
        Just(b"*2\r\n$4\r\nMGET\r\n$1\r\na\r\n".to_vec()),
        Just(b"*3\r\n$4\r\nSADD\r\n$3\r\nkey\r\n$1\r\nx\r\n".to_vec()),
        Just(b"*2\r\n$3\r\nTTL\r\n$3\r\nfoo\r\n".to_vec()),
    ]
}

fn valid_response_wire() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        Just(b"+OK\r\n".to_vec()),
        Just(b"-ERR no such key\r\n".to_vec()),
        Just(b":1000\r\n".to_vec()),
        Just(b"$3\r\nfoo\r\n".to_vec()),
        Just(b"$-1\r\n".to_vec()),
        Just(b"*2\r\n$3\r\nfoo\r\n$3\r\nbar\r\n".to_vec()),
        Just(b"*0\r\n".to_vec()),
    ]
}

/// Feed `bytes` in full, polling in between whenever a single `feed()`
/// can't take it all so a full tail gets to grow or repair before the
/// next write is attempted.
fn feed_all_requests(stream: &mut RequestStream, mut bytes: &[u8]) {
    while !bytes.is_empty() {
        let n = stream.feed(bytes);
        bytes = &bytes[n..];
        if !bytes.is_empty() {
            stream.poll();
        }
    }
}

fn feed_all_responses(stream: &mut ResponseStream, mut bytes: &[u8]) {
    while !bytes.is_empty() {
        let n = stream.feed(bytes);
        bytes = &bytes[n..];
        if !bytes.is_empty() {
            stream.poll();
        }
    }
}

fn drive_request(wire: &[u8], buffer_capacity: usize) -> (Classification, u32) {
    let mut stream = RequestStream::new(buffer_capacity);
    feed_all_requests(&mut stream, wire);
    assert_eq!(stream.poll(), Outcome::Ok);
    (stream.message().classification, stream.message().narg)
}

fn drive_response(wire: &[u8], buffer_capacity: usize) -> ReplyKind {
    let mut stream = ResponseStream::new(buffer_capacity);
    feed_all_responses(&mut stream, wire);
    assert_eq!(stream.poll(), Outcome::Ok);
    match stream.message().classification {
        Classification::Response(kind) => kind,
        other => panic!("expected a response classification, got {other:?}"),
    }
}

/// Map a `0.0..1.0` fraction to a buffer capacity somewhere inside `len`,
/// never zero (a zero-capacity buffer never accepts a byte, so nothing
/// could ever grow past it).
fn fraction_to_capacity(len: usize, fraction: f64) -> usize {
    (((len as f64) * fraction) as usize).clamp(1, len)
}

proptest! {
    /// Driving a valid request through a buffer sized anywhere inside the
    /// wire's length must frame the same command and argument count as
    /// feeding it through a buffer that never fills.
    #[test]
    fn prop_request_chunking_equivalence(wire in valid_request_wire(), split_fraction in 0.0f64..1.0f64) {
        let whole = drive_request(&wire, wire.len().max(1));
        let capacity = fraction_to_capacity(wire.len(), split_fraction);
        let chunked = drive_request(&wire, capacity);
        prop_assert_eq!(whole, chunked);
    }

    /// Same property for replies across all five RESP reply forms.
    #[test]
    fn prop_response_chunking_equivalence(wire in valid_response_wire(), split_fraction in 0.0f64..1.0f64) {
        let whole = drive_response(&wire, wire.len().max(1));
        let capacity = fraction_to_capacity(wire.len(), split_fraction);
        let chunked = drive_response(&wire, capacity);
        prop_assert_eq!(whole, chunked);
    }
}

#[test]
fn sanity_get_classifies_as_get() {
    let (classification, narg) = drive_request(b"*2\r\n$3\r\nGET\r\n$3\r\nfoo\r\n", 64);
    assert_eq!(classification, Classification::Request(CommandTag::Get));
    assert_eq!(narg, 2);
}
