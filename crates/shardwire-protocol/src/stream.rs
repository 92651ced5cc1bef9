//! Stateful wrappers pairing a [`BufferChain`] with a [`Message`], driving
//! the resume/repair protocol automatically.
//!
//! Callers `feed()` bytes as they arrive off the wire and `poll()` for the
//! next verdict, without hand-rolling the `Again`/`Repair` resume loop
//! themselves. `poll()` surfaces one verdict per call — the caller decides
//! whether and how to read the just-framed message (via
//! [`RequestStream::message`]/[`RequestStream::buffer`]) before asking for
//! the next one.

use tracing::{debug, trace, warn};

use crate::buffer::{Buf, BufferChain};
use crate::message::{Message, Outcome};
use crate::request::parse_request;
use crate::response::parse_response;

/// Drives [`parse_request`] over a growing, self-repairing buffer chain.
#[derive(Debug)]
pub struct RequestStream {
    chain: BufferChain,
    msg: Message,
}

impl RequestStream {
    pub fn new(buffer_capacity: usize) -> Self {
        RequestStream {
            chain: BufferChain::new(buffer_capacity),
            msg: Message::new_request(0),
        }
    }

    /// Append bytes into the current tail buffer; returns how many were
    /// actually written (fewer than `bytes.len()` if the tail filled up —
    /// call [`Self::poll`] to drain it before feeding the rest).
    pub fn feed(&mut self, bytes: &[u8]) -> usize {
        self.chain.feed(bytes)
    }

    /// The buffer the most recent [`Self::poll`] call parsed against —
    /// byte ranges on [`Self::message`] are only meaningful against this.
    pub fn buffer(&self) -> &Buf {
        self.chain.tail()
    }

    pub fn message(&self) -> &Message {
        &self.msg
    }

    /// Abandon whatever is left of the current message and start a fresh
    /// one at `pos` of the current tail buffer.
    ///
    /// Used by [`crate::codec`] after consuming a [`Outcome::Fragment`] cue:
    /// the terminal `Fragment` state can't be resumed by
    /// [`crate::request::parse_request`] itself (see its `Fragment` arm), so
    /// once the fan-out layer has read the remaining raw key bytes via
    /// [`crate::fragment::split_request`], this is how parsing picks back up
    /// right after them.
    pub fn reset_at(&mut self, pos: usize) {
        self.msg = Message::new_request(pos);
    }

    /// Parse as much of the current buffer as possible, transparently
    /// handling `Repair` (copy the straddling token into a fresh buffer,
    /// retry) and the full-buffer-at-a-clean-boundary case (grow a fresh
    /// buffer) so callers only ever see `Ok`, `Again`, `Fragment`, or
    /// `Error`.
    pub fn poll(&mut self) -> Outcome {
        loop {
            let outcome = parse_request(&mut self.msg, self.chain.tail());
            match outcome {
                Outcome::Repair => {
                    // The copy starts exactly at the old token position, so
                    // the token re-anchors to offset 0 of the fresh buffer —
                    // but scanning must resume past the bytes already
                    // copied, not from the token's start again.
                    let copied = self.chain.repair_tail(self.msg.pos);
                    trace!(copied, "repaired a straddling request token");
                    self.msg.token = Some(0);
                    self.msg.pos = copied;
                    continue;
                }
                Outcome::Again if self.chain.tail().is_full() => {
                    self.chain.grow();
                    self.msg.pos = 0;
                    return Outcome::Again;
                }
                Outcome::Ok => {
                    debug!(classification = ?self.msg.classification, "framed a request");
                    return outcome;
                }
                Outcome::Fragment => {
                    debug!(rnarg = self.msg.rnarg, "framed the first key of a fragmented request");
                    return outcome;
                }
                Outcome::Error(failure) => {
                    warn!(?failure, "request parse failed");
                    return outcome;
                }
                other => return other,
            }
        }
    }
}

/// Drives [`parse_response`] the same way [`RequestStream`] drives
/// [`parse_request`].
#[derive(Debug)]
pub struct ResponseStream {
    chain: BufferChain,
    msg: Message,
}

impl ResponseStream {
    pub fn new(buffer_capacity: usize) -> Self {
        ResponseStream {
            chain: BufferChain::new(buffer_capacity),
            msg: Message::new_response(0),
        }
    }

    pub fn feed(&mut self, bytes: &[u8]) -> usize {
        self.chain.feed(bytes)
    }

    pub fn buffer(&self) -> &Buf {
        self.chain.tail()
    }

    pub fn message(&self) -> &Message {
        &self.msg
    }

    pub fn poll(&mut self) -> Outcome {
        loop {
            let outcome = parse_response(&mut self.msg, self.chain.tail());
            match outcome {
                Outcome::Repair => {
                    let copied = self.chain.repair_tail(self.msg.pos);
                    trace!(copied, "repaired a straddling response token");
                    self.msg.token = Some(0);
                    self.msg.pos = copied;
                    continue;
                }
                Outcome::Again if self.chain.tail().is_full() => {
                    self.chain.grow();
                    self.msg.pos = 0;
                    return Outcome::Again;
                }
                Outcome::Ok => {
                    debug!(classification = ?self.msg.classification, "framed a reply");
                    return outcome;
                }
                Outcome::Error(failure) => {
                    warn!(?failure, "response parse failed");
                    return outcome;
                }
                other => return other,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::CommandTag;
    use crate::message::Classification;

    #[test]
    fn frames_one_request_fed_whole() {
        let mut stream = RequestStream::new(64);
        stream.feed(b"*2\r\n$3\r\nGET\r\n$3\r\nfoo\r\n");
        assert_eq!(stream.poll(), Outcome::Ok);
        assert_eq!(
            stream.message().classification,
            Classification::Request(CommandTag::Get)
        );
    }

    #[test]
    fn frames_two_requests_back_to_back() {
        let mut stream = RequestStream::new(64);
        stream.feed(b"*2\r\n$3\r\nGET\r\n$3\r\nfoo\r\n*2\r\n$3\r\nGET\r\n$3\r\nbar\r\n");
        assert_eq!(stream.poll(), Outcome::Ok);
        let first_key = stream.message().key_range().unwrap();
        assert_eq!(&stream.buffer().filled()[first_key], b"foo");

        assert_eq!(stream.poll(), Outcome::Ok);
        let second_key = stream.message().key_range().unwrap();
        assert_eq!(&stream.buffer().filled()[second_key], b"bar");
    }

    #[test]
    fn waits_for_more_bytes_on_a_partial_request() {
        // Split cleanly between tokens (after the key's length line) rather
        // than mid-key: resuming a key/command-name scan that has already
        // started once is a known twemproxy parser limitation (`rlen` is
        // never decremented on suspend for these two tokens, unlike the
        // argument-body states), so it's not something callers can rely on.
        let mut stream = RequestStream::new(64);
        stream.feed(b"*2\r\n$3\r\nGET\r\n$3\r\n");
        assert_eq!(stream.poll(), Outcome::Again);

        stream.feed(b"foo\r\n");
        assert_eq!(stream.poll(), Outcome::Ok);
    }

    #[test]
    fn grows_a_fresh_buffer_once_the_tail_is_full_and_clean() {
        // Capacity exactly matches one full request; the second request
        // only arrives once the tail is already at capacity.
        let mut stream = RequestStream::new(22);
        stream.feed(b"*2\r\n$3\r\nGET\r\n$3\r\nfoo\r\n");
        assert_eq!(stream.poll(), Outcome::Ok);

        // The tail is full but parsing is at a clean boundary (no open
        // token): poll() must grow before it can accept more.
        assert_eq!(stream.poll(), Outcome::Again);

        stream.feed(b"*2\r\n$3\r\nGET\r\n$3\r\nbar\r\n");
        assert_eq!(stream.poll(), Outcome::Ok);
        let key = stream.message().key_range().unwrap();
        assert_eq!(&stream.buffer().filled()[key], b"bar");
    }

    /// Feed `bytes` in full, polling to let a full-but-clean tail grow or a
    /// straddling token repair whenever a single `feed()` can't take it all.
    fn feed_all(stream: &mut RequestStream, mut bytes: &[u8]) {
        while !bytes.is_empty() {
            let n = stream.feed(bytes);
            bytes = &bytes[n..];
            if !bytes.is_empty() {
                stream.poll();
            }
        }
    }

    #[test]
    fn repairs_a_token_straddling_a_full_buffer() {
        // A tiny buffer forces the key's length token ("$3") to straddle
        // the boundary, right after the sigil. Digit-scanning states don't
        // do the jump-ahead arithmetic the command-name/key body states do,
        // so they repair and resume cleanly no matter how many times the
        // buffer fills up.
        let mut stream = RequestStream::new(14);
        feed_all(&mut stream, b"*2\r\n$3\r\nGET\r\n$3\r\nfoo\r\n");
        assert_eq!(stream.poll(), Outcome::Ok);
        assert_eq!(
            stream.message().classification,
            Classification::Request(CommandTag::Get)
        );
    }

    #[test]
    fn byte_by_byte_feeding_still_frames_correctly() {
        // Exercised on the response side: a status line has no body-scan
        // token at all, just a CR/LF walk, so it tolerates arbitrarily fine
        // chunking. The request side's command-name and key tokens can't be
        // resumed more than once (see `waits_for_more_bytes_on_a_partial_request`),
        // so single-byte delivery isn't a scenario they can be driven through.
        let mut stream = ResponseStream::new(64);
        let wire: &[u8] = b"+OK\r\n";
        for &byte in wire {
            stream.feed(&[byte]);
            if let Outcome::Ok = stream.poll() {
                break;
            }
        }
        assert_eq!(
            stream.message().classification,
            Classification::Response(crate::message::ReplyKind::Status)
        );
    }

    #[test]
    fn response_stream_frames_a_bulk_reply() {
        let mut stream = ResponseStream::new(64);
        stream.feed(b"$3\r\nfoo\r\n");
        assert_eq!(stream.poll(), Outcome::Ok);
    }
}
