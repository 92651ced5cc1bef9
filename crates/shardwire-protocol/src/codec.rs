//! Tokio codec for RESP message framing.
//!
//! `RespRequestCodec`/`RespResponseCodec` wrap the [`crate::stream`]
//! wrappers to provide a `Decoder` integration for callers that want a
//! `Framed<TcpStream, _>`.
//!
//! Neither codec implements `Encoder`: the proxy forwards wire bytes
//! verbatim (it routes, it doesn't reconstruct replies), so there is
//! nothing to serialize back out here.

use bytes::{Buf as _, BytesMut};
use tokio_util::codec::Decoder;

use shardwire_core::constants::{DEFAULT_BUFFER_SIZE, DEFAULT_MAX_FRAME_SIZE};
use shardwire_core::{Error, Result};

use crate::commands::CommandTag;
use crate::fragment::split_request;
use crate::message::{Classification, Outcome, ReplyKind};
use crate::stream::{RequestStream, ResponseStream};

/// A framed request, reduced to what a fan-out layer needs to route it.
///
/// [`crate::message::Message`]'s own byte ranges are only valid against the
/// buffer active at the moment they were framed, which a stream that has
/// since repaired or grown won't keep around — so the codec copies each key
/// out once, here, rather than handing back a borrow tied to internal
/// buffer lifetimes. `keys` holds one entry for a single-key command, and
/// every key (the first already-framed one plus the rest split out of the
/// raw argument bytes) for a multi-key `ArgX` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRequest {
    pub command: CommandTag,
    pub keys: Vec<Vec<u8>>,
}

/// A framed reply, reduced to its kind — callers that need the payload read
/// it from the wire bytes themselves; the codec only exists to tell them
/// when a complete reply has arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedResponse {
    pub kind: ReplyKind,
}

/// Decodes a byte stream into framed [`DecodedRequest`]s.
#[derive(Debug)]
pub struct RespRequestCodec {
    stream: RequestStream,
    max_frame_size: usize,
    fed_since_last_frame: usize,
}

impl RespRequestCodec {
    pub fn new() -> Self {
        Self::with_max_frame_size(DEFAULT_MAX_FRAME_SIZE)
    }

    pub fn with_max_frame_size(max_frame_size: usize) -> Self {
        RespRequestCodec {
            stream: RequestStream::new(DEFAULT_BUFFER_SIZE),
            max_frame_size,
            fed_since_last_frame: 0,
        }
    }

    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }
}

impl Default for RespRequestCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for RespRequestCodec {
    type Item = DecodedRequest;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<DecodedRequest>> {
        loop {
            let n = self.stream.feed(src);
            src.advance(n);
            self.fed_since_last_frame += n;
            if self.fed_since_last_frame > self.max_frame_size {
                return Err(Error::FrameTooLarge {
                    size: self.fed_since_last_frame,
                    max_size: self.max_frame_size,
                });
            }

            match self.stream.poll() {
                Outcome::Ok => {
                    self.fed_since_last_frame = 0;
                    let msg = self.stream.message();
                    let command = match msg.classification {
                        Classification::Request(tag) => tag,
                        _ => unreachable!("a request stream only ever frames requests"),
                    };
                    let keys = msg
                        .key_range()
                        .map(|r| vec![self.stream.buffer().filled()[r].to_vec()])
                        .unwrap_or_default();
                    return Ok(Some(DecodedRequest { command, keys }));
                }
                Outcome::Fragment => {
                    self.fed_since_last_frame = 0;
                    let msg = self.stream.message();
                    let command = match msg.classification {
                        Classification::Request(tag) => tag,
                        _ => unreachable!("a request stream only ever frames requests"),
                    };
                    let mut keys = Vec::with_capacity(msg.rnarg as usize + 1);
                    if let Some(first) = msg.key_range() {
                        keys.push(self.stream.buffer().filled()[first].to_vec());
                    }
                    let ranges = split_request(msg, self.stream.buffer());
                    let resume_at = ranges.last().map_or(msg.pos, |r| r.end + 2);
                    for range in ranges {
                        keys.push(self.stream.buffer().filled()[range].to_vec());
                    }
                    self.stream.reset_at(resume_at);
                    return Ok(Some(DecodedRequest { command, keys }));
                }
                Outcome::Again => {
                    if src.is_empty() {
                        return Ok(None);
                    }
                    // The tail was full; poll() already grew or repaired it,
                    // so loop around and feed what's left of `src`.
                }
                Outcome::Error(failure) => return Err(Error::Parse(failure)),
                Outcome::Repair => {
                    unreachable!("RequestStream::poll resolves Repair internally")
                }
            }
        }
    }
}

/// Decodes a byte stream into framed [`DecodedResponse`]s.
#[derive(Debug)]
pub struct RespResponseCodec {
    stream: ResponseStream,
    max_frame_size: usize,
    fed_since_last_frame: usize,
}

impl RespResponseCodec {
    pub fn new() -> Self {
        Self::with_max_frame_size(DEFAULT_MAX_FRAME_SIZE)
    }

    pub fn with_max_frame_size(max_frame_size: usize) -> Self {
        RespResponseCodec {
            stream: ResponseStream::new(DEFAULT_BUFFER_SIZE),
            max_frame_size,
            fed_since_last_frame: 0,
        }
    }

    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }
}

impl Default for RespResponseCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for RespResponseCodec {
    type Item = DecodedResponse;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<DecodedResponse>> {
        loop {
            let n = self.stream.feed(src);
            src.advance(n);
            self.fed_since_last_frame += n;
            if self.fed_since_last_frame > self.max_frame_size {
                return Err(Error::FrameTooLarge {
                    size: self.fed_since_last_frame,
                    max_size: self.max_frame_size,
                });
            }

            match self.stream.poll() {
                Outcome::Ok => {
                    self.fed_since_last_frame = 0;
                    let kind = match self.stream.message().classification {
                        Classification::Response(kind) => kind,
                        _ => unreachable!("a response stream only ever frames replies"),
                    };
                    return Ok(Some(DecodedResponse { kind }));
                }
                Outcome::Again => {
                    if src.is_empty() {
                        return Ok(None);
                    }
                }
                Outcome::Error(failure) => return Err(Error::Parse(failure)),
                Outcome::Fragment => unreachable!("replies never fragment"),
                Outcome::Repair => {
                    unreachable!("ResponseStream::poll resolves Repair internally")
                }
            }
        }
    }
}
