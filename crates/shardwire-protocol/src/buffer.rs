//! Fixed-capacity buffers and the chain the I/O layer appends them to.
//!
//! The parser never owns the socket or the buffer pool; it is handed a
//! [`Buf`] to read from and told where it left off. [`BufferChain`] is a
//! minimal, swappable realization of that contract good enough to drive the
//! parser end to end in this crate's tests and in [`crate::stream`].

use std::collections::VecDeque;

/// A single fixed-capacity, append-only byte buffer.
///
/// Bytes are only ever appended at `last`; nothing already written is
/// mutated. `capacity` is the physical ceiling — once `last == capacity`
/// the buffer is full and can take no more bytes until the straddling
/// token, if any, has been copied out via [`BufferChain::repair_tail`].
#[derive(Debug, Clone)]
pub struct Buf {
    data: Vec<u8>,
    last: usize,
    capacity: usize,
}

impl Buf {
    pub fn with_capacity(capacity: usize) -> Self {
        Buf {
            data: vec![0u8; capacity],
            last: 0,
            capacity,
        }
    }

    /// Append as much of `bytes` as fits; returns the number of bytes
    /// actually written.
    pub fn append(&mut self, bytes: &[u8]) -> usize {
        let room = self.capacity - self.last;
        let n = room.min(bytes.len());
        self.data[self.last..self.last + n].copy_from_slice(&bytes[..n]);
        self.last += n;
        n
    }

    /// The bytes written so far, i.e. `data[0..last]`.
    #[inline]
    pub fn filled(&self) -> &[u8] {
        &self.data[..self.last]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.last
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.last == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// `true` once every byte of capacity has been written.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.last == self.capacity
    }

    /// Bytes of spare capacity left to append into.
    #[inline]
    pub fn room(&self) -> usize {
        self.capacity - self.last
    }
}

/// An ordered sequence of buffers; the parser always reads from the tail.
///
/// Earlier buffers are retained only long enough for whatever already
/// framed them to be handed off; this crate's [`crate::stream`] wrappers
/// drop a buffer as soon as it stops being the tail.
#[derive(Debug)]
pub struct BufferChain {
    bufs: VecDeque<Buf>,
    capacity: usize,
}

impl BufferChain {
    pub fn new(capacity: usize) -> Self {
        let mut bufs = VecDeque::with_capacity(1);
        bufs.push_back(Buf::with_capacity(capacity));
        BufferChain { bufs, capacity }
    }

    pub fn tail(&self) -> &Buf {
        self.bufs.back().expect("chain always has a tail buffer")
    }

    pub fn tail_mut(&mut self) -> &mut Buf {
        self.bufs.back_mut().expect("chain always has a tail buffer")
    }

    /// Append as much of `bytes` as fits into the current tail; returns the
    /// number of bytes actually written. Unlike [`Self::grow`], this never
    /// allocates — the caller decides when a full tail warrants a fresh
    /// buffer (via [`Self::grow`] at a clean boundary, or
    /// [`Self::repair_tail`] mid-token).
    pub fn feed(&mut self, bytes: &[u8]) -> usize {
        self.tail_mut().append(bytes)
    }

    /// Start a fresh, empty tail buffer. Mirrors the I/O layer allocating a
    /// new `mbuf` once the active one is full and no token is straddling it.
    pub fn grow(&mut self) {
        self.bufs.push_back(Buf::with_capacity(self.capacity));
    }

    /// Implements the resume/repair rule: copy `[from, tail.len())` of the
    /// current tail into a fresh buffer, discard the old tail, and return
    /// the length of that copy — the offset at which the caller should
    /// resume scanning, since that's the first byte not yet seen. The token
    /// itself always re-anchors to `0`, since the copy starts there.
    pub fn repair_tail(&mut self, from: usize) -> usize {
        let mut fresh = Buf::with_capacity(self.capacity);
        let straddling = &self.tail().filled()[from..];
        let n = fresh.append(straddling);
        debug_assert_eq!(n, straddling.len(), "fresh buffer must fit the straddling token");
        self.bufs.pop_back();
        self.bufs.push_back(fresh);
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_fills_then_refuses() {
        let mut buf = Buf::with_capacity(4);
        assert_eq!(buf.append(b"ab"), 2);
        assert_eq!(buf.append(b"cdef"), 2);
        assert!(buf.is_full());
        assert_eq!(buf.filled(), b"abcd");
    }

    #[test]
    fn chain_grows_across_buffers_when_told_to() {
        let mut chain = BufferChain::new(4);
        let n = chain.feed(b"abcdefgh");
        assert_eq!(n, 4);
        assert!(chain.tail().is_full());
        chain.grow();
        let n = chain.feed(&b"abcdefgh"[n..]);
        assert_eq!(n, 4);
        assert_eq!(chain.tail().filled(), b"efgh");
    }

    #[test]
    fn repair_copies_straddling_suffix_to_fresh_buffer() {
        let mut chain = BufferChain::new(8);
        chain.feed(b"*1\r\n$3\r\n");
        let new_pos = chain.repair_tail(4);
        assert_eq!(new_pos, 4);
        assert_eq!(chain.tail().filled(), b"$3\r\n");
        assert!(!chain.tail().is_full());
    }
}
