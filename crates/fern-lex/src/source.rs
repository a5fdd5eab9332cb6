//! Double-buffered input source for the tokenizer.
//!
//! The source runs in one of two modes:
//!
//! - **Text**: the whole program is borrowed in memory as a single
//!   buffer that is never refilled.
//! - **Stream**: input arrives through a reader into two equally sized
//!   buffers. Each buffer carries a generation counter; when the scan
//!   cursor walks off the end of a buffer, the other buffer is refilled
//!   only if its generation is older than the current one, so a
//!   speculative re-scan that walks forward again does not clobber data
//!   it still needs.
//!
//! Two cursors are tracked: the token-start cursor and the scan cursor.
//! A token may span at most two buffers; flipping into the buffer that
//! still holds the token start reports [`LexError::TokenTooLong`].

use std::io::Read;

use crate::error::{LexError, Result};

/// Default size of each streaming input buffer in bytes.
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// A position within the buffered input.
#[derive(Debug, Clone, Copy)]
struct Cursor {
    /// Index of the buffer the cursor rests in (always 0 in text mode).
    buffer: usize,
    /// Byte offset within that buffer.
    offset: usize,
}

/// Buffered input with a token-start cursor and a scan cursor.
pub(crate) struct Source<'a> {
    input: Input<'a>,
    /// Start of the current token.
    start: Cursor,
    /// Scan position; at or ahead of `start`.
    scan: Cursor,
    /// Bytes consumed since the last start/scan reset.
    scan_len: usize,
}

enum Input<'a> {
    Text(&'a [u8]),
    Stream {
        reader: Box<dyn Read + 'a>,
        bufs: [Vec<u8>; 2],
        /// Generation of the data in each buffer; -1 means never filled.
        gens: [i64; 2],
        /// The reader has returned end of input.
        exhausted: bool,
        buffer_size: usize,
    },
}

impl<'a> Source<'a> {
    pub fn from_text(text: &'a str) -> Self {
        Self {
            input: Input::Text(text.as_bytes()),
            start: Cursor { buffer: 0, offset: 0 },
            scan: Cursor { buffer: 0, offset: 0 },
            scan_len: 0,
        }
    }

    pub fn from_reader<R: Read + 'a>(reader: R, buffer_size: usize) -> Self {
        debug_assert!(buffer_size > 0);
        let mut reader: Box<dyn Read + 'a> = Box::new(reader);
        let mut first = Vec::new();
        fill(reader.as_mut(), &mut first, buffer_size);
        Self {
            input: Input::Stream {
                reader,
                bufs: [first, Vec::new()],
                gens: [0, -1],
                exhausted: false,
                buffer_size,
            },
            start: Cursor { buffer: 0, offset: 0 },
            scan: Cursor { buffer: 0, offset: 0 },
            scan_len: 0,
        }
    }

    fn buf(&self, index: usize) -> &[u8] {
        match &self.input {
            Input::Text(bytes) => bytes,
            Input::Stream { bufs, .. } => &bufs[index],
        }
    }

    /// The byte under the scan cursor, or `None` at end of input.
    pub fn peek(&self) -> Option<u8> {
        self.buf(self.scan.buffer).get(self.scan.offset).copied()
    }

    /// Advance the scan cursor one byte.
    ///
    /// Returns `Ok(true)` if the cursor now rests on a byte, `Ok(false)`
    /// at end of input.
    pub fn advance(&mut self) -> Result<bool> {
        if self.scan.offset >= self.buf(self.scan.buffer).len() {
            return self.flip();
        }
        self.scan.offset += 1;
        self.scan_len += 1;
        if self.scan.offset < self.buf(self.scan.buffer).len() {
            Ok(true)
        } else {
            self.flip()
        }
    }

    /// Switch the scan cursor to the other buffer, refilling it when its
    /// generation is older than the current buffer's.
    fn flip(&mut self) -> Result<bool> {
        let current = self.scan.buffer;
        let start_buffer = self.start.buffer;
        match &mut self.input {
            Input::Text(_) => Ok(false),
            Input::Stream {
                reader,
                bufs,
                gens,
                exhausted,
                buffer_size,
            } => {
                let next = 1 - current;
                if next == start_buffer {
                    return Err(LexError::TokenTooLong);
                }
                if gens[next] < gens[current] {
                    if *exhausted {
                        return Ok(false);
                    }
                    let filled = fill(reader.as_mut(), &mut bufs[next], *buffer_size);
                    if filled == 0 {
                        *exhausted = true;
                        return Ok(false);
                    }
                    gens[next] = gens[current] + 1;
                }
                self.scan.buffer = next;
                self.scan.offset = 0;
                Ok(true)
            }
        }
    }

    /// Move the token-start cursor up to the scan cursor.
    pub fn advance_start(&mut self) {
        self.start = self.scan;
        self.scan_len = 0;
    }

    /// Move the scan cursor back to the token start for a re-scan.
    pub fn restart_scan(&mut self) {
        self.scan = self.start;
        self.scan_len = 0;
    }

    /// Bytes consumed by the current token so far.
    pub fn scan_len(&self) -> usize {
        self.scan_len
    }

    /// Copy `len` bytes of the current token, starting `skip` bytes past
    /// the token start, into `dest`. Handles the token being split
    /// across the two buffers with at most two copies.
    pub fn copy_token(&self, skip: usize, len: usize, dest: &mut Vec<u8>) {
        debug_assert!(skip + len <= self.scan_len);
        dest.clear();
        if self.scan.buffer == self.start.buffer {
            let begin = self.start.offset + skip;
            dest.extend_from_slice(&self.buf(self.start.buffer)[begin..begin + len]);
        } else {
            let first = self.buf(self.start.buffer);
            let begin = self.start.offset + skip;
            if begin >= first.len() {
                // the skipped bytes already crossed into the scan buffer
                let overshoot = begin - first.len();
                dest.extend_from_slice(&self.buf(self.scan.buffer)[overshoot..overshoot + len]);
            } else {
                let first_len = (first.len() - begin).min(len);
                dest.extend_from_slice(&first[begin..begin + first_len]);
                if len > first_len {
                    dest.extend_from_slice(&self.buf(self.scan.buffer)[..len - first_len]);
                }
            }
        }
    }
}

/// Fill `buf` with up to `size` bytes from `reader`.
///
/// Short reads are retried until the buffer is full or the reader
/// reports end of input, so every buffer except the last is full. Read
/// errors other than interruption are treated as end of input.
fn fill(reader: &mut dyn Read, buf: &mut Vec<u8>, size: usize) -> usize {
    buf.resize(size, 0);
    let mut filled = 0;
    while filled < size {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(_) => break,
        }
    }
    buf.truncate(filled);
    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor as IoCursor;

    fn drain(source: &mut Source<'_>) -> Vec<u8> {
        let mut out = Vec::new();
        while let Some(b) = source.peek() {
            out.push(b);
            source.advance_start();
            source.advance().unwrap();
        }
        out
    }

    #[test]
    fn test_text_mode_walks_all_bytes() {
        let mut source = Source::from_text("abc");
        assert_eq!(drain(&mut source), b"abc");
        assert_eq!(source.peek(), None);
        assert!(!source.advance().unwrap());
    }

    #[test]
    fn test_stream_mode_walks_across_buffers() {
        let data = b"abcdefghij".to_vec();
        let mut source = Source::from_reader(IoCursor::new(data), 3);
        assert_eq!(drain(&mut source), b"abcdefghij");
        assert_eq!(source.peek(), None);
    }

    #[test]
    fn test_token_split_across_buffers() {
        let data = b"abcdefgh".to_vec();
        let mut source = Source::from_reader(IoCursor::new(data), 5);
        // token start stays in buffer 0 while the scan crosses into
        // buffer 1
        for _ in 0..7 {
            source.advance().unwrap();
        }
        assert_eq!(source.scan_len(), 7);
        assert_eq!(source.peek(), Some(b'h'));
        let mut out = Vec::new();
        source.copy_token(0, 7, &mut out);
        assert_eq!(out, b"abcdefg");
        source.copy_token(2, 5, &mut out);
        assert_eq!(out, b"cdefg");
    }

    #[test]
    fn test_copy_token_skip_crosses_buffers() {
        let data = b"abcdefgh".to_vec();
        let mut source = Source::from_reader(IoCursor::new(data), 5);
        for _ in 0..7 {
            source.advance().unwrap();
        }
        let mut out = Vec::new();
        source.copy_token(5, 2, &mut out);
        assert_eq!(out, b"fg");
    }

    #[test]
    fn test_token_too_long_is_reported() {
        let data = vec![b'x'; 64];
        let mut source = Source::from_reader(IoCursor::new(data), 8);
        let mut result = Ok(true);
        for _ in 0..64 {
            result = source.advance();
            if result.is_err() {
                break;
            }
        }
        assert_eq!(result, Err(LexError::TokenTooLong));
    }

    #[test]
    fn test_rescan_does_not_refill_newer_buffer() {
        let data = b"0123456789".to_vec();
        let mut source = Source::from_reader(IoCursor::new(data), 4);
        // walk near the end of buffer 0, then into buffer 1
        for _ in 0..6 {
            source.advance().unwrap();
        }
        assert_eq!(source.peek(), Some(b'6'));
        // back to the start and forward again: same bytes both times
        source.restart_scan();
        assert_eq!(source.peek(), Some(b'0'));
        for _ in 0..6 {
            source.advance().unwrap();
        }
        assert_eq!(source.peek(), Some(b'6'));
    }

    #[test]
    fn test_empty_input() {
        let mut source = Source::from_reader(IoCursor::new(Vec::new()), 4);
        assert_eq!(source.peek(), None);
        assert!(!source.advance().unwrap());
    }
}
