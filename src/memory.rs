//! An in-memory stand-in for the library's streams: a one-way loopback pipe.
//!
//! Bytes written to the writer end come out of the reader end. Neither end ever blocks: reading an
//! empty pipe fails with `EAGAIN` until the writer is closed, after which it reads end-of-input.

use super::errno::LibraryError;
use super::handle::ProtocolStream;

use bytes::{Buf, BytesMut};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct Shared {
    buffer: BytesMut,
    writer_closed: bool,
    reader_closed: bool,
}

/// One end of a memory pipe.
#[derive(Debug)]
pub struct MemoryStream {
    shared: Arc<Mutex<Shared>>,
    is_reader: bool,
    error: i32,
    pending_error: Option<i32>,
    chunk_limit: Option<usize>,
    closed: bool,
}

/// Create a pipe, returning its (writer, reader) ends.
pub fn pipe() -> (MemoryStream, MemoryStream) {
    let shared = Arc::new(Mutex::new(Shared::default()));
    (MemoryStream::new(shared.clone(), false), MemoryStream::new(shared, true))
}

impl MemoryStream {
    fn new(shared: Arc<Mutex<Shared>>, is_reader: bool) -> MemoryStream {
        MemoryStream {
            shared,
            is_reader,
            error: 0,
            pending_error: None,
            chunk_limit: None,
            closed: false,
        }
    }

    /// Cap the number of bytes a single read or write transfers.
    pub fn set_chunk_limit(&mut self, limit: Option<usize>) {
        self.chunk_limit = limit;
    }

    /// Make the next read, write, flush or close fail with `code`.
    pub fn fail_next(&mut self, code: i32) {
        self.pending_error = Some(code);
    }

    /// Number of bytes written but not yet read.
    pub fn buffered(&self) -> usize {
        self.lock().buffer.len()
    }

    fn lock(&self) -> MutexGuard<Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn fail(&mut self, code: i32) -> isize {
        self.error = code;
        -1
    }

    fn injected(&mut self) -> Option<isize> {
        self.pending_error.take().map(|code| self.fail(code))
    }

    fn limit(&self, len: usize) -> usize {
        self.chunk_limit.map_or(len, |limit| len.min(limit))
    }
}

impl ProtocolStream for MemoryStream {
    fn read_bytes(&mut self, buf: &mut [u8]) -> isize {
        if let Some(ret) = self.injected() {
            return ret;
        }
        if !self.is_reader || self.closed {
            return self.fail(LibraryError::CallSeqError as i32);
        }

        let n = {
            let mut shared = self.lock();
            if shared.buffer.is_empty() {
                if shared.writer_closed {
                    return 0;
                }
                None
            } else {
                let n = self.limit(buf.len()).min(shared.buffer.len());
                buf[..n].copy_from_slice(&shared.buffer[..n]);
                shared.buffer.advance(n);
                Some(n)
            }
        };

        match n {
            Some(n) => n as isize,
            None => self.fail(libc::EAGAIN),
        }
    }

    fn write_bytes(&mut self, buf: &[u8]) -> isize {
        if let Some(ret) = self.injected() {
            return ret;
        }
        if self.is_reader || self.closed {
            return self.fail(LibraryError::CallSeqError as i32);
        }

        let n = self.limit(buf.len());
        let mut shared = self.lock();
        if shared.reader_closed {
            drop(shared);
            return self.fail(libc::EPIPE);
        }
        shared.buffer.extend_from_slice(&buf[..n]);
        n as isize
    }

    fn flush(&mut self) -> i32 {
        if let Some(ret) = self.injected() {
            return ret as i32;
        }
        if self.is_reader || self.closed {
            return self.fail(LibraryError::CallSeqError as i32) as i32;
        }
        0
    }

    fn close(&mut self) -> i32 {
        // the library still marks the stream closed when closing fails
        let ret = self.injected().map_or(0, |ret| ret as i32);
        if self.closed {
            return ret;
        }
        self.closed = true;

        let mut shared = self.lock();
        if self.is_reader {
            shared.reader_closed = true;
            shared.buffer.clear();
        } else {
            shared.writer_closed = true;
        }
        ret
    }

    fn last_error(&self) -> i32 {
        self.error
    }

    fn clear_error(&mut self) {
        self.error = 0;
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn loopback() {
        let (mut tx, mut rx) = pipe();
        assert_eq!(tx.write_bytes(b"hello world"), 11);
        assert_eq!(rx.buffered(), 11);

        let mut buf = [0u8; 5];
        assert_eq!(rx.read_bytes(&mut buf), 5);
        assert_eq!(&buf, b"hello");

        assert_eq!(tx.close(), 0);
        let mut buf = [0u8; 16];
        assert_eq!(rx.read_bytes(&mut buf), 6);
        assert_eq!(&buf[..6], b" world");
        assert_eq!(rx.read_bytes(&mut buf), 0);
    }

    #[test]
    fn empty_open_pipe_would_block() {
        let (_tx, mut rx) = pipe();
        let mut buf = [0u8; 4];
        assert_eq!(rx.read_bytes(&mut buf), -1);
        assert_eq!(rx.last_error(), libc::EAGAIN);
    }

    #[test]
    fn chunk_limit() {
        let (mut tx, mut rx) = pipe();
        tx.set_chunk_limit(Some(3));
        assert_eq!(tx.write_bytes(b"abcdef"), 3);
        rx.set_chunk_limit(Some(2));
        let mut buf = [0u8; 8];
        assert_eq!(rx.read_bytes(&mut buf), 2);
        assert_eq!(&buf[..2], b"ab");
    }

    #[test]
    fn wrong_direction() {
        let (mut tx, mut rx) = pipe();
        assert_eq!(rx.write_bytes(b"x"), -1);
        assert_eq!(rx.last_error(), LibraryError::CallSeqError as i32);
        let mut buf = [0u8; 1];
        assert_eq!(tx.read_bytes(&mut buf), -1);
        assert_eq!(tx.last_error(), -5);
    }

    #[test]
    fn write_after_reader_closed() {
        let (mut tx, mut rx) = pipe();
        assert_eq!(rx.close(), 0);
        assert_eq!(tx.write_bytes(b"x"), -1);
        assert_eq!(tx.last_error(), libc::EPIPE);
    }

    #[test]
    fn close_is_idempotent() {
        let (mut tx, _rx) = pipe();
        assert_eq!(tx.close(), 0);
        assert_eq!(tx.close(), 0);
        assert!(tx.is_closed());
    }

    #[test]
    fn failed_writer_close_still_ends_input() {
        let (mut tx, mut rx) = pipe();
        assert_eq!(tx.write_bytes(b"ab"), 2);
        tx.fail_next(libc::EIO);
        assert_eq!(tx.close(), -1);
        assert_eq!(tx.last_error(), libc::EIO);
        assert!(tx.is_closed());

        let mut buf = [0u8; 4];
        assert_eq!(rx.read_bytes(&mut buf), 2);
        assert_eq!(rx.read_bytes(&mut buf), 0);
        assert_eq!(rx.last_error(), 0);
    }

    #[test]
    fn failed_reader_close_still_breaks_pipe() {
        let (mut tx, mut rx) = pipe();
        rx.fail_next(libc::EIO);
        assert_eq!(rx.close(), -1);
        assert_eq!(tx.write_bytes(b"x"), -1);
        assert_eq!(tx.last_error(), libc::EPIPE);
    }

    #[test]
    fn injected_failure_is_one_shot() {
        let (mut tx, _rx) = pipe();
        tx.fail_next(libc::ENOSPC);
        assert_eq!(tx.flush(), -1);
        assert_eq!(tx.last_error(), libc::ENOSPC);
        tx.clear_error();
        assert_eq!(tx.flush(), 0);
        assert_eq!(tx.last_error(), 0);
    }
}
