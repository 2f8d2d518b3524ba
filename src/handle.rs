//! The per-stream calls the FastCGI application library exposes for one direction (stdin, stdout
//! or stderr) of one active request.
//!
//! These follow the library's C conventions: a negative return means failure, and the reason is
//! stored on the stream until it is read with `last_error` and reset with `clear_error`.

/// Library-owned handle for one direction of one request.
pub trait ProtocolStream {
    /// Read up to `buf.len()` bytes. Returns the number read, 0 at end of input, or a negative
    /// value on failure.
    fn read_bytes(&mut self, buf: &mut [u8]) -> isize;

    /// Write up to `buf.len()` bytes. Returns the number accepted, or a negative value on failure.
    fn write_bytes(&mut self, buf: &[u8]) -> isize;

    /// Returns 0 on success, or a negative value on failure.
    fn flush(&mut self) -> i32;

    /// Returns 0 on success, or a negative value on failure.
    fn close(&mut self) -> i32;

    /// The stored error: a positive OS errno, a negative library code, or 0 for none.
    fn last_error(&self) -> i32;

    fn clear_error(&mut self);

    /// Whether the library considers the stream completely closed.
    fn is_closed(&self) -> bool;
}

impl<'a, T: ProtocolStream + ?Sized> ProtocolStream for &'a mut T {
    fn read_bytes(&mut self, buf: &mut [u8]) -> isize {
        (**self).read_bytes(buf)
    }

    fn write_bytes(&mut self, buf: &[u8]) -> isize {
        (**self).write_bytes(buf)
    }

    fn flush(&mut self) -> i32 {
        (**self).flush()
    }

    fn close(&mut self) -> i32 {
        (**self).close()
    }

    fn last_error(&self) -> i32 {
        (**self).last_error()
    }

    fn clear_error(&mut self) {
        (**self).clear_error()
    }

    fn is_closed(&self) -> bool {
        (**self).is_closed()
    }
}

impl<T: ProtocolStream + ?Sized> ProtocolStream for Box<T> {
    fn read_bytes(&mut self, buf: &mut [u8]) -> isize {
        (**self).read_bytes(buf)
    }

    fn write_bytes(&mut self, buf: &[u8]) -> isize {
        (**self).write_bytes(buf)
    }

    fn flush(&mut self) -> i32 {
        (**self).flush()
    }

    fn close(&mut self) -> i32 {
        (**self).close()
    }

    fn last_error(&self) -> i32 {
        (**self).last_error()
    }

    fn clear_error(&mut self) {
        (**self).clear_error()
    }

    fn is_closed(&self) -> bool {
        (**self).is_closed()
    }
}
