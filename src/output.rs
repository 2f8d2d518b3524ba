use super::cancel::Cancellable;
use super::errno;
use super::error::StreamError;
use super::handle::ProtocolStream;
use super::stream::OutputStream;

use std::io;
use std::os::unix::io::{AsRawFd, RawFd};

/// Writes a response to the library's stdout stream for one request.
///
/// It also holds the request's stderr stream, because the library requires stderr to be closed
/// before stdout. Closing this stream closes both.
#[derive(Debug)]
pub struct FastcgiOutputStream<S: ProtocolStream, E: ProtocolStream> {
    fd: RawFd,
    stdout: S,
    stderr: E,
    cancellable: Option<Cancellable>,
    closed: bool,
}

impl<S: ProtocolStream, E: ProtocolStream> FastcgiOutputStream<S, E> {
    /// `fd` is the connection's descriptor, exposed for readiness polling; it is not closed by
    /// this stream.
    pub fn new(fd: RawFd, stdout: S, stderr: E) -> FastcgiOutputStream<S, E> {
        FastcgiOutputStream {
            fd,
            stdout,
            stderr,
            cancellable: None,
            closed: false,
        }
    }

    pub fn with_cancellable(mut self, cancellable: Cancellable) -> FastcgiOutputStream<S, E> {
        self.cancellable = Some(cancellable);
        self
    }

    pub fn set_cancellable(&mut self, cancellable: Option<Cancellable>) {
        self.cancellable = cancellable;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn check_open(&self, op: &str) {
        if self.closed {
            panic!("{} on a closed FastCGI output stream (fd {})", op, self.fd);
        }
    }

    fn check_cancelled(&self) -> Result<(), StreamError> {
        match self.cancellable {
            Some(ref c) if c.is_cancelled() => Err(StreamError::cancelled()),
            _ => Ok(()),
        }
    }

    /// Hand `buf` to stdout. Returns how many bytes the library accepted, which may be fewer than
    /// `buf.len()`.
    pub fn write(&mut self, buf: &[u8]) -> Result<usize, StreamError> {
        self.check_open("write");
        self.check_cancelled()?;

        let ret = self.stdout.write_bytes(buf);
        if ret < 0 {
            let e = errno::failure(&mut self.stdout);
            debug!("stdout write failed: {} ({:?})", e, e.kind());
            return Err(e);
        }

        debug!("wrote {} of {} bytes to stdout", ret, buf.len());
        Ok(ret as usize)
    }

    /// Flush stdout. The stream stays open even if this fails.
    pub fn flush(&mut self) -> Result<(), StreamError> {
        self.check_open("flush");
        self.check_cancelled()?;

        if self.stdout.flush() < 0 {
            let e = errno::failure(&mut self.stdout);
            debug!("stdout flush failed: {} ({:?})", e, e.kind());
            return Err(e);
        }
        Ok(())
    }

    /// Close stderr, then stdout.
    ///
    /// A stderr failure is only logged: the response on stdout can still be delivered. A stdout
    /// failure is returned.
    pub fn close(&mut self) -> Result<bool, StreamError> {
        self.check_open("close");
        self.closed = true;
        self.check_cancelled()?;

        if self.stderr.close() < 0 {
            let e = errno::translate(self.stderr.last_error());
            error!("closing stderr on fd {} failed: {} ({}, {:?})",
                   self.fd, e, e.domain(), e.kind());
        }
        self.stderr.clear_error();

        if self.stdout.close() < 0 {
            let e = errno::failure(&mut self.stdout);
            debug!("stdout close failed: {} ({:?})", e, e.kind());
            return Err(e);
        }

        let fully_closed = self.stdout.is_closed();
        debug!("stdout closed (fully closed: {})", fully_closed);
        Ok(fully_closed)
    }
}

impl<S: ProtocolStream, E: ProtocolStream> OutputStream for FastcgiOutputStream<S, E> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, StreamError> {
        FastcgiOutputStream::write(self, buf)
    }

    fn flush(&mut self) -> Result<(), StreamError> {
        FastcgiOutputStream::flush(self)
    }

    fn close(&mut self) -> Result<bool, StreamError> {
        FastcgiOutputStream::close(self)
    }
}

impl<S: ProtocolStream, E: ProtocolStream> io::Write for FastcgiOutputStream<S, E> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        FastcgiOutputStream::write(self, buf).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        FastcgiOutputStream::flush(self).map_err(io::Error::from)
    }
}

impl<S: ProtocolStream, E: ProtocolStream> AsRawFd for FastcgiOutputStream<S, E> {
    fn as_raw_fd(&self) -> RawFd {
        self.fd
    }
}

impl<S: ProtocolStream, E: ProtocolStream> Drop for FastcgiOutputStream<S, E> {
    fn drop(&mut self) {
        if !self.closed {
            warn!("FastCGI output stream on fd {} dropped without being closed", self.fd);
        }
    }
}
