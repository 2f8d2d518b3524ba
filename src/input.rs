use super::cancel::Cancellable;
use super::errno;
use super::error::StreamError;
use super::handle::ProtocolStream;
use super::stream::InputStream;

use std::io;
use std::os::unix::io::{AsRawFd, RawFd};

/// Reads a request body from the library's stdin stream for one request.
#[derive(Debug)]
pub struct FastcgiInputStream<S: ProtocolStream> {
    fd: RawFd,
    stdin: S,
    cancellable: Option<Cancellable>,
    closed: bool,
}

impl<S: ProtocolStream> FastcgiInputStream<S> {
    /// `fd` is the connection's descriptor, exposed for readiness polling; it is not closed by
    /// this stream.
    pub fn new(fd: RawFd, stdin: S) -> FastcgiInputStream<S> {
        FastcgiInputStream {
            fd,
            stdin,
            cancellable: None,
            closed: false,
        }
    }

    pub fn with_cancellable(mut self, cancellable: Cancellable) -> FastcgiInputStream<S> {
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
            panic!("{} on a closed FastCGI input stream (fd {})", op, self.fd);
        }
    }

    fn check_cancelled(&self) -> Result<(), StreamError> {
        match self.cancellable {
            Some(ref c) if c.is_cancelled() => Err(StreamError::cancelled()),
            _ => Ok(()),
        }
    }

    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, StreamError> {
        self.check_open("read");
        self.check_cancelled()?;

        let ret = self.stdin.read_bytes(buf);
        if ret < 0 {
            let e = errno::failure(&mut self.stdin);
            debug!("stdin read failed: {} ({:?})", e, e.kind());
            return Err(e);
        }

        debug!("read {} of {} bytes from stdin", ret, buf.len());
        Ok(ret as usize)
    }

    pub fn close(&mut self) -> Result<bool, StreamError> {
        self.check_open("close");
        self.closed = true;
        self.check_cancelled()?;

        if self.stdin.close() < 0 {
            let e = errno::failure(&mut self.stdin);
            debug!("stdin close failed: {} ({:?})", e, e.kind());
            return Err(e);
        }

        let fully_closed = self.stdin.is_closed();
        debug!("stdin closed (fully closed: {})", fully_closed);
        Ok(fully_closed)
    }
}

impl<S: ProtocolStream> InputStream for FastcgiInputStream<S> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, StreamError> {
        FastcgiInputStream::read(self, buf)
    }

    fn close(&mut self) -> Result<bool, StreamError> {
        FastcgiInputStream::close(self)
    }
}

impl<S: ProtocolStream> io::Read for FastcgiInputStream<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        FastcgiInputStream::read(self, buf).map_err(io::Error::from)
    }
}

impl<S: ProtocolStream> AsRawFd for FastcgiInputStream<S> {
    fn as_raw_fd(&self) -> RawFd {
        self.fd
    }
}

impl<S: ProtocolStream> Drop for FastcgiInputStream<S> {
    fn drop(&mut self) {
        if !self.closed {
            warn!("FastCGI input stream on fd {} dropped without being closed", self.fd);
        }
    }
}
