use std::io;

use thiserror::Error;

/// The error domain every `StreamError` belongs to.
pub const IO_ERROR_DOMAIN: &str = "I/O";

/// A failure reported by the FastCGI library, translated into an OS-style error kind and a
/// readable message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct StreamError {
    kind: io::ErrorKind,
    code: i32,
    message: String,
}

impl StreamError {
    pub fn new<M: Into<String>>(kind: io::ErrorKind, code: i32, message: M) -> StreamError {
        StreamError {
            kind,
            code,
            message: message.into(),
        }
    }

    /// The error returned when an operation is attempted on a cancelled adapter.
    ///
    /// Must not be `Interrupted`, which `read_to_end` and `write_all` retry.
    pub fn cancelled() -> StreamError {
        StreamError::new(io::ErrorKind::Other, libc::ECANCELED, "Operation was cancelled")
    }

    pub fn domain(&self) -> &'static str {
        IO_ERROR_DOMAIN
    }

    pub fn kind(&self) -> io::ErrorKind {
        self.kind
    }

    /// The raw code the library reported: a positive errno or a negative library code.
    pub fn code(&self) -> i32 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_cancelled(&self) -> bool {
        self.code == libc::ECANCELED
    }
}

impl From<StreamError> for io::Error {
    fn from(e: StreamError) -> io::Error {
        io::Error::new(e.kind, e)
    }
}
