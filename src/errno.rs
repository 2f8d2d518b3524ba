//! Translation of FastCGI library error codes into `StreamError`s.

use super::error::StreamError;
use super::handle::ProtocolStream;

use enum_primitive::FromPrimitive;

use std::io;

enum_from_primitive! {
    /// Error codes specific to the FastCGI library. These are stored on a stream as negative
    /// values, so they never collide with an OS errno.
    #[repr(i32)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum LibraryError {
        UnsupportedVersion = -2,
        ProtocolError = -3,
        ParamsError = -4,
        CallSeqError = -5,
    }
}

impl LibraryError {
    pub fn kind(self) -> io::ErrorKind {
        match self {
            LibraryError::UnsupportedVersion => io::ErrorKind::Unsupported,
            LibraryError::ProtocolError | LibraryError::ParamsError => io::ErrorKind::InvalidData,
            LibraryError::CallSeqError => io::ErrorKind::Other,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            LibraryError::UnsupportedVersion => "Unsupported FastCGI protocol version",
            LibraryError::ProtocolError => "FastCGI protocol error",
            LibraryError::ParamsError => "Invalid FastCGI parameters",
            LibraryError::CallSeqError => "FastCGI call sequence error",
        }
    }
}

/// Map a raw code, as read from a stream right after a failing call, to a `StreamError`.
pub fn translate(code: i32) -> StreamError {
    if code > 0 {
        let os = io::Error::from_raw_os_error(code);
        return StreamError::new(os.kind(), code, os.to_string());
    }

    if code == 0 {
        return StreamError::new(io::ErrorKind::Other, code, "Unknown error");
    }

    match LibraryError::from_i32(code) {
        Some(e) => StreamError::new(e.kind(), code, e.message()),
        None => StreamError::new(io::ErrorKind::Other, code,
                                 format!("Unknown FastCGI error {}", code)),
    }
}

/// Translate the error stored on `stream`, then clear it so the stream stays usable.
///
/// Must be called before any other call on the stream, since the next call overwrites the stored
/// error. Returns `None` if no error was stored.
pub fn take_error<S: ProtocolStream + ?Sized>(stream: &mut S) -> Option<StreamError> {
    let code = stream.last_error();
    stream.clear_error();
    if code == 0 {
        None
    } else {
        Some(translate(code))
    }
}

/// Like `take_error`, for use after a call that reported failure: a failure with nothing stored
/// still produces an error.
pub(crate) fn failure<S: ProtocolStream + ?Sized>(stream: &mut S) -> StreamError {
    take_error(stream).unwrap_or_else(|| translate(0))
}
