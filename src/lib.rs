//! Byte-stream adapters over the per-request streams of a FastCGI application library.
//!
//! The library hands out three streams per request (stdin, stdout and stderr). This crate wraps
//! them in `FastcgiInputStream` and `FastcgiOutputStream`, which speak `InputStream` /
//! `OutputStream` (and `std::io::Read` / `std::io::Write`) and report failures as `StreamError`.

#[macro_use] extern crate enum_primitive;
#[macro_use] extern crate log;

mod cancel;
mod errno;
mod error;
mod handle;
mod input;
pub mod memory;
mod output;
mod stream;

pub use cancel::Cancellable;
pub use errno::{take_error, translate, LibraryError};
pub use error::{StreamError, IO_ERROR_DOMAIN};
pub use handle::ProtocolStream;
pub use input::FastcgiInputStream;
pub use output::FastcgiOutputStream;
pub use stream::{InputStream, OutputStream};

use std::os::unix::io::RawFd;

/// Build the input/output stream pair for one request from the library's stdin, stdout and
/// stderr streams. `fd` is the connection's descriptor.
pub fn request_streams<I, O, E>(fd: RawFd, stdin: I, stdout: O, stderr: E)
    -> (FastcgiInputStream<I>, FastcgiOutputStream<O, E>)
    where I: ProtocolStream,
          O: ProtocolStream,
          E: ProtocolStream,
{
    debug!("new request streams on fd {}", fd);
    (FastcgiInputStream::new(fd, stdin), FastcgiOutputStream::new(fd, stdout, stderr))
}
