//! The stream interface the serving layer reads request bodies from and writes responses to.

use super::error::StreamError;

pub trait InputStream {
    /// Read into `buf`. `Ok(0)` means the end of the input was reached; fewer bytes than
    /// requested is not an error.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, StreamError>;

    /// Close the stream. On success, returns whether the underlying stream reports itself fully
    /// closed. The stream is unusable afterwards either way.
    fn close(&mut self) -> Result<bool, StreamError>;
}

pub trait OutputStream {
    /// Write from `buf`, returning how many bytes were accepted. Callers must resubmit the rest.
    fn write(&mut self, buf: &[u8]) -> Result<usize, StreamError>;

    fn flush(&mut self) -> Result<(), StreamError>;

    /// Close the stream. On success, returns whether the underlying stream reports itself fully
    /// closed. The stream is unusable afterwards either way.
    fn close(&mut self) -> Result<bool, StreamError>;

    /// Write the whole buffer, resubmitting whatever a partial write left over.
    fn write_all(&mut self, mut buf: &[u8]) -> Result<(), StreamError> {
        while !buf.is_empty() {
            let n = self.write(buf)?;
            if n == 0 {
                return Err(StreamError::new(std::io::ErrorKind::WriteZero, 0,
                                            "failed to write whole buffer"));
            }
            buf = &buf[n..];
        }
        Ok(())
    }
}
