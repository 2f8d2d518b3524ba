//! Runs one request through the stream adapters, using memory pipes in place of the FastCGI
//! library's streams, and echoes the request body back as the response.

extern crate env_logger;
extern crate fastcgi_streams;

use fastcgi_streams::*;
use fastcgi_streams::memory::{pipe, MemoryStream};

use std::io::{self, Read, Write};

fn echo<I: ProtocolStream, O: ProtocolStream, E: ProtocolStream>(
    mut input: FastcgiInputStream<I>,
    mut output: FastcgiOutputStream<O, E>,
) -> io::Result<()> {
    let mut body = vec![];
    input.read_to_end(&mut body)?;
    input.close()?;

    write!(output, "Content-Type: application/octet-stream\r\n")?;
    write!(output, "Content-Length: {}\r\n\r\n", body.len())?;
    Write::write_all(&mut output, &body)?;
    output.flush()?;
    output.close()?;
    Ok(())
}

fn drain(rx: &mut MemoryStream) -> Vec<u8> {
    let mut out = vec![];
    let mut buf = [0u8; 4096];
    loop {
        let n = rx.read_bytes(&mut buf);
        if n <= 0 {
            return out;
        }
        out.extend_from_slice(&buf[..n as usize]);
    }
}

fn main() {
    env_logger::init();

    let (mut client_stdin, stdin) = pipe();
    let (mut stdout, mut client_stdout) = pipe();
    let (stderr, _client_stderr) = pipe();

    // make the adapters deal with short writes
    stdout.set_chunk_limit(Some(16));

    let request_body = b"Hello from the web server. Please send this back.";
    client_stdin.write_bytes(request_body);
    client_stdin.close();

    let (input, output) = request_streams(0, stdin, stdout, stderr);
    if let Err(e) = echo(input, output) {
        eprintln!("request failed: {}", e);
        return;
    }

    let response = drain(&mut client_stdout);
    println!("{}", String::from_utf8_lossy(&response));
}
