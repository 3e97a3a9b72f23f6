//! Ephemeral loopback asset server (C2).
//!
//! One instance binds a single TCP listener on `localhost:<port>` and serves
//! GET requests out of one [`PackageReader`] for the lifetime of a single
//! render job. Modeled directly on the reference implementation's
//! `ZptServer` (one server per slot, `Run`/`Shutdown` lifecycle) using the
//! same hand-rolled-HTTP-over-`TcpListener` idiom this crate already uses
//! elsewhere for loopback plumbing.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, SystemTime};

use crate::package::{PackageError, PackageReader};

const TCP_READ_BUFFER_SIZE: usize = 0x1000;
const READ_WRITE_TIMEOUT: Duration = Duration::from_secs(300);

/// A loopback HTTP server serving entries from one [`PackageReader`].
///
/// Constructed per slot by [`crate::server_pool::ServerPool`]; never shared
/// across jobs.
pub struct AssetServer {
    reader: Arc<Mutex<PackageReader>>,
    port: u16,
    default_index: String,
    shutdown: Arc<AtomicBool>,
}

impl AssetServer {
    /// Builds a server bound (not yet listening) to `localhost:port`,
    /// serving `reader` with `default_index` as the root-path entry.
    pub fn new(reader: PackageReader, port: u16, default_index: String) -> Self {
        Self {
            reader: Arc::new(Mutex::new(reader)),
            port,
            default_index,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Blocking accept loop. Returns once [`AssetServer::shutdown`] has been
    /// called and the listener has been released.
    pub fn run(&self) -> std::io::Result<()> {
        let listener = TcpListener::bind(("127.0.0.1", self.port))?;
        log::debug!("asset server listening on 127.0.0.1:{}", self.port);

        for stream in listener.incoming() {
            if self.shutdown.load(Ordering::Acquire) {
                break;
            }
            match stream {
                Ok(stream) => {
                    let reader = Arc::clone(&self.reader);
                    let default_index = self.default_index.clone();
                    thread::spawn(move || {
                        if let Err(e) = serve_connection(stream, reader, default_index) {
                            log::warn!("asset server connection error: {}", e);
                        }
                    });
                }
                Err(e) => log::warn!("asset server accept error on port {}: {}", self.port, e),
            }
        }

        log::debug!("asset server on port {} stopped accepting", self.port);
        Ok(())
    }

    /// Signals the accept loop to stop and unblocks it with a throwaway
    /// local connection, matching the contract that the listener must be
    /// released by the time this returns control to the caller (the actual
    /// join happens in [`crate::server_pool::ServerPool::release`]).
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
        // `TcpListener::incoming()` blocks in `accept()`; a throwaway local
        // connection wakes it so the loop observes the flag promptly.
        let _ = TcpStream::connect(("127.0.0.1", self.port));
    }

    /// The port this server is bound to (or will bind to on `run`).
    pub fn port(&self) -> u16 {
        self.port
    }
}

fn serve_connection(
    mut stream: TcpStream,
    reader: Arc<Mutex<PackageReader>>,
    default_index: String,
) -> std::io::Result<()> {
    stream.set_read_timeout(Some(READ_WRITE_TIMEOUT))?;
    stream.set_write_timeout(Some(READ_WRITE_TIMEOUT))?;

    let mut read_buffer = [0u8; TCP_READ_BUFFER_SIZE];
    let mut buffer = Vec::new();
    let (method, path) = loop {
        let n = stream.read(&mut read_buffer)?;
        if n == 0 {
            return Ok(());
        }
        buffer.extend_from_slice(&read_buffer[..n]);

        let mut headers = [httparse::EMPTY_HEADER; 16];
        let mut req = httparse::Request::new(&mut headers);
        match req.parse(&buffer) {
            Ok(httparse::Status::Partial) => continue,
            Ok(httparse::Status::Complete(_)) => {
                match (req.method, req.path) {
                    (Some(method), Some(path)) => break (method.to_string(), path.to_string()),
                    _ => return respond_http_error(&mut stream, 400, "Bad Request"),
                }
            }
            Err(_) => return respond_http_error(&mut stream, 400, "Bad Request"),
        }
    };

    if method != "GET" {
        return respond_http_error(&mut stream, 405, "Method Not Allowed");
    }

    let decoded = urlencoding::decode(&path)
        .map(|c| c.into_owned())
        .unwrap_or(path);

    let mut guard = reader
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    match guard.read(&decoded, &default_index) {
        Ok(bytes) => {
            drop(guard);
            let content_type = mime_guess::from_path(&decoded)
                .first_raw()
                .unwrap_or("application/octet-stream");
            respond_content_ok(&mut stream, content_type, &bytes)
        }
        Err(PackageError::Forbidden(path)) => {
            log::warn!("asset server: forbidden path request: {}", path);
            drop(guard);
            respond_http_error(&mut stream, 403, "Forbidden")
        }
        Err(PackageError::NotFound(path)) => {
            log::warn!("asset server: entry not found: {}", path);
            drop(guard);
            respond_http_error(&mut stream, 404, "Not Found")
        }
        Err(e) => {
            log::warn!("asset server: archive error serving {}: {}", decoded, e);
            drop(guard);
            respond_http_error(&mut stream, 404, "Not Found")
        }
    }
}

fn respond_content_ok(stream: &mut TcpStream, content_type: &str, body: &[u8]) -> std::io::Result<()> {
    let response = format!(
        "HTTP/1.1 200 OK\r\nDate: {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        http_date_now(),
        content_type,
        body.len(),
    );
    stream.write_all(response.as_bytes())?;
    if let Err(e) = stream.write_all(body) {
        log::warn!("asset server: error writing response body: {}", e);
    }
    Ok(())
}

fn respond_http_error(stream: &mut TcpStream, code: u16, reason: &str) -> std::io::Result<()> {
    let body = format!("{} {}", code, reason);
    let response = format!(
        "HTTP/1.1 {} {}\r\nDate: {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        code,
        reason,
        http_date_now(),
        body.len(),
        body,
    );
    stream.write_all(response.as_bytes())
}

fn http_date_now() -> String {
    httpdate::fmt_http_date(SystemTime::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write as _};
    use std::net::TcpStream;
    use zip::write::{SimpleFileOptions, ZipWriter};

    fn make_fixture() -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let cursor = Cursor::new(&mut buf);
            let mut writer = ZipWriter::new(cursor);
            let opts = SimpleFileOptions::default();
            writer.start_file("report.html", opts).unwrap();
            writer.write_all(b"<html>hi</html>").unwrap();
            writer.finish().unwrap();
        }
        buf
    }

    #[test]
    fn test_serve_and_shutdown() {
        let reader = PackageReader::open(make_fixture()).unwrap();
        let server = Arc::new(AssetServer::new(reader, 19876, "report.html".to_string()));
        let run_server = Arc::clone(&server);
        let handle = thread::spawn(move || run_server.run());

        thread::sleep(Duration::from_millis(100));

        let mut stream = TcpStream::connect(("127.0.0.1", 19876)).unwrap();
        stream.write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n").unwrap();
        let mut response = Vec::new();
        stream.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
        let _ = stream.read_to_end(&mut response);
        let text = String::from_utf8_lossy(&response);
        assert!(text.starts_with("HTTP/1.1 200 OK"));
        assert!(text.contains("<html>hi</html>"));

        server.shutdown();
        handle.join().unwrap().unwrap();
    }
}
