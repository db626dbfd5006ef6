//! Disposable HTTP server for previewing a rendered section in a browser.
//!
//! Not a daemon: binds a random local port, answers a bounded number of
//! requests with one document, then stops.

use std::io;
use std::net::TcpListener;
use std::thread;
use std::time::Duration;
use tiny_http::{Header, Response, Server};
use tracing::{debug, info};

fn header(name: &str, value: &str) -> io::Result<Header> {
    Header::from_bytes(name.as_bytes(), value.as_bytes())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, format!("invalid header {}", name)))
}

/// Serves a single HTML document
pub struct PreviewServer {
    server: Server,
    port: u16,
    document: String,
    headers: Vec<(String, String)>,
}

impl PreviewServer {
    /// Bind to a random available port on loopback
    pub fn new(document: String) -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let server = Server::from_listener(listener, None)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

        Ok(Self {
            server,
            port,
            document,
            headers: Vec::new(),
        })
    }

    /// Extra response header, e.g. the security headers for remote HTML
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Answer up to `max_requests` requests, giving up after `timeout`
    /// without one. Returns how many were served.
    pub fn serve(&self, max_requests: usize, timeout: Duration) -> io::Result<usize> {
        let mut served = 0;
        while served < max_requests {
            let Some(request) = self.server.recv_timeout(timeout)? else {
                debug!("preview server idle, stopping");
                break;
            };
            debug!(url = request.url(), "serving preview");

            let mut response = Response::from_string(self.document.as_str())
                .with_header(header("Content-Type", "text/html; charset=UTF-8")?);
            for (name, value) in &self.headers {
                response = response.with_header(header(name, value)?);
            }
            request.respond(response)?;
            served += 1;
        }
        Ok(served)
    }
}

/// Start a server on a background thread and return its URL.
///
/// The server answers `max_requests` requests or stops after `timeout` of
/// inactivity.
pub fn start_disposable_server(
    server: PreviewServer,
    max_requests: usize,
    timeout: Duration,
) -> (String, thread::JoinHandle<io::Result<usize>>) {
    let url = server.url();
    info!(%url, "preview server listening");
    let handle = thread::spawn(move || server.serve(max_requests, timeout));
    (url, handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpStream;

    fn get(url: &str) -> String {
        let address = url.trim_start_matches("http://");
        let mut stream = TcpStream::connect(address).unwrap();
        stream
            .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .unwrap();
        let mut body = String::new();
        stream.read_to_string(&mut body).unwrap();
        body
    }

    #[test]
    fn test_server_url() {
        let server = PreviewServer::new("<p>Test</p>".to_string()).unwrap();
        assert!(server.url().starts_with("http://127.0.0.1:"));
    }

    #[test]
    fn test_serves_document_once() {
        let server = PreviewServer::new("<p>Test</p>".to_string())
            .unwrap()
            .with_header("X-Content-Type-Options", "nosniff");
        let (url, handle) = start_disposable_server(server, 1, Duration::from_secs(5));

        let response = get(&url);
        assert!(response.contains("<p>Test</p>"));
        assert!(response.to_ascii_lowercase().contains("x-content-type-options: nosniff"));
        assert_eq!(handle.join().unwrap().unwrap(), 1);
    }

    #[test]
    fn test_idle_timeout_stops() {
        let server = PreviewServer::new(String::new()).unwrap();
        assert_eq!(server.serve(3, Duration::from_millis(10)).unwrap(), 0);
    }
}
