//! Shared fixtures for the integration tests: may runtime setup, ephemeral
//! port reservation, a raw-TCP HTTP client and a recording crash reporter.

use actiongate::crashlog::CrashReporter;
use serde_json::{Map, Value};
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Mutex, Once};
use std::time::Duration;

/// Ensures may coroutines are configured only once per test binary.
static MAY_INIT: Once = Once::new();

pub fn setup_may_runtime() {
    MAY_INIT.call_once(|| {
        may::config().set_stack_size(0x8000);
    });
}

/// Reserve an ephemeral port. Racy by nature, good enough for tests.
pub fn reserve_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

pub fn send_request(addr: &SocketAddr, req: &str) -> String {
    send_request_timeout(addr, req, Duration::from_millis(200))
}

/// Write a raw HTTP request and read until the connection goes quiet.
pub fn send_request_timeout(addr: &SocketAddr, req: &str, timeout: Duration) -> String {
    let mut stream = TcpStream::connect(addr).unwrap();
    stream.write_all(req.as_bytes()).unwrap();
    stream.set_read_timeout(Some(timeout)).unwrap();
    let mut buf = Vec::new();
    loop {
        let mut tmp = [0u8; 1024];
        match stream.read(&mut tmp) {
            Ok(0) => break,
            Ok(n) => buf.extend_from_slice(&tmp[..n]),
            Err(ref e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                break
            }
            Err(e) => panic!("read error: {:?}", e),
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

/// Compose a POST request with a body.
pub fn post(path: &str, content_type: &str, body: &str) -> String {
    format!(
        "POST {path} HTTP/1.1\r\nHost: localhost\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    )
}

/// Split a raw HTTP response into (status, headers, body).
pub fn parse_response(resp: &str) -> (u16, String, String) {
    let mut parts = resp.splitn(2, "\r\n\r\n");
    let headers = parts.next().unwrap_or("").to_string();
    let body = parts.next().unwrap_or("").to_string();
    let status = headers
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|code| code.parse().ok())
        .unwrap_or(0);
    (status, headers, body)
}

/// Decode a `]`-prefixed dispatch payload.
pub fn parse_payload(body: &str) -> Value {
    let json = body.strip_prefix(']').expect("missing dispatch prefix");
    serde_json::from_str(json).expect("payload is not valid JSON")
}

/// One recorded crash-report invocation.
pub struct CrashCall {
    pub message: String,
    pub source: String,
    pub details: Map<String, Value>,
    pub notify: Option<String>,
}

/// Crash reporter that records every invocation for later assertions.
#[derive(Default)]
pub struct RecordingReporter {
    pub calls: Mutex<Vec<CrashCall>>,
}

impl RecordingReporter {
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl CrashReporter for RecordingReporter {
    fn report(
        &self,
        error: &anyhow::Error,
        source: &str,
        details: &Map<String, Value>,
        notify: Option<&str>,
    ) -> anyhow::Result<()> {
        self.calls.lock().unwrap().push(CrashCall {
            message: format!("{error}"),
            source: source.to_string(),
            details: details.clone(),
            notify: notify.map(str::to_string),
        });
        Ok(())
    }
}
