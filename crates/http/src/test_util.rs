//! In-memory client helpers shared by the unit tests.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt, DuplexStream};

use crate::connection::Connection;
use crate::protocol::ParseError;

const DUPLEX_BUFFER_SIZE: usize = 64 * 1024;

/// Returns `(server, client)` ends of an in-memory stream; the client already
/// sent `request` and closed its write side.
pub(crate) async fn connect(request: &[u8]) -> (DuplexStream, DuplexStream) {
    let (server, mut client) = tokio::io::duplex(DUPLEX_BUFFER_SIZE);
    client.write_all(request).await.unwrap();
    client.shutdown().await.unwrap();
    (server, client)
}

/// Opens a [`Connection`] on the server end of [`connect`].
pub(crate) async fn serve_request(request: &[u8]) -> (Result<Connection, ParseError>, DuplexStream) {
    let (server, client) = connect(request).await;
    let result = Connection::open(Box::new(server), "127.0.0.1").await;
    (result, client)
}

#[derive(Debug)]
pub(crate) struct ParsedResponse {
    pub(crate) status: u16,
    pub(crate) reason: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Vec<u8>,
}

impl ParsedResponse {
    pub(crate) fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find(|(key, _)| key.eq_ignore_ascii_case(name)).map(|(_, value)| value.as_str())
    }
}

/// Reads until the server closes the stream and splits the raw response.
pub(crate) async fn parse_response<R: AsyncRead + Unpin>(client: &mut R) -> ParsedResponse {
    let mut raw = Vec::new();
    client.read_to_end(&mut raw).await.unwrap();

    let split = raw.windows(4).position(|window| window == b"\r\n\r\n").expect("response head terminator");
    let head = std::str::from_utf8(&raw[..split]).unwrap();
    let body = raw[split + 4..].to_vec();

    let mut lines = head.split("\r\n");
    let status_line = lines.next().unwrap();
    let mut parts = status_line.splitn(3, ' ');
    assert_eq!(parts.next(), Some("HTTP/1.1"));
    let status = parts.next().unwrap().parse().unwrap();
    let reason = parts.next().unwrap_or_default().to_string();

    let headers = lines
        .map(|line| {
            let (key, value) = line.split_once(": ").unwrap();
            (key.to_string(), value.to_string())
        })
        .collect();

    ParsedResponse { status, reason, headers, body }
}
