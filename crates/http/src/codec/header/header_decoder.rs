//! HTTP head decoder for parsing the request line and header lines
//!
//! The decoder consumes the request one line at a time, so a malformed request
//! line is reported as soon as its line terminator arrives, before any header
//! has been read.
//!
//! # Grammar
//!
//! - Request line: `METHOD SP PATH SP HTTP/1.<minor>`, surrounded by optional
//!   whitespace. The method is ASCII letters only, the path starts with `/`.
//! - Header line: split on the first `:`, name trimmed and lowercased, value
//!   trimmed. A repeated name overwrites the earlier value.
//! - The head ends at the first blank line.
//!
//! # Limits
//!
//! - Maximum head size: [`DEFAULT_MAX_HEAD_BYTES`] unless configured otherwise

use bytes::BytesMut;
use http::{HeaderMap, HeaderName, HeaderValue, Method, Version};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;
use crate::protocol::{ParseError, RequestHead};

/// Default maximum size in bytes allowed for the entire head section
pub const DEFAULT_MAX_HEAD_BYTES: usize = 8 * 1024;

/// Decoder for HTTP request heads implementing the [`Decoder`] trait.
#[derive(Debug)]
pub struct HeaderDecoder {
    max_head_bytes: usize,
    consumed: usize,
    request_line: Option<RequestLine>,
    headers: HeaderMap,
}

#[derive(Debug)]
struct RequestLine {
    method: Method,
    url: String,
    version: Version,
}

impl HeaderDecoder {
    pub fn new(max_head_bytes: usize) -> Self {
        Self { max_head_bytes, consumed: 0, request_line: None, headers: HeaderMap::new() }
    }

    fn on_line(&mut self, line: &[u8]) -> Result<Option<RequestHead>, ParseError> {
        if self.request_line.is_none() {
            self.request_line = Some(parse_request_line(line)?);
            return Ok(None);
        }

        let line = std::str::from_utf8(line).map_err(|_| ParseError::invalid_header("header line is not utf-8"))?.trim();
        if !line.is_empty() {
            let (name, value) = parse_header_line(line)?;
            self.headers.insert(name, value);
            return Ok(None);
        }

        let Some(RequestLine { method, url, version }) = self.request_line.take() else {
            return Ok(None);
        };
        trace!(%method, %url, header_count = self.headers.len(), "parsed request head");
        self.consumed = 0;
        Ok(Some(RequestHead::new(method, url, version, std::mem::take(&mut self.headers))))
    }
}

impl Default for HeaderDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HEAD_BYTES)
    }
}

impl Decoder for HeaderDecoder {
    type Item = RequestHead;
    type Error = ParseError;

    /// Attempts to decode the request head from the provided bytes buffer.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(head))` once the blank line ending the head was consumed
    /// - `Ok(None)` if more data is needed
    /// - `Err(ParseError)` if the request line or a header line is invalid, or the
    ///   head exceeds the size limit
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            let Some(pos) = src.iter().position(|b| *b == b'\n') else {
                let current_size = self.consumed + src.len();
                ensure!(current_size <= self.max_head_bytes, ParseError::too_large_header(current_size, self.max_head_bytes));
                return Ok(None);
            };

            self.consumed += pos + 1;
            ensure!(self.consumed <= self.max_head_bytes, ParseError::too_large_header(self.consumed, self.max_head_bytes));

            let line = src.split_to(pos + 1);
            if let Some(head) = self.on_line(strip_line_ending(&line))? {
                return Ok(Some(head));
            }
        }
    }

    /// Handles the bytes left over when the peer closed its side.
    ///
    /// A trailing request line without terminator is still validated, so that a
    /// malformed one is reported as such. Any other truncation is
    /// [`ParseError::IncompleteHead`].
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(head) = self.decode(src)? {
            return Ok(Some(head));
        }

        if self.request_line.is_none() {
            if src.is_empty() {
                return Ok(None);
            }
            let line = src.split();
            parse_request_line(strip_line_ending(&line))?;
        }

        src.clear();
        Err(ParseError::IncompleteHead)
    }
}

fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn parse_request_line(line: &[u8]) -> Result<RequestLine, ParseError> {
    let malformed = || ParseError::malformed_request_line(String::from_utf8_lossy(line));

    let text = std::str::from_utf8(line).map_err(|_| malformed())?;
    let mut parts = text.split_ascii_whitespace();
    let (Some(method), Some(url), Some(version), None) = (parts.next(), parts.next(), parts.next(), parts.next()) else {
        return Err(malformed());
    };

    ensure!(!method.is_empty() && method.bytes().all(|b| b.is_ascii_alphabetic()), malformed());
    ensure!(url.starts_with('/'), malformed());

    let version = parse_version(version).ok_or_else(malformed)?;
    let method = Method::from_bytes(method.as_bytes()).map_err(|_| malformed())?;

    Ok(RequestLine { method, url: url.to_string(), version })
}

/// Accepts `HTTP/1.<digits>`, the protocol name is matched case-insensitively.
fn parse_version(version: &str) -> Option<Version> {
    let (protocol, number) = version.split_once('/')?;
    if !protocol.eq_ignore_ascii_case("HTTP") {
        return None;
    }

    let minor = number.strip_prefix("1.")?;
    if minor.is_empty() || !minor.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    if minor.bytes().all(|b| b == b'0') { Some(Version::HTTP_10) } else { Some(Version::HTTP_11) }
}

fn parse_header_line(line: &str) -> Result<(HeaderName, HeaderValue), ParseError> {
    let (name, value) = line.split_once(':').ok_or_else(|| ParseError::invalid_header(format!("missing ':' in {line:?}")))?;

    let name = HeaderName::from_bytes(name.trim().to_ascii_lowercase().as_bytes())
        .map_err(|_| ParseError::invalid_header(format!("invalid header name {name:?}")))?;
    let value = HeaderValue::from_str(value.trim()).map_err(|_| ParseError::invalid_header(format!("invalid value for {name}")))?;

    Ok((name, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::{ACCEPT, HOST, USER_AGENT};
    use indoc::indoc;

    #[test]
    fn from_curl() {
        let str = indoc! {"
        GET /index.html?a=1 HTTP/1.1\r
        Host: 127.0.0.1:8080\r
        User-Agent: curl/7.79.1\r
        Accept: */*\r
        \r
        "};

        let mut buf = BytesMut::from(str);
        let head = HeaderDecoder::default().decode(&mut buf).unwrap().unwrap();

        assert_eq!(head.method(), &Method::GET);
        assert_eq!(head.url(), "/index.html?a=1");
        assert_eq!(head.version(), Version::HTTP_11);
        assert_eq!(head.headers().len(), 3);
        assert_eq!(head.headers().get(HOST).unwrap(), "127.0.0.1:8080");
        assert_eq!(head.headers().get(USER_AGENT).unwrap(), "curl/7.79.1");
        assert_eq!(head.headers().get(ACCEPT).unwrap(), "*/*");
        assert!(buf.is_empty());
    }

    #[test]
    fn leaves_body_in_buffer() {
        let mut buf = BytesMut::from("POST /upload HTTP/1.0\r\nHost: example.com\r\n\r\n123");
        let head = HeaderDecoder::default().decode(&mut buf).unwrap().unwrap();

        assert_eq!(head.method(), &Method::POST);
        assert_eq!(head.version(), Version::HTTP_10);
        assert_eq!(&buf[..], b"123");
    }

    #[test]
    fn bare_newlines_and_loose_whitespace() {
        let mut buf = BytesMut::from("  get   /foo   http/1.1  \nX-Token :  abc:def  \n\n");
        let head = HeaderDecoder::default().decode(&mut buf).unwrap().unwrap();

        assert_eq!(head.method().as_str(), "get");
        assert_eq!(head.url(), "/foo");
        assert_eq!(head.headers().get("x-token").unwrap(), "abc:def");
    }

    #[test]
    fn duplicate_headers_keep_last() {
        let mut buf = BytesMut::from("GET / HTTP/1.1\r\nHost: a\r\nHOST: b\r\n\r\n");
        let head = HeaderDecoder::default().decode(&mut buf).unwrap().unwrap();

        assert_eq!(head.headers().get_all(HOST).iter().count(), 1);
        assert_eq!(head.headers().get(HOST).unwrap(), "b");
    }

    #[test]
    fn partial_head_needs_more() {
        let mut decoder = HeaderDecoder::default();
        let mut buf = BytesMut::from("GET /foo HTTP/1.1\r\nHost: exa");
        assert!(decoder.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(b"mple.com\r\n\r\n");
        let head = decoder.decode(&mut buf).unwrap().unwrap();
        assert_eq!(head.headers().get(HOST).unwrap(), "example.com");
    }

    #[test]
    fn malformed_request_lines() {
        for line in ["FROB /x\r\n", "G3T / HTTP/1.1\r\n", "GET foo HTTP/1.1\r\n", "GET / HTTP/2.0\r\n", "GET / HTTP/1.\r\n", "\r\n"] {
            let mut buf = BytesMut::from(line);
            let result = HeaderDecoder::default().decode(&mut buf);
            assert!(matches!(result, Err(ParseError::MalformedRequestLine { .. })), "{line:?}");
        }
    }

    #[test]
    fn malformed_request_line_at_eof() {
        let mut buf = BytesMut::from("FROB /x");
        let result = HeaderDecoder::default().decode_eof(&mut buf);
        assert!(matches!(result, Err(ParseError::MalformedRequestLine { line }) if line == "FROB /x"));
    }

    #[test]
    fn truncated_head_at_eof() {
        let mut buf = BytesMut::from("GET / HTTP/1.1\r\nHost: a\r\n");
        let result = HeaderDecoder::default().decode_eof(&mut buf);
        assert!(matches!(result, Err(ParseError::IncompleteHead)));
    }

    #[test]
    fn empty_stream_at_eof() {
        let mut buf = BytesMut::new();
        assert!(HeaderDecoder::default().decode_eof(&mut buf).unwrap().is_none());
    }

    #[test]
    fn header_without_colon() {
        let mut buf = BytesMut::from("GET / HTTP/1.1\r\nHost example.com\r\n\r\n");
        let result = HeaderDecoder::default().decode(&mut buf);
        assert!(matches!(result, Err(ParseError::InvalidHeader { .. })));
    }

    #[test]
    fn too_large_head() {
        let mut decoder = HeaderDecoder::new(32);
        let mut buf = BytesMut::from("GET / HTTP/1.1\r\nX-Padding: 0123456789abcdef\r\n");
        let result = decoder.decode(&mut buf);
        assert!(matches!(result, Err(ParseError::TooLargeHeader { max_size: 32, .. })));
    }
}
