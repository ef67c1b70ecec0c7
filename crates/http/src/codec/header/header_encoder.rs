//! HTTP header encoder implementation for serializing HTTP response heads
//!
//! Every response is written as `HTTP/1.1`, with the reason phrase taken from
//! the fixed table in [`reason_phrase`]. The body length is always framed with a
//! synthesized `Content-Length`, any user supplied one is dropped.

use crate::protocol::{ResponseHead, SendError, reason_phrase};

use bytes::{BufMut, BytesMut};

use http::header;
use std::io;
use std::io::Write;
use tokio_util::codec::Encoder;

/// Initial buffer size allocated for header serialization
const INIT_HEADER_SIZE: usize = 4 * 1024;

/// Encoder for HTTP response heads implementing the [`Encoder`] trait.
///
/// Takes the [`ResponseHead`] together with the exact body length in bytes.
#[derive(Debug)]
pub struct HeaderEncoder;

impl Encoder<(ResponseHead, u64)> for HeaderEncoder {
    type Error = SendError;

    /// Encodes the status line, the headers and the `Content-Length` line,
    /// followed by the blank line that ends the head.
    fn encode(&mut self, item: (ResponseHead, u64), dst: &mut BytesMut) -> Result<(), Self::Error> {
        let (header, content_length) = item;

        dst.reserve(INIT_HEADER_SIZE);
        write!(FastWrite(dst), "HTTP/1.1 {} {}\r\n", header.status().as_str(), reason_phrase(header.status()))?;

        for (header_name, header_value) in header.headers() {
            if header_name == header::CONTENT_LENGTH {
                continue;
            }
            dst.put_slice(header_name.as_ref());
            dst.put_slice(b": ");
            dst.put_slice(header_value.as_ref());
            dst.put_slice(b"\r\n");
        }

        write!(FastWrite(dst), "Content-Length: {content_length}\r\n\r\n")?;
        Ok(())
    }
}

/// Fast writer implementation for writing to BytesMut.
///
/// Space was already reserved, so writes never need to grow the buffer in steps.
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderMap, HeaderValue, StatusCode};

    #[test]
    fn encode_head() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        let head = ResponseHead::new(StatusCode::NOT_FOUND, headers);

        let mut dst = BytesMut::new();
        HeaderEncoder.encode((head, 9), &mut dst).unwrap();

        assert_eq!(&dst[..], b"HTTP/1.1 404 Not Found\r\ncontent-type: text/plain\r\nContent-Length: 9\r\n\r\n");
    }

    #[test]
    fn user_content_length_is_replaced() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("1000"));
        let head = ResponseHead::new(StatusCode::IM_A_TEAPOT, headers);

        let mut dst = BytesMut::new();
        HeaderEncoder.encode((head, 2), &mut dst).unwrap();

        assert_eq!(&dst[..], b"HTTP/1.1 418 Unknown Error\r\nContent-Length: 2\r\n\r\n");
    }
}
