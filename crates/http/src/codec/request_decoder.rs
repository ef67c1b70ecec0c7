//! HTTP request decoder module
//!
//! Decodes a request in two phases through a small state machine: first the head
//! via [`HeaderDecoder`], then, only once the connection asks for it, the body
//! via [`PayloadDecoder`].
//!
//! # Example
//!
//! ```no_run
//! use pool_http::codec::RequestDecoder;
//! use tokio_util::codec::Decoder;
//! use bytes::BytesMut;
//!
//! let mut decoder = RequestDecoder::new();
//! let mut buffer = BytesMut::from("GET / HTTP/1.1\r\nHost: localhost\r\n\r\n");
//! let result = decoder.decode(&mut buffer);
//! ```

use crate::codec::body::PayloadDecoder;
use crate::codec::header::{DEFAULT_MAX_HEAD_BYTES, HeaderDecoder};
use crate::protocol::{Message, ParseError, PayloadItem, PayloadSize, RequestHead};
use bytes::BytesMut;
use tokio_util::codec::Decoder;

/// A decoder for HTTP requests that handles both the head and the payload
///
/// The decoder maintains its state through the `payload_decoder` field:
/// - `None`: Currently parsing the head
/// - `Some(PayloadDecoder)`: Currently parsing payload, armed by [`RequestDecoder::expect_payload`]
///
/// The body is never decoded unless it is asked for, so a handler that ignores
/// the body never pays for reading it.
#[derive(Debug)]
pub struct RequestDecoder {
    header_decoder: HeaderDecoder,
    payload_decoder: Option<PayloadDecoder>,
}

impl RequestDecoder {
    /// Creates a new `RequestDecoder` instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_head_bytes(max_head_bytes: usize) -> Self {
        Self { header_decoder: HeaderDecoder::new(max_head_bytes), payload_decoder: None }
    }

    /// Switches the decoder to the payload phase.
    pub fn expect_payload(&mut self, payload_size: PayloadSize) {
        self.payload_decoder = Some(payload_size.into());
    }
}

impl Default for RequestDecoder {
    fn default() -> Self {
        Self::with_max_head_bytes(DEFAULT_MAX_HEAD_BYTES)
    }
}

impl Decoder for RequestDecoder {
    type Item = Message<RequestHead>;
    type Error = ParseError;

    /// Attempts to decode an HTTP request from the provided buffer
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Message::Header(_)))`: Successfully decoded the request head
    /// - `Ok(Some(Message::Payload(_)))`: Successfully decoded a payload chunk
    /// - `Ok(None)`: Need more data to proceed
    /// - `Err(_)`: Encountered a parsing error
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // parse payload if have payload_decoder
        if let Some(payload_decoder) = &mut self.payload_decoder {
            let message = match payload_decoder.decode(src)? {
                Some(item @ PayloadItem::Chunk(_)) => Some(Message::Payload(item)),
                Some(item @ PayloadItem::Eof) => {
                    // no need payload decoder in this request now
                    self.payload_decoder.take();
                    Some(Message::Payload(item))
                }
                None => None,
            };

            return Ok(message);
        }

        Ok(self.header_decoder.decode(src)?.map(Message::Header))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.payload_decoder.is_some() {
            return self.decode(src);
        }

        Ok(self.header_decoder.decode_eof(src)?.map(Message::Header))
    }
}
