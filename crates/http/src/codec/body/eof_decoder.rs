//! Decoder for request bodies without `Content-Length`, read until the peer
//! closes its side of the stream.

use std::cmp;

use crate::protocol::{ParseError, PayloadItem};
use bytes::BytesMut;
use tokio_util::codec::Decoder;

/// Size of the chunks handed out while reading to end-of-stream
pub const READ_CHUNK_SIZE: usize = 1024;

/// Yields everything buffered in chunks of at most [`READ_CHUNK_SIZE`] bytes.
///
/// There is no in-band end marker, the body ends when the stream does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EofDecoder;

impl Decoder for EofDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }

        let len = cmp::min(READ_CHUNK_SIZE, src.len());
        Ok(Some(PayloadItem::Chunk(src.split_to(len).freeze())))
    }
}
