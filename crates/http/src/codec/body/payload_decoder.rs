//! Decoder implementation for HTTP request payloads.
//!
//! Picks the decoding strategy from the [`PayloadSize`] derived from the request
//! headers:
//! - Content-Length based payloads
//! - Payloads running until end-of-stream

use crate::codec::body::eof_decoder::EofDecoder;
use crate::codec::body::length_decoder::LengthDecoder;
use crate::protocol::{ParseError, PayloadItem, PayloadSize};
use bytes::BytesMut;
use tokio_util::codec::Decoder;

/// A unified decoder for handling HTTP request payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadDecoder {
    /// The specific decoding strategy to use
    kind: Kind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    /// Decode payload with a fixed content length
    Length(LengthDecoder),

    /// Decode until the stream ends
    UntilEof(EofDecoder),
}

impl PayloadDecoder {
    /// Creates a PayloadDecoder for a fixed-length payload.
    pub fn fix_length(size: u64) -> Self {
        Self { kind: Kind::Length(LengthDecoder::new(size)) }
    }

    /// Creates a PayloadDecoder reading until end-of-stream.
    pub fn until_eof() -> Self {
        Self { kind: Kind::UntilEof(EofDecoder) }
    }
}

impl From<PayloadSize> for PayloadDecoder {
    fn from(payload_size: PayloadSize) -> Self {
        match payload_size {
            PayloadSize::Length(n) => PayloadDecoder::fix_length(n),
            PayloadSize::UntilEof => PayloadDecoder::until_eof(),
        }
    }
}

impl Decoder for PayloadDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match &mut self.kind {
            Kind::Length(length_decoder) => length_decoder.decode(src),
            Kind::UntilEof(eof_decoder) => eof_decoder.decode(src),
        }
    }
}
