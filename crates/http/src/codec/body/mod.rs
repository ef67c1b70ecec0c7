//! HTTP body handling module for processing request and response payloads
//!
//! # Components
//!
//! ## Decoders
//! - [`LengthDecoder`](length_decoder::LengthDecoder): fixed-length request payloads
//! - [`EofDecoder`](eof_decoder::EofDecoder): request payloads running until end-of-stream
//! - [`PayloadDecoder`]: Main decoder that picks one of the strategies above
//!
//! ## Encoders
//! - [`LengthEncoder`]: fixed-length response payloads, the only framing responses use

mod eof_decoder;
mod length_decoder;
mod length_encoder;
mod payload_decoder;

pub use eof_decoder::READ_CHUNK_SIZE;
pub use length_encoder::LengthEncoder;
pub use payload_decoder::PayloadDecoder;
