//! HTTP codec module for encoding and decoding HTTP messages
//!
//! # Architecture
//!
//! - Request handling:
//!   - [`RequestDecoder`]: Decodes incoming HTTP requests
//!   - Head parsing via the `header` module
//!   - Payload decoding via the `body` module, armed lazily
//!
//! - Response handling:
//!   - [`ResponseEncoder`]: Encodes outgoing HTTP responses
//!   - Status line and headers via the `header` module
//!   - Fixed-length payload via the `body` module
//!
//! # Example
//!
//! ```no_run
//! use pool_http::codec::{RequestDecoder, ResponseEncoder};
//! use tokio_util::codec::Decoder;
//! use bytes::BytesMut;
//!
//! // Decode incoming request
//! let mut decoder = RequestDecoder::new();
//! let mut request_buffer = BytesMut::new();
//! let request = decoder.decode(&mut request_buffer);
//!
//! // Encode outgoing response
//! let mut encoder = ResponseEncoder::new();
//! let mut response_buffer = BytesMut::new();
//! // ... encode response ...
//! ```

mod body;
mod header;
mod request_decoder;
mod response_encoder;

pub use body::READ_CHUNK_SIZE;
pub use header::DEFAULT_MAX_HEAD_BYTES;
pub use request_decoder::RequestDecoder;
pub use response_encoder::ResponseEncoder;
