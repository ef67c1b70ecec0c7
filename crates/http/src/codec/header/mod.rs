//! HTTP head processing module for decoding requests and encoding responses
//!
//! # Components
//!
//! - [`HeaderDecoder`]: Decodes the request line and header lines from raw bytes
//!   - Line oriented, tolerant of bare `\n` line endings
//!   - Manages the head size limit
//!
//! - [`HeaderEncoder`]: Encodes the response status line and headers to bytes
//!   - Reason phrases from a fixed table
//!   - Always frames the body with `Content-Length`

mod header_decoder;
mod header_encoder;

pub use header_decoder::DEFAULT_MAX_HEAD_BYTES;
pub use header_decoder::HeaderDecoder;
pub use header_encoder::HeaderEncoder;
