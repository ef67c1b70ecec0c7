//! HTTP connection handling module
//!
//! # Components
//!
//! - [`Connection`]: the per-request protocol object that:
//!   - Parses the request line and headers on open
//!   - Reads the request body lazily
//!   - Buffers the response and frames it with an exact `Content-Length`
//!   - Closes the stream after the response
//!
//! - [`BoxIo`]: the owned stream type that is moved between execution contexts
//!
//! Keep-alive and pipelining are not supported: one connection carries one
//! request and one response.

mod http_connection;

pub use http_connection::AsyncIo;
pub use http_connection::BoxIo;
pub use http_connection::Connection;
pub use http_connection::respond_and_close;
