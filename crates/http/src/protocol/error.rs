use std::io;
use thiserror::Error;

/// Errors surfaced by the [`Connection`](crate::connection::Connection) contract.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The request line could not be parsed, so the identity fields were never set.
    #[error("the connection is not initialized normally")]
    Uninitialized,

    /// The connection was already closed and permits no further I/O.
    #[error("the connection is already closed")]
    Closed,

    #[error("request error: {source}")]
    RequestError {
        #[from]
        source: ParseError,
    },

    #[error("response error: {source}")]
    ResponseError {
        #[from]
        source: SendError,
    },
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("header size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },

    #[error("malformed request line: {line:?}")]
    MalformedRequestLine { line: String },

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },

    #[error("invalid content-length header: {reason}")]
    InvalidContentLength { reason: String },

    #[error("short read: expect {expected} bytes but read {actual}")]
    ShortRead { expected: u64, actual: u64 },

    #[error("connection closed before the request head completed")]
    IncompleteHead,

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }

    pub fn malformed_request_line<S: ToString>(line: S) -> Self {
        Self::MalformedRequestLine { line: line.to_string() }
    }

    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }

    pub fn invalid_content_length<S: ToString>(str: S) -> Self {
        Self::InvalidContentLength { reason: str.to_string() }
    }

    pub fn short_read(expected: u64, actual: u64) -> Self {
        Self::ShortRead { expected, actual }
    }
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("invalid body: {reason}")]
    InvalidBody { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn invalid_body<S: ToString>(str: S) -> Self {
        Self::InvalidBody { reason: str.to_string() }
    }
}

/// Errors returned by [`DispatcherHandle`](crate::pool::DispatcherHandle) operations.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("the dispatcher has stopped")]
    Stopped,
}
