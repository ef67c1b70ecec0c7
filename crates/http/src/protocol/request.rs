//! HTTP request head handling implementation.
//!
//! A [`RequestHead`] is what the head decoder produces from the request line and
//! the header lines. It is immutable once built; the connection exposes it
//! through its identity accessors.

use http::header::{CONTENT_LENGTH, CONTENT_TYPE, HOST};
use http::{HeaderMap, Method, Version};

use crate::protocol::{ParseError, PayloadSize};

/// Path that asks the pool to reload all of its workers.
pub const RELOAD_PATH: &str = "/__reload__";

/// Content type assumed when the request does not declare one.
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Represents a parsed HTTP request head.
#[derive(Debug, Clone)]
pub struct RequestHead {
    method: Method,
    url: String,
    version: Version,
    headers: HeaderMap,
}

impl RequestHead {
    pub fn new(method: Method, url: String, version: Version, headers: HeaderMap) -> Self {
        Self { method, url, version, headers }
    }

    /// Returns a reference to the request's HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the raw request target, path plus query, unparsed.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the request's HTTP version.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Returns a reference to the request's headers.
    ///
    /// Names are lowercase and a repeated header keeps only its last value.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Whether a non-empty `Host` header was sent.
    pub fn has_host(&self) -> bool {
        self.headers.get(HOST).is_some_and(|value| !value.is_empty())
    }

    /// Returns the declared content type, `application/octet-stream` when absent.
    pub fn content_type(&self) -> &str {
        self.headers.get(CONTENT_TYPE).and_then(|value| value.to_str().ok()).unwrap_or(DEFAULT_CONTENT_TYPE)
    }

    /// Whether the body should be decoded as text.
    pub fn is_text(&self) -> bool {
        self.content_type().starts_with("text/")
    }

    /// Whether this is the maintenance request that triggers a pool reload.
    pub fn is_reload(&self) -> bool {
        self.method == Method::GET && self.url == RELOAD_PATH
    }

    /// Determines how the request body is delimited.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidContentLength`] when `Content-Length` is not a
    /// non-negative integer. An empty `Content-Length` counts as absent.
    pub fn payload_size(&self) -> Result<PayloadSize, ParseError> {
        let Some(cl_value) = self.headers.get(CONTENT_LENGTH).filter(|value| !value.is_empty()) else {
            return Ok(PayloadSize::UntilEof);
        };

        let cl_str = cl_value.to_str().map_err(|_| ParseError::invalid_content_length("value can't to_str"))?;
        let length =
            cl_str.trim().parse::<u64>().map_err(|_| ParseError::invalid_content_length(format!("value {cl_str} is not u64")))?;

        Ok(PayloadSize::Length(length))
    }
}
