//! HTTP response head handling implementation.
//!
//! The reason phrases come from a fixed table; any status outside of it is
//! written as `Unknown Error`.

use http::{HeaderMap, StatusCode};

const UNKNOWN_REASON: &str = "Unknown Error";

/// Status line and headers of a response, before the body is attached.
#[derive(Debug, Clone, Default)]
pub struct ResponseHead {
    status: StatusCode,
    headers: HeaderMap,
}

impl ResponseHead {
    pub fn new(status: StatusCode, headers: HeaderMap) -> Self {
        Self { status, headers }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

/// Returns the reason phrase written on the status line for `status`.
pub fn reason_phrase(status: StatusCode) -> &'static str {
    match status.as_u16() {
        100 => "Continue",
        200 => "OK",
        206 => "Partial Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        505 => "HTTP Version not supported",
        _ => UNKNOWN_REASON,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_reasons() {
        assert_eq!(reason_phrase(StatusCode::OK), "OK");
        assert_eq!(reason_phrase(StatusCode::TOO_MANY_REQUESTS), "Too Many Requests");
        assert_eq!(reason_phrase(StatusCode::HTTP_VERSION_NOT_SUPPORTED), "HTTP Version not supported");
    }

    #[test]
    fn unknown_reason_fallback() {
        assert_eq!(reason_phrase(StatusCode::IM_A_TEAPOT), "Unknown Error");
        assert_eq!(reason_phrase(StatusCode::from_u16(599).unwrap()), "Unknown Error");
    }
}
