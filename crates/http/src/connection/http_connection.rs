use std::fmt;

use bytes::{Bytes, BytesMut};
use futures::{SinkExt, StreamExt};
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Version};
use mime::Mime;
use tokio::io::{AsyncRead, AsyncWrite, ReadHalf, WriteHalf};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, error, info, warn};

use crate::codec::{DEFAULT_MAX_HEAD_BYTES, RequestDecoder, ResponseEncoder};
use crate::protocol::{
    ConnectionError, Content, Message, ParseError, PayloadItem, PayloadSize, RequestHead, ResponseHead, SendError,
};

const READ_BUFFER_SIZE: usize = 8 * 1024;

const MISSING_HOST: &str = "Host header is missing";
const INVALID_CONTENT_LENGTH: &str = "Invalid Content-Length header";
const SHORT_READ: &str = "Short read";
const HEADER_TOO_LARGE: &str = "Request header too large";

/// A bidirectional byte stream a connection can be served on.
pub trait AsyncIo: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T> AsyncIo for T where T: AsyncRead + AsyncWrite + Send + Unpin {}

/// An owned, type-erased stream, moved whole between the acceptor, the
/// dispatcher and the worker that ends up serving it.
pub type BoxIo = Box<dyn AsyncIo>;

struct Stream {
    framed_read: FramedRead<ReadHalf<BoxIo>, RequestDecoder>,
    framed_write: FramedWrite<WriteHalf<BoxIo>, ResponseEncoder>,
}

/// One HTTP request and the response built for it.
///
/// A `Connection` is opened on a freshly accepted stream: it reads the request
/// head right away, but reads the body only when [`Connection::content`] is
/// called. The response is buffered through [`Connection::status`],
/// [`Connection::set_header`] and [`Connection::write`], and framed with an
/// exact `Content-Length` by one of the `send` methods.
///
/// Once closed, the connection permits no further I/O: `send` and `content`
/// fail with [`ConnectionError::Closed`] and `close` is a no-op.
pub struct Connection {
    stream: Option<Stream>,
    head: Option<RequestHead>,
    addr: String,
    status: StatusCode,
    response_headers: HeaderMap,
    body_chunks: Vec<Bytes>,
    body_consumed: bool,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("head", &self.head)
            .field("addr", &self.addr)
            .field("status", &self.status)
            .field("closed", &self.stream.is_none())
            .finish_non_exhaustive()
    }
}

impl Connection {
    /// Reads the request head from `io` with the default head size limit.
    ///
    /// See [`Connection::open_with_limit`].
    pub async fn open(io: BoxIo, addr: impl Into<String>) -> Result<Self, ParseError> {
        Self::open_with_limit(io, addr, DEFAULT_MAX_HEAD_BYTES).await
    }

    /// Reads the request head from `io`.
    ///
    /// Request-level failures still produce a `Connection`, already closed:
    /// - an unparseable request line is logged and the stream dropped without a
    ///   response, the connection stays uninitialized
    /// - a head over `max_head_bytes` is answered with 400
    /// - a head without `Host` is answered with 400 `Host header is missing`
    ///
    /// # Errors
    ///
    /// Returns an error when the head can not be read at all: the stream failed,
    /// ended early, or carried an invalid header line. Nothing is written back.
    pub async fn open_with_limit(io: BoxIo, addr: impl Into<String>, max_head_bytes: usize) -> Result<Self, ParseError> {
        let (reader, writer) = tokio::io::split(io);
        let mut connection = Self {
            stream: Some(Stream {
                framed_read: FramedRead::with_capacity(
                    reader,
                    RequestDecoder::with_max_head_bytes(max_head_bytes),
                    READ_BUFFER_SIZE,
                ),
                framed_write: FramedWrite::new(writer, ResponseEncoder::new()),
            }),
            head: None,
            addr: addr.into(),
            status: StatusCode::OK,
            response_headers: HeaderMap::new(),
            body_chunks: Vec::new(),
            body_consumed: false,
        };

        let message = match &mut connection.stream {
            Some(stream) => stream.framed_read.next().await,
            None => None,
        };

        match message {
            Some(Ok(Message::Header(head))) => {
                let has_host = head.has_host();
                connection.head = Some(head);
                if !has_host {
                    connection.reject(StatusCode::BAD_REQUEST, MISSING_HOST).await;
                }
                Ok(connection)
            }
            Some(Ok(Message::Payload(_))) => Err(ParseError::IncompleteHead),
            Some(Err(ParseError::MalformedRequestLine { line })) => {
                info!(addr = %connection.addr, line = %line, "invalid http request line");
                connection.close().await;
                Ok(connection)
            }
            Some(Err(e @ ParseError::TooLargeHeader { .. })) => {
                warn!(addr = %connection.addr, cause = %e, "reject request");
                connection.reject(StatusCode::BAD_REQUEST, HEADER_TOO_LARGE).await;
                Ok(connection)
            }
            Some(Err(e)) => Err(e),
            None => Err(ParseError::IncompleteHead),
        }
    }

    fn head_or_err(&self) -> Result<&RequestHead, ConnectionError> {
        self.head.as_ref().ok_or(ConnectionError::Uninitialized)
    }

    /// The parsed request head, `None` when the request line was malformed.
    pub fn head(&self) -> Option<&RequestHead> {
        self.head.as_ref()
    }

    pub fn url(&self) -> Result<&str, ConnectionError> {
        self.head_or_err().map(RequestHead::url)
    }

    pub fn method(&self) -> Result<&Method, ConnectionError> {
        self.head_or_err().map(RequestHead::method)
    }

    pub fn version(&self) -> Result<Version, ConnectionError> {
        self.head_or_err().map(RequestHead::version)
    }

    pub fn headers(&self) -> Result<&HeaderMap, ConnectionError> {
        self.head_or_err().map(RequestHead::headers)
    }

    /// The peer's address, as handed over by the acceptor.
    pub fn addr(&self) -> Result<&str, ConnectionError> {
        self.head_or_err().map(|_| self.addr.as_str())
    }

    /// Whether the underlying stream is still open for I/O.
    pub fn is_reuseable(&self) -> bool {
        self.stream.is_some()
    }

    /// Whether [`Connection::content`] drained the request body.
    ///
    /// Informational only: a response always closes the connection.
    pub fn body_consumed(&self) -> bool {
        self.body_consumed
    }

    /// Reads the request body.
    ///
    /// With `Content-Length`, exactly that many bytes are read. Without it the
    /// body runs until the peer ends the stream; an empty binary body is then
    /// returned as `None`. `text/*` bodies come back as [`Content::Text`].
    ///
    /// An invalid `Content-Length`, or a stream ending before the declared
    /// length, is answered with 400 and closes the connection; `Ok(None)` is
    /// returned in that case.
    ///
    /// # Errors
    ///
    /// [`ConnectionError::Uninitialized`] or [`ConnectionError::Closed`] when
    /// there is nothing to read from.
    pub async fn content(&mut self) -> Result<Option<Content>, ConnectionError> {
        let head = self.head_or_err()?;
        if self.stream.is_none() {
            return Err(ConnectionError::Closed);
        }

        let is_text = head.is_text();
        let payload_size = match head.payload_size() {
            Ok(payload_size) => payload_size,
            Err(e) => {
                warn!(cause = %e, "reject request body");
                self.reject(StatusCode::BAD_REQUEST, INVALID_CONTENT_LENGTH).await;
                return Ok(None);
            }
        };

        let body = match self.read_payload(payload_size).await {
            Ok(body) => body,
            Err(e) => {
                warn!(cause = %e, "reject request body");
                self.reject(StatusCode::BAD_REQUEST, SHORT_READ).await;
                return Ok(None);
            }
        };

        self.body_consumed = true;
        if body.is_empty() && payload_size.is_until_eof() && !is_text {
            return Ok(None);
        }
        Ok(Some(Content::decode(body.freeze(), is_text)))
    }

    async fn read_payload(&mut self, payload_size: PayloadSize) -> Result<BytesMut, ParseError> {
        let Some(stream) = &mut self.stream else {
            return Err(ParseError::IncompleteHead);
        };

        stream.framed_read.decoder_mut().expect_payload(payload_size);

        let mut body = BytesMut::new();
        loop {
            match stream.framed_read.next().await {
                Some(Ok(Message::Payload(PayloadItem::Chunk(bytes)))) => body.extend_from_slice(&bytes),
                Some(Ok(Message::Payload(PayloadItem::Eof))) | None => break,
                Some(Ok(Message::Header(_))) => {
                    error!("receive request head while reading payload");
                    break;
                }
                Some(Err(e)) => {
                    debug!(cause = %e, "stop reading payload");
                    break;
                }
            }
        }

        if let Some(expected) = payload_size.length() {
            let actual = body.len() as u64;
            if actual < expected {
                return Err(ParseError::short_read(expected, actual));
            }
        }

        Ok(body)
    }

    /// Sets a response header, replacing any previous value of the same name.
    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) -> &mut Self {
        self.response_headers.insert(name, value);
        self
    }

    /// Sets the response status, 200 unless called.
    pub fn status(&mut self, status: StatusCode) -> &mut Self {
        self.status = status;
        self
    }

    /// Buffers one body segment. Text is buffered as its UTF-8 bytes.
    pub fn write(&mut self, content: impl Into<Bytes>) -> &mut Self {
        self.body_chunks.push(content.into());
        self
    }

    /// Drops the buffered status, headers and body segments.
    pub fn reset(&mut self) -> &mut Self {
        self.status = StatusCode::OK;
        self.response_headers.clear();
        self.body_chunks.clear();
        self
    }

    /// Sends `content` after any buffered segments as `text/plain`.
    pub async fn send(&mut self, content: impl Into<Bytes>) -> Result<(), ConnectionError> {
        self.do_send(Some(content.into()), &mime::TEXT_PLAIN).await
    }

    /// Sends `content` after any buffered segments with the given content type.
    pub async fn send_as(&mut self, content: impl Into<Bytes>, content_type: &Mime) -> Result<(), ConnectionError> {
        self.do_send(Some(content.into()), content_type).await
    }

    /// Sends only the buffered segments with the given content type.
    pub async fn send_buffered(&mut self, content_type: &Mime) -> Result<(), ConnectionError> {
        self.do_send(None, content_type).await
    }

    async fn do_send(&mut self, content: Option<Bytes>, content_type: &Mime) -> Result<(), ConnectionError> {
        self.head_or_err()?;
        self.respond(content, content_type).await
    }

    /// Writes the response and closes the connection, whatever the outcome.
    async fn respond(&mut self, content: Option<Bytes>, content_type: &Mime) -> Result<(), ConnectionError> {
        if self.stream.is_none() {
            return Err(ConnectionError::Closed);
        }

        let result = self.write_response(content, content_type).await;
        if let Some(head) = &self.head {
            info!(method = %head.method(), url = %head.url(), status = self.status.as_u16(), "response sent");
        }
        self.close().await;
        result
    }

    async fn write_response(&mut self, content: Option<Bytes>, content_type: &Mime) -> Result<(), ConnectionError> {
        let content_type =
            HeaderValue::from_str(content_type.as_ref()).map_err(|_| SendError::invalid_body("invalid content type"))?;
        self.response_headers.insert(CONTENT_TYPE, content_type);
        if let Some(content) = content {
            self.body_chunks.push(content);
        }

        let content_length: u64 = self.body_chunks.iter().map(|chunk| chunk.len() as u64).sum();
        let head = ResponseHead::new(self.status, std::mem::take(&mut self.response_headers));

        let Some(stream) = &mut self.stream else {
            return Err(ConnectionError::Closed);
        };

        stream.framed_write.feed(Message::<_, Bytes>::Header((head, content_length))).await?;
        for chunk in self.body_chunks.drain(..) {
            stream.framed_write.feed(Message::Payload(PayloadItem::Chunk(chunk))).await?;
        }
        // using send instead of feed, because we want to flush the underlying IO
        stream.framed_write.send(Message::Payload(PayloadItem::<Bytes>::Eof)).await?;
        Ok(())
    }

    /// Answers the request with a plain text error and closes the connection.
    async fn reject(&mut self, status: StatusCode, message: &'static str) {
        self.reset().status(status);
        if let Err(e) = self.respond(Some(Bytes::from_static(message.as_bytes())), &mime::TEXT_PLAIN).await {
            warn!(addr = %self.addr, cause = %e, "failed to send error response");
        }
    }

    /// Flushes and releases the underlying stream. Calling it again is a no-op.
    pub async fn close(&mut self) {
        let Some(mut stream) = self.stream.take() else {
            return;
        };

        if let Err(e) = SinkExt::<Message<(ResponseHead, u64)>>::close(&mut stream.framed_write).await {
            debug!(addr = %self.addr, cause = %e, "error while closing connection");
        }
    }
}

/// Writes a complete plain text response to `io`, then closes it.
///
/// Used for connections that are turned away before any worker sees them.
pub async fn respond_and_close(io: BoxIo, status: StatusCode, message: &'static str) -> Result<(), SendError> {
    let mut framed_write = FramedWrite::new(io, ResponseEncoder::new());

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    let head = ResponseHead::new(status, headers);
    let body = Bytes::from_static(message.as_bytes());

    framed_write.feed(Message::<_, Bytes>::Header((head, body.len() as u64))).await?;
    framed_write.feed(Message::Payload(PayloadItem::Chunk(body))).await?;
    framed_write.send(Message::Payload(PayloadItem::<Bytes>::Eof)).await?;
    SinkExt::<Message<(ResponseHead, u64)>>::close(&mut framed_write).await
}
