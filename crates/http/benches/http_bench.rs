use std::hint::black_box;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use criterion::{Criterion, criterion_group, criterion_main};
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue, StatusCode};
use pool_http::codec::{RequestDecoder, ResponseEncoder};
use pool_http::connection::Connection;
use pool_http::protocol::{Message, PayloadItem, ResponseHead};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio_util::codec::{Decoder, Encoder};

const REQUEST: &[u8] = b"POST /submit?id=42 HTTP/1.1\r\nHost: localhost\r\nUser-Agent: bench\r\nAccept: */*\r\nContent-Type: text/plain\r\nContent-Length: 12\r\n\r\nHello World!";

/// Serves a fixed request and swallows the response.
struct MockIo {
    read_data: &'static [u8],
    read_pos: usize,
}

impl MockIo {
    fn new(read_data: &'static [u8]) -> Self {
        Self { read_data, read_pos: 0 }
    }
}

impl AsyncRead for MockIo {
    fn poll_read(mut self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        let remaining = &self.read_data[self.read_pos..];
        let amt = std::cmp::min(remaining.len(), buf.remaining());
        buf.put_slice(&remaining[..amt]);
        self.read_pos += amt;
        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for MockIo {
    fn poll_write(self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &[u8]) -> Poll<Result<usize, io::Error>> {
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
        Poll::Ready(Ok(()))
    }
}

fn bench_request_decoder(c: &mut Criterion) {
    c.bench_function("decode_request_head", |b| {
        b.iter(|| {
            let mut decoder = RequestDecoder::new();
            let mut bytes = BytesMut::from(REQUEST);
            black_box(decoder.decode(&mut bytes).unwrap());
        });
    });
}

fn bench_response_encoder(c: &mut Criterion) {
    let body = Bytes::from_static(b"Hello World!");
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));

    c.bench_function("encode_response", |b| {
        b.iter(|| {
            let mut encoder = ResponseEncoder::new();
            let mut bytes = BytesMut::new();
            let head = ResponseHead::new(StatusCode::OK, headers.clone());
            encoder.encode(Message::<_, Bytes>::Header((head, body.len() as u64)), &mut bytes).unwrap();
            encoder.encode(Message::Payload(PayloadItem::Chunk(body.clone())), &mut bytes).unwrap();
            encoder.encode(Message::Payload(PayloadItem::<Bytes>::Eof), &mut bytes).unwrap();
            black_box(bytes);
        });
    });
}

fn bench_connection(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();

    c.bench_function("connection_round_trip", |b| {
        b.to_async(&runtime).iter(|| async {
            let mut connection = Connection::open(Box::new(MockIo::new(REQUEST)), "127.0.0.1").await.unwrap();
            let content = connection.content().await.unwrap();
            connection.write("echo: ");
            connection.send(content.map(Bytes::from).unwrap_or_default()).await.unwrap();
            black_box(connection.is_reuseable());
        });
    });
}

criterion_group!(benches, bench_request_decoder, bench_response_encoder, bench_connection);
criterion_main!(benches);
