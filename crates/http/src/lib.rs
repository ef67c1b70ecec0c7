//! An HTTP/1.x connection core served by a fixed pool of workers
//!
//! An acceptor hands each raw connection to a [`pool::Dispatcher`], which either
//! assigns it to a free worker or queues it. A worker reads one request into a
//! [`connection::Connection`], calls the application's [`handler::Handler`]
//! and writes exactly one response before the connection is closed.
//!
//! # Features
//!
//! - A fixed number of workers: at most N requests are in flight, the rest
//!   wait in a FIFO (unbounded, or bounded with `429 Too Many Requests`)
//! - Pool-wide reload, from a [`pool::DispatcherHandle`] or `GET /__reload__`
//! - Request bodies read lazily, by `Content-Length` or until end of stream
//! - Buffered responses framed with an exact `Content-Length`
//! - Handler errors and panics answered with `500 Internal Server Error`
//!
//! # Example
//!
//! ```no_run
//! use futures::FutureExt;
//! use pool_http::handler::{BoxError, make_handler};
//! use pool_http::pool::{Dispatcher, PoolConfig};
//! use tokio::net::TcpListener;
//! use tracing::{Level, info, warn};
//! use tracing_subscriber::FmtSubscriber;
//!
//! #[tokio::main]
//! async fn main() {
//!     let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
//!     tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
//!
//!     let handler = make_handler(|connection| {
//!         async move {
//!             let url = connection.url()?.to_string();
//!             connection.send(format!("Hello from {url}\r\n")).await?;
//!             Ok::<_, BoxError>(())
//!         }
//!         .boxed()
//!     });
//!     let (handle, _dispatcher) = Dispatcher::start(PoolConfig::default(), handler);
//!
//!     let listener = TcpListener::bind("127.0.0.1:8080").await.expect("bind server error");
//!     info!(port = 8080, "start listening");
//!     loop {
//!         let (stream, addr) = match listener.accept().await {
//!             Ok(stream_and_addr) => stream_and_addr,
//!             Err(e) => {
//!                 warn!(cause = %e, "failed to accept");
//!                 continue;
//!             }
//!         };
//!         if handle.accept(stream, addr.ip().to_string()).is_err() {
//!             break;
//!         }
//!     }
//! }
//! ```
//!
//! # Architecture
//!
//! - [`pool`]: dispatcher, worker runtime and their message protocol
//! - [`connection`]: the per-request protocol object
//! - [`codec`]: request decoding and response encoding
//! - [`protocol`]: request/response types and errors
//! - [`handler`]: the application entry point
//!
//! # Limitations
//!
//! - One request per connection: no keep-alive, no pipelining
//! - No chunked transfer encoding, HTTP/2 or TLS
//! - No timeouts: a stalled client or hung handler holds its worker until the
//!   pool is reloaded

pub mod codec;
pub mod connection;
pub mod handler;
pub mod pool;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;

#[cfg(test)]
mod test_util;
