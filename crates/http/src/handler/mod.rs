//! The application side of a connection.
//!
//! A [`Handler`] receives each well-formed request as a [`Connection`] and is
//! expected to build and send the response on it. What it does in between is
//! opaque to the pool. An `Err` (or a panic) is turned into a 500 response by
//! the worker that called it.

use std::error::Error;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::connection::Connection;

pub type BoxError = Box<dyn Error + Send + Sync>;

#[async_trait]
pub trait Handler: Send + Sync + 'static {
    async fn handle(&self, connection: &mut Connection) -> Result<(), BoxError>;
}

#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

#[async_trait]
impl<F> Handler for HandlerFn<F>
where
    F: for<'a> Fn(&'a mut Connection) -> BoxFuture<'a, Result<(), BoxError>> + Send + Sync + 'static,
{
    async fn handle(&self, connection: &mut Connection) -> Result<(), BoxError> {
        (self.f)(connection).await
    }
}

/// Wraps a closure returning a boxed future into a [`Handler`].
///
/// ```no_run
/// use futures::FutureExt;
/// use pool_http::handler::{BoxError, make_handler};
///
/// let handler = make_handler(|connection| {
///     async move {
///         let url = connection.url()?.to_string();
///         connection.send(format!("you asked for {url}")).await?;
///         Ok::<_, BoxError>(())
///     }
///     .boxed()
/// });
/// ```
pub fn make_handler<F>(f: F) -> HandlerFn<F>
where
    F: for<'a> Fn(&'a mut Connection) -> BoxFuture<'a, Result<(), BoxError>> + Send + Sync + 'static,
{
    HandlerFn { f }
}
