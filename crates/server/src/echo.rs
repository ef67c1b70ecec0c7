use async_trait::async_trait;
use http::header::CONTENT_LENGTH;
use pool_http::connection::Connection;
use pool_http::handler::{BoxError, Handler};
use pool_http::protocol::Content;
use tracing::debug;

/// Answers every request with a summary of its request line, followed by the
/// request body when it declared a `Content-Length`.
#[derive(Debug)]
pub struct Echo;

#[async_trait]
impl Handler for Echo {
    async fn handle(&self, connection: &mut Connection) -> Result<(), BoxError> {
        let summary = format!(
            "{} {} {:?} from {}\r\n",
            connection.method()?,
            connection.url()?,
            connection.version()?,
            connection.addr()?
        );

        // reading until end of stream would stall on clients that keep writing open
        let content = if connection.headers()?.contains_key(CONTENT_LENGTH) { connection.content().await? } else { None };

        if !connection.is_reuseable() {
            debug!("request body rejected, nothing left to answer");
            return Ok(());
        }

        connection.write(summary);
        match content {
            Some(Content::Text(text)) => connection.send(text).await?,
            Some(Content::Binary(bytes)) => connection.send_as(bytes, &mime::APPLICATION_OCTET_STREAM).await?,
            None => connection.send_buffered(&mime::TEXT_PLAIN).await?,
        }
        Ok(())
    }
}
