//! Core HTTP protocol abstractions.
//!
//! # Components
//!
//! - **Message Handling** (`message`): Core message types and payload processing
//!   - [`Message`]: Represents either a head or payload chunks
//!   - [`PayloadItem`]: Handles individual payload chunks and EOF
//!   - [`PayloadSize`]: How a request payload is delimited
//!
//! - **Request Processing** (`request`): [`RequestHead`], the immutable request line and headers
//!
//! - **Response Processing** (`response`): [`ResponseHead`] and the fixed reason-phrase table
//!
//! - **Body** (`content`): [`Content`], the text or binary request body
//!
//! - **Error Handling** (`error`):
//!   - [`ConnectionError`]: Errors of the connection contract
//!   - [`ParseError`]: Request parsing errors
//!   - [`SendError`]: Response sending errors
//!   - [`DispatchError`]: The dispatcher is gone

mod message;
pub use message::Message;
pub use message::PayloadItem;
pub use message::PayloadSize;

mod request;
pub use request::RELOAD_PATH;
pub use request::RequestHead;

mod response;
pub use response::ResponseHead;
pub use response::reason_phrase;

mod content;
pub use content::Content;

mod error;
pub use error::ConnectionError;
pub use error::DispatchError;
pub use error::ParseError;
pub use error::SendError;
