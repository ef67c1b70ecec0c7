use std::io;

use pool_http::protocol::DispatchError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid listen address {0:?}, expect tcp:<port> or uds:<path>")]
    InvalidListen(String),

    #[error("failed to bind {target}: {source}")]
    Bind {
        target: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to install signal handler: {0}")]
    Signal(#[source] io::Error),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl ServerError {
    pub fn bind<T: ToString>(target: T, source: io::Error) -> Self {
        Self::Bind { target: target.to_string(), source }
    }
}
