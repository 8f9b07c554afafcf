// Errors from the relay connection.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NetError {
    #[error("could not resolve relay address '{0}'")]
    Resolve(String),
    #[error("connect to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("relay i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("relay connection is closed")]
    Closed,
}
