//! Wire-level errors
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RespError {
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid RESP data: {0}")]
    Decode(String),

    #[error("connection closed by server")]
    ConnectionClosed,

    #[error("operation cancelled")]
    Cancelled,
}
