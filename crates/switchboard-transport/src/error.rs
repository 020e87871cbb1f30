use std::io;

use thiserror::Error;

/// Transport-level failures.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid line: {0}")]
    InvalidLine(String),

    #[error("failed to connect to {address}: {source}")]
    ConnectionFailed {
        address: String,
        #[source]
        source: io::Error,
    },
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;
