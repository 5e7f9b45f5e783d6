//! Error types for MailSieve

use thiserror::Error;

/// Main error type for MailSieve
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer closed the connection (zero-length read). Surfaced
    /// explicitly so protocol code waiting for a reply is never left
    /// starving on a dead socket.
    #[error("Connection closed by peer")]
    ConnectionClosed,

    /// The server answered with something other than `+OK`. The payload
    /// is the raw status line, which is the only diagnostic POP3 gives us.
    #[error("Server error: {0}")]
    Server(String),

    #[error("Connection error: {0}")]
    Connect(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for MailSieve
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the raw server status line if this is a protocol-level
    /// failure, or None for transport-level errors.
    pub fn server_status(&self) -> Option<&str> {
        match self {
            Error::Server(status) => Some(status),
            _ => None,
        }
    }
}
