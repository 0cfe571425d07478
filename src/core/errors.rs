// src/core/errors.rs

//! Defines the primary error type for the entire application.

use std::sync::Arc;
use thiserror::Error;

/// The main error enum, representing all possible failures within the server.
/// Using `thiserror` allows for clean error definitions and automatic `From`
/// trait implementations.
#[derive(Error, Debug)]
pub enum OpalDBError {
    #[error("IO Error: {0}")]
    Io(Arc<std::io::Error>),

    /// The codec needs more bytes before a complete frame can be decoded.
    /// Never surfaced to clients.
    #[error("Incomplete data in stream")]
    IncompleteData,

    #[error("ERR Protocol error: {0}")]
    SyntaxError(String),

    #[error("Unknown command '{0}'")]
    UnknownCommand(String),

    #[error("ERR wrong number of arguments for '{0}' command")]
    WrongArgumentCount(String),

    #[error("WRONGTYPE Operation against a key holding the wrong kind of value")]
    WrongType,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Persistence Error: {0}")]
    AofError(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

// `std::io::Error` is not cloneable, so it is wrapped in an `Arc` to keep the
// error type cheap to pass around.
impl From<std::io::Error> for OpalDBError {
    fn from(e: std::io::Error) -> Self {
        OpalDBError::Io(Arc::new(e))
    }
}
