// src/core/commands/helpers.rs

//! Small parsing helpers shared by the command implementations.

use crate::core::OpalDBError;
use crate::core::protocol::RespFrame;
use bytes::Bytes;

/// Extracts the payload of a bulk-string argument. Clients encode every
/// request token as a bulk string; anything else is a type error.
pub(crate) fn extract_bytes(frame: &RespFrame) -> Result<Bytes, OpalDBError> {
    match frame {
        RespFrame::BulkString(b) => Ok(b.clone()),
        _ => Err(OpalDBError::WrongType),
    }
}

/// Validates an exact argument count and extracts every argument as bytes.
pub(crate) fn extract_exact_args(
    args: &[RespFrame],
    count: usize,
    command_name: &str,
) -> Result<Vec<Bytes>, OpalDBError> {
    if args.len() != count {
        return Err(OpalDBError::WrongArgumentCount(command_name.to_string()));
    }
    args.iter().map(extract_bytes).collect()
}
