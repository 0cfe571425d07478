// src/core/protocol/resp_frame.rs

//! Implements the RESP (REdis Serialization Protocol) frame structure and the
//! corresponding `Encoder` and `Decoder` for network communication. The same
//! codec frames both directions of the wire and the records of the
//! append-only file.

use crate::core::OpalDBError;
use bytes::{Buf, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

/// The CRLF (Carriage Return, Line Feed) sequence used to terminate lines in RESP.
const CRLF: &[u8] = b"\r\n";
const CRLF_LEN: usize = 2;

// Protocol-level limits to keep adversarial input from forcing huge
// allocations or unbounded parser recursion.
const MAX_FRAME_ELEMENTS: usize = 1024 * 1024;
const MAX_BULK_STRING_SIZE: usize = 512 * 1024 * 1024;
const MAX_RECURSION_DEPTH: usize = 64;

/// A single frame of the wire protocol. Frames are immutable once constructed
/// and fully self-describing.
///
/// A client request is always an `Array` of `BulkString`s whose first element
/// is the command name; responses may be any variant.
#[derive(Debug, Clone, PartialEq)]
pub enum RespFrame {
    SimpleString(String),
    Error(String),
    BulkString(Bytes),
    Array(Vec<RespFrame>),
    Null,
}

impl RespFrame {
    /// Encodes the frame into a standalone `Vec<u8>`. Used by the persistence
    /// log, which appends complete byte records rather than streaming into a
    /// connection buffer.
    pub fn encode_to_vec(&self) -> Result<Vec<u8>, OpalDBError> {
        let mut buf = BytesMut::new();
        RespFrameCodec.encode(self.clone(), &mut buf)?;
        Ok(buf.to_vec())
    }
}

/// A `tokio_util::codec` implementation for encoding and decoding `RespFrame`s.
///
/// The codec validates framing only; command semantics are checked by the
/// dispatch layer.
#[derive(Debug)]
pub struct RespFrameCodec;

impl Encoder<RespFrame> for RespFrameCodec {
    type Error = OpalDBError;

    fn encode(&mut self, item: RespFrame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            RespFrame::SimpleString(s) => {
                dst.extend_from_slice(b"+");
                dst.extend_from_slice(s.as_bytes());
                dst.extend_from_slice(CRLF);
            }
            RespFrame::Error(s) => {
                dst.extend_from_slice(b"-");
                dst.extend_from_slice(s.as_bytes());
                dst.extend_from_slice(CRLF);
            }
            RespFrame::BulkString(b) => {
                dst.extend_from_slice(b"$");
                dst.extend_from_slice(b.len().to_string().as_bytes());
                dst.extend_from_slice(CRLF);
                dst.extend_from_slice(&b);
                dst.extend_from_slice(CRLF);
            }
            RespFrame::Null => {
                dst.extend_from_slice(b"$-1\r\n");
            }
            RespFrame::Array(arr) => {
                dst.extend_from_slice(b"*");
                dst.extend_from_slice(arr.len().to_string().as_bytes());
                dst.extend_from_slice(CRLF);
                for frame in arr {
                    self.encode(frame, dst)?;
                }
            }
        }
        Ok(())
    }
}

impl Decoder for RespFrameCodec {
    type Item = RespFrame;
    type Error = OpalDBError;

    /// Decodes one `RespFrame` from the buffer. Returns `Ok(None)` when the
    /// buffer holds only a prefix of a frame (more bytes are needed); any
    /// other error is a real framing failure.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }

        let mut bytes = &src[..];
        match decode_frame(&mut bytes, 0) {
            Ok(frame) => {
                let consumed = src.len() - bytes.len();
                src.advance(consumed);
                Ok(Some(frame))
            }
            Err(OpalDBError::IncompleteData) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Recursive-descent frame parser. `bytes` is advanced past everything that
/// was consumed; on error the caller discards the cursor, so partial advances
/// are harmless.
fn decode_frame(bytes: &mut &[u8], depth: usize) -> Result<RespFrame, OpalDBError> {
    if depth > MAX_RECURSION_DEPTH {
        return Err(OpalDBError::SyntaxError(
            "nesting depth limit exceeded".to_string(),
        ));
    }

    let Some(&type_byte) = bytes.first() else {
        return Err(OpalDBError::IncompleteData);
    };
    *bytes = &bytes[1..];

    match type_byte {
        b'+' => Ok(RespFrame::SimpleString(decode_text_line(bytes)?)),
        b'-' => Ok(RespFrame::Error(decode_text_line(bytes)?)),
        b'$' => decode_bulk_string(bytes),
        b'*' => decode_array(bytes, depth),
        other => Err(OpalDBError::SyntaxError(format!(
            "unsupported type byte '{}'",
            other as char
        ))),
    }
}

/// Returns the next CRLF-terminated line, advancing past the terminator.
fn take_line<'a>(bytes: &mut &'a [u8]) -> Result<&'a [u8], OpalDBError> {
    let Some(pos) = bytes.windows(CRLF_LEN).position(|window| window == CRLF) else {
        return Err(OpalDBError::IncompleteData);
    };
    let line = &bytes[..pos];
    *bytes = &bytes[pos + CRLF_LEN..];
    Ok(line)
}

fn decode_text_line(bytes: &mut &[u8]) -> Result<String, OpalDBError> {
    let line = take_line(bytes)?;
    Ok(String::from_utf8_lossy(line).to_string())
}

/// Parses the decimal length line of a bulk string or array. `-1` is the
/// null marker; anything else that is not a non-negative integer is a
/// framing error for the stream.
fn decode_length(bytes: &mut &[u8], max: usize) -> Result<Option<usize>, OpalDBError> {
    let line = take_line(bytes)?;
    let text = String::from_utf8_lossy(line);
    let len = text
        .parse::<isize>()
        .map_err(|_| OpalDBError::SyntaxError(format!("invalid length line '{text}'")))?;

    if len == -1 {
        return Ok(None);
    }
    if len < 0 || len as usize > max {
        return Err(OpalDBError::SyntaxError(format!(
            "length {len} out of range"
        )));
    }
    Ok(Some(len as usize))
}

/// Parses a bulk string (e.g. `$5\r\nhello\r\n`). `$-1\r\n` decodes to `Null`.
fn decode_bulk_string(bytes: &mut &[u8]) -> Result<RespFrame, OpalDBError> {
    let Some(len) = decode_length(bytes, MAX_BULK_STRING_SIZE)? else {
        return Ok(RespFrame::Null);
    };

    if bytes.len() < len + CRLF_LEN {
        return Err(OpalDBError::IncompleteData);
    }
    if &bytes[len..len + CRLF_LEN] != CRLF {
        return Err(OpalDBError::SyntaxError(
            "bulk string payload not terminated by CRLF".to_string(),
        ));
    }

    let data = Bytes::copy_from_slice(&bytes[..len]);
    *bytes = &bytes[len + CRLF_LEN..];
    Ok(RespFrame::BulkString(data))
}

/// Parses an array (e.g. `*2\r\n$3\r\nfoo\r\n$3\r\nbar\r\n`). Elements may
/// themselves be arrays, hence the depth counter.
fn decode_array(bytes: &mut &[u8], depth: usize) -> Result<RespFrame, OpalDBError> {
    let Some(count) = decode_length(bytes, MAX_FRAME_ELEMENTS)? else {
        return Ok(RespFrame::Null);
    };

    let mut frames = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        frames.push(decode_frame(bytes, depth + 1)?);
    }
    Ok(RespFrame::Array(frames))
}
