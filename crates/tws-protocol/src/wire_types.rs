//! Low-level wire constants and the protocol error type.

use std::fmt;

/// Size of the big-endian length prefix in front of every frame.
pub const HEADER_LEN: usize = 4;

/// Size of a raw big-endian message id.
pub const RAW_INT_LEN: usize = 4;

/// Largest payload either side may send.
pub const MAX_MSG_LEN: usize = 0xFF_FFFF;

/// Literal sent before the version range during the handshake.
pub const API_SIGN: &[u8; 4] = b"API\0";

/// Field terminator of the legacy layout.
pub const FIELD_SEP: u8 = 0;

/// Errors that can arise when encoding/decoding a frame.
#[derive(Debug)]
pub enum ProtocolError {
    /// Buffer too short for the expected fields.
    Truncated,
    /// Encoded or declared frame length exceeds [`MAX_MSG_LEN`].
    FrameTooLarge(usize),
    /// A string field contains characters outside printable ASCII.
    InvalidSymbol(String),
    /// A field could not be parsed as the expected type.
    InvalidField(&'static str),
    /// The message id field is not a number.
    BadMessageId(String),
    /// A requested attribute needs a newer negotiated version.
    UpdateRequired(&'static str),
    /// Protobuf body failed to decode.
    Protobuf(prost::DecodeError),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Truncated => write!(f, "Buffer truncated"),
            ProtocolError::FrameTooLarge(len) => {
                write!(f, "Frame too large: {} bytes (max {})", len, MAX_MSG_LEN)
            }
            ProtocolError::InvalidSymbol(s) => write!(f, "Invalid symbol in string: {}", s),
            ProtocolError::InvalidField(kind) => write!(f, "Invalid field: expected {}", kind),
            ProtocolError::BadMessageId(raw) => write!(f, "Bad message id: {:?}", raw),
            ProtocolError::UpdateRequired(what) => {
                write!(f, "It does not support {}.", what)
            }
            ProtocolError::Protobuf(e) => write!(f, "Protobuf decode error: {}", e),
        }
    }
}

impl std::error::Error for ProtocolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProtocolError::Protobuf(e) => Some(e),
            _ => None,
        }
    }
}

impl From<prost::DecodeError> for ProtocolError {
    fn from(e: prost::DecodeError) -> Self {
        ProtocolError::Protobuf(e)
    }
}

/// Printable ASCII plus tab, LF and CR.
pub fn is_ascii_printable(s: &str) -> bool {
    s.bytes()
        .all(|b| (32..127).contains(&b) || b == b'\t' || b == b'\n' || b == b'\r')
}

/// `Ok(())` for printable strings, `InvalidSymbol` carrying the text otherwise.
pub fn validate_ascii(s: &str) -> Result<(), ProtocolError> {
    if is_ascii_printable(s) {
        Ok(())
    } else {
        Err(ProtocolError::InvalidSymbol(s.to_string()))
    }
}
