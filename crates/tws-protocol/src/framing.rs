//! Framing.
//!
//! ```text
//! Handshake hello (client → terminal, sent once)
//! ----------------------------------------------
//! [0..4]   : "API\0"
//! [4..8]   : payload length (u32 BE)
//! [8..]    : "v<min>..<max>[ <connect options>]"
//!
//! Every other frame, both directions
//! ----------------------------------
//! [0..4]   : payload length (u32 BE, at most MAX_MSG_LEN)
//! [4..]    : payload
//! ```
//!
//! The payload layout (text id or raw id, fields or protobuf) is decided by
//! [`crate::codec::FrameCodec`]; this module only deals with the prefix.

use bytes::BufMut;

use crate::wire_types::{ProtocolError, API_SIGN, HEADER_LEN, MAX_MSG_LEN};

/// Version range offered during the handshake.
pub fn version_range_text(min: i32, max: i32, connect_options: &str) -> String {
    if connect_options.is_empty() {
        format!("v{}..{}", min, max)
    } else {
        format!("v{}..{} {}", min, max, connect_options)
    }
}

/// `"API\0"` followed by the length-prefixed version text.
pub fn make_initial_msg(version_text: &str) -> Result<Vec<u8>, ProtocolError> {
    let body = version_text.as_bytes();
    let mut out = Vec::with_capacity(API_SIGN.len() + HEADER_LEN + body.len());
    out.extend_from_slice(API_SIGN);
    put_frame(&mut out, body)?;
    Ok(out)
}

/// Prefix `payload` with its length.
pub fn make_frame(payload: &[u8]) -> Result<Vec<u8>, ProtocolError> {
    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    put_frame(&mut out, payload)?;
    Ok(out)
}

fn put_frame(out: &mut Vec<u8>, payload: &[u8]) -> Result<(), ProtocolError> {
    if payload.len() > MAX_MSG_LEN {
        return Err(ProtocolError::FrameTooLarge(payload.len()));
    }
    out.put_u32(payload.len() as u32);
    out.extend_from_slice(payload);
    Ok(())
}

/// Result of looking for one frame at the front of a buffer.
#[derive(Debug, PartialEq, Eq)]
pub enum FrameStatus<'a> {
    /// Not enough bytes yet.
    Incomplete,
    /// One full frame; `consumed` includes the header.
    Complete { payload: &'a [u8], consumed: usize },
    /// The header declares more than [`MAX_MSG_LEN`]. Nothing after the
    /// header can be trusted.
    Oversized(usize),
}

/// Split one frame off the front of `buf` without copying.
pub fn read_msg(buf: &[u8]) -> FrameStatus<'_> {
    if buf.len() < HEADER_LEN {
        return FrameStatus::Incomplete;
    }

    let declared = read_u32_be(&buf[..HEADER_LEN]) as usize;
    if declared > MAX_MSG_LEN {
        return FrameStatus::Oversized(declared);
    }

    let end = HEADER_LEN + declared;
    if buf.len() < end {
        return FrameStatus::Incomplete;
    }

    FrameStatus::Complete {
        payload: &buf[HEADER_LEN..end],
        consumed: end,
    }
}

#[inline]
pub(crate) fn read_u32_be(b: &[u8]) -> u32 {
    u32::from_be_bytes([b[0], b[1], b[2], b[3]])
}
