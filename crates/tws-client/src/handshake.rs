//! Version negotiation.
//!
//! The client sends `"API\0"` plus the version range it speaks; the
//! terminal answers with a two-field frame `<version>\0<connection time>\0`.
//! Some terminals push an unrelated frame first, so anything that is not
//! exactly two fields is skipped.

use tracing::debug;

use tws_core::server_versions::{MAX_CLIENT_VER, MIN_CLIENT_VER};
use tws_protocol::field_codec::read_fields;
use tws_protocol::framing::{make_initial_msg, version_range_text};
use tws_protocol::ProtocolError;

use crate::error::ClientError;
use crate::transport::{FrameReader, FrameWriter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeReply {
    /// Zero when the terminal sent something that is not a number.
    pub server_version: i32,
    pub connection_time: String,
}

/// Send the hello and wait for the reply.
///
/// `Ok(None)` means the terminal closed the connection before replying.
pub async fn perform(
    reader: &mut FrameReader,
    writer: &mut FrameWriter,
    connect_options: &str,
) -> Result<Option<HandshakeReply>, ClientError> {
    let text = version_range_text(MIN_CLIENT_VER, MAX_CLIENT_VER, connect_options);
    writer.send(&make_initial_msg(&text)?).await?;
    debug!("Sent handshake hello {:?}", text);

    loop {
        let Some(frame) = reader.read_frame().await? else {
            return Ok(None);
        };
        if frame.is_oversized() {
            return Err(ProtocolError::FrameTooLarge(frame.declared_len).into());
        }

        let fields = read_fields(&frame.payload);
        if fields.len() != 2 {
            debug!("Skipping {}-field frame while waiting for handshake reply", fields.len());
            continue;
        }

        let server_version = fields[0].trim().parse::<i32>().unwrap_or(0);
        return Ok(Some(HandshakeReply {
            server_version,
            connection_time: fields[1].clone(),
        }));
    }
}
