//! Per-connection frame codec.
//!
//! A [`FrameCodec`] is created once the handshake has produced the
//! negotiated version and never changes afterwards. All layout choices are
//! made here:
//!
//! - message id as a text field (before `PROTOBUF`) or a raw `u32` (from it)
//! - legacy fields or protobuf body, chosen per message via
//!   [`tws_core::server_versions::protobuf_version`]

use bytes::BufMut;
use prost::Message;

use tws_core::messages::PROTOBUF_MSG_ID;
use tws_core::server_versions;

use crate::field_codec::{read_fields, RequestLayout};
use crate::framing::{make_frame, read_u32_be};
use crate::wire_types::{ProtocolError, FIELD_SEP, RAW_INT_LEN};

/// One decoded incoming payload, id already split off.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Legacy { message_id: i32, fields: Vec<String> },
    /// `message_id` has the protobuf offset removed.
    Protobuf { message_id: i32, body: Vec<u8> },
}

impl Inbound {
    pub fn message_id(&self) -> i32 {
        match self {
            Inbound::Legacy { message_id, .. } | Inbound::Protobuf { message_id, .. } => {
                *message_id
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameCodec {
    server_version: i32,
}

impl FrameCodec {
    pub fn new(server_version: i32) -> Self {
        Self { server_version }
    }

    pub fn server_version(&self) -> i32 {
        self.server_version
    }

    /// Message ids travel as raw big-endian integers.
    pub fn uses_raw_int_id(&self) -> bool {
        server_versions::supports(self.server_version, server_versions::PROTOBUF)
    }

    /// Whether `outgoing_id` is sent with a protobuf body.
    pub fn uses_protobuf(&self, outgoing_id: i32) -> bool {
        server_versions::protobuf_version(outgoing_id)
            .is_some_and(|v| server_versions::supports(self.server_version, v))
    }

    fn put_message_id(&self, out: &mut Vec<u8>, id: i32) {
        if self.uses_raw_int_id() {
            out.put_u32(id as u32);
        } else {
            out.extend_from_slice(id.to_string().as_bytes());
            out.push(FIELD_SEP);
        }
    }

    /// Full frame (length prefix included) for a legacy request.
    pub fn encode_legacy(&self, layout: &RequestLayout) -> Result<Vec<u8>, ProtocolError> {
        let fields = layout.encode_fields(self.server_version)?;
        let mut payload = Vec::with_capacity(RAW_INT_LEN + fields.len());
        self.put_message_id(&mut payload, layout.message_id());
        payload.extend_from_slice(&fields);
        make_frame(&payload)
    }

    /// Full frame for a protobuf request. The id is shifted by
    /// [`PROTOBUF_MSG_ID`] and always sent raw.
    pub fn encode_protobuf<M: Message>(
        &self,
        message_id: i32,
        msg: &M,
    ) -> Result<Vec<u8>, ProtocolError> {
        let mut payload = Vec::with_capacity(RAW_INT_LEN + msg.encoded_len());
        payload.put_u32((message_id + PROTOBUF_MSG_ID) as u32);
        payload.extend_from_slice(&msg.encode_to_vec());
        make_frame(&payload)
    }

    /// Split the id off one payload (length prefix already removed).
    pub fn decode(&self, payload: &[u8]) -> Result<Inbound, ProtocolError> {
        let (message_id, rest) = if self.uses_raw_int_id() {
            if payload.len() < RAW_INT_LEN {
                return Err(ProtocolError::Truncated);
            }
            (
                read_u32_be(&payload[..RAW_INT_LEN]) as i32,
                &payload[RAW_INT_LEN..],
            )
        } else {
            let end = payload
                .iter()
                .position(|b| *b == FIELD_SEP)
                .ok_or(ProtocolError::Truncated)?;
            let raw = String::from_utf8_lossy(&payload[..end]);
            let id = raw
                .parse::<i32>()
                .map_err(|_| ProtocolError::BadMessageId(raw.into_owned()))?;
            (id, &payload[end + 1..])
        };

        if message_id >= PROTOBUF_MSG_ID {
            Ok(Inbound::Protobuf {
                message_id: message_id - PROTOBUF_MSG_ID,
                body: rest.to_vec(),
            })
        } else {
            Ok(Inbound::Legacy {
                message_id,
                fields: read_fields(rest),
            })
        }
    }

    pub fn decode_protobuf<M: Message + Default>(body: &[u8]) -> Result<M, ProtocolError> {
        Ok(M::decode(body)?)
    }
}
