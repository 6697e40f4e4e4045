//! tws-protocol
//!
//! Wire-level encoding/decoding for the trading-terminal API.
//!
//! Everything here is a pure function of the negotiated version and the
//! bytes in hand; sockets live in `tws-client`.
//!
//! - [`wire_types`]  : constants and [`ProtocolError`]
//! - [`framing`]     : length prefix, handshake hello, frame splitting
//! - [`field_codec`] : NUL-delimited legacy fields and version-gated request layouts
//! - [`proto`]       : protobuf message bodies
//! - [`codec`]       : [`FrameCodec`], format selection for one connection

pub mod wire_types;
pub mod framing;
pub mod field_codec;
pub mod proto;
pub mod codec;

pub use wire_types::ProtocolError;
pub use field_codec::{Field, FieldReader, Gate, RequestLayout};
pub use codec::{FrameCodec, Inbound};
pub use framing::FrameStatus;
