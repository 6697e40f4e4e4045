// crates/tws-protocol/tests/frame_roundtrip.rs
use tws_core::messages::outgoing;
use tws_core::server_versions::{MAX_CLIENT_VER, MIN_CLIENT_VER, PROTOBUF};
use tws_core::{ExecutionFilter, OrderCancel};
use tws_protocol::framing::{make_frame, make_initial_msg, read_msg, version_range_text};
use tws_protocol::proto;
use tws_protocol::wire_types::{MAX_MSG_LEN, HEADER_LEN};
use tws_protocol::{FieldReader, FrameCodec, FrameStatus, Inbound, ProtocolError, RequestLayout};

fn payload_of(frame: &[u8]) -> &[u8] {
    match read_msg(frame) {
        FrameStatus::Complete { payload, consumed } => {
            assert_eq!(consumed, frame.len());
            payload
        }
        other => panic!("expected a complete frame, got {:?}", other),
    }
}

#[test]
fn handshake_hello_layout() {
    let text = version_range_text(MIN_CLIENT_VER, MAX_CLIENT_VER, "");
    assert_eq!(text, "v100..203");
    assert_eq!(version_range_text(100, 203, "+PACEAPI"), "v100..203 +PACEAPI");

    let hello = make_initial_msg(&text).unwrap();
    assert_eq!(&hello[..4], b"API\0");
    assert_eq!(&hello[4..8], &(text.len() as u32).to_be_bytes());
    assert_eq!(&hello[8..], text.as_bytes());
}

#[test]
fn legacy_fields_round_trip_with_text_and_raw_ids() {
    let fields = vec!["1", "9001", "", "AAPL", "-3", "0.25"];

    for version in [MIN_CLIENT_VER, PROTOBUF - 1, PROTOBUF, MAX_CLIENT_VER] {
        let codec = FrameCodec::new(version);
        let layout = RequestLayout::new(outgoing::REQ_ACCOUNT_SUMMARY)
            .extend(tws_protocol::Gate::Always, fields.iter().copied());

        let frame = codec.encode_legacy(&layout).unwrap();
        let payload = payload_of(&frame);
        if version >= PROTOBUF {
            assert_eq!(&payload[..4], &62u32.to_be_bytes());
        } else {
            assert!(payload.starts_with(b"62\0"));
        }

        match codec.decode(payload).unwrap() {
            Inbound::Legacy { message_id, fields: decoded } => {
                assert_eq!(message_id, outgoing::REQ_ACCOUNT_SUMMARY);
                assert_eq!(decoded, fields);
            }
            other => panic!("expected legacy, got {:?}", other),
        }
    }
}

#[test]
fn protobuf_body_round_trips_and_keeps_unset_fields_unset() {
    let codec = FrameCodec::new(MAX_CLIENT_VER);
    let filter = ExecutionFilter {
        client_id: 3,
        symbol: "MSFT".into(),
        last_n_days: Some(2),
        ..ExecutionFilter::default()
    };
    let request = proto::execution_request(77, &filter);
    let frame = codec
        .encode_protobuf(outgoing::REQ_EXECUTIONS, &request)
        .unwrap();
    let payload = payload_of(&frame);
    assert_eq!(&payload[..4], &207u32.to_be_bytes());

    let (message_id, body) = match codec.decode(payload).unwrap() {
        Inbound::Protobuf { message_id, body } => (message_id, body),
        other => panic!("expected protobuf, got {:?}", other),
    };
    assert_eq!(message_id, outgoing::REQ_EXECUTIONS);

    let decoded: proto::ExecutionRequest = FrameCodec::decode_protobuf(&body).unwrap();
    assert_eq!(decoded, request);
    let f = decoded.execution_filter.unwrap();
    assert_eq!(f.symbol.as_deref(), Some("MSFT"));
    assert_eq!(f.acct_code, None);
    assert_eq!(f.last_n_days, Some(2));
}

#[test]
fn empty_cancel_attributes_are_not_sent() {
    let req = proto::cancel_order_request(5, &OrderCancel::default());
    assert_eq!(req.order_id, Some(5));
    assert!(req.order_cancel.is_none());

    let cancel = OrderCancel {
        manual_order_indicator: Some(1),
        ..OrderCancel::default()
    };
    let req = proto::global_cancel_request(&cancel);
    let oc = req.order_cancel.unwrap();
    assert_eq!(oc.manual_order_indicator, Some(1));
    assert_eq!(oc.ext_operator, None);
}

#[test]
fn format_selection_follows_the_protobuf_table() {
    let old = FrameCodec::new(PROTOBUF - 1);
    let pb = FrameCodec::new(PROTOBUF);
    let latest = FrameCodec::new(MAX_CLIENT_VER);

    assert!(!old.uses_protobuf(outgoing::REQ_EXECUTIONS));
    assert!(pb.uses_protobuf(outgoing::REQ_EXECUTIONS));
    assert!(!pb.uses_protobuf(outgoing::CANCEL_ORDER));
    assert!(latest.uses_protobuf(outgoing::CANCEL_ORDER));
    assert!(!latest.uses_protobuf(outgoing::REQ_MKT_DATA));
}

#[test]
fn read_msg_waits_for_full_frame_and_flags_oversize() {
    let frame = make_frame(b"4\0").unwrap();
    assert_eq!(read_msg(&frame[..HEADER_LEN + 1]), FrameStatus::Incomplete);
    assert_eq!(read_msg(&frame[..2]), FrameStatus::Incomplete);

    let mut two = frame.clone();
    two.extend_from_slice(&frame);
    match read_msg(&two) {
        FrameStatus::Complete { payload, consumed } => {
            assert_eq!(payload, b"4\0");
            assert_eq!(consumed, frame.len());
        }
        other => panic!("unexpected {:?}", other),
    }

    let header = ((MAX_MSG_LEN + 1) as u32).to_be_bytes();
    assert_eq!(read_msg(&header), FrameStatus::Oversized(MAX_MSG_LEN + 1));
}

#[test]
fn oversized_payload_is_never_framed() {
    let big = vec![b'a'; MAX_MSG_LEN + 1];
    assert!(matches!(
        make_frame(&big),
        Err(ProtocolError::FrameTooLarge(n)) if n == MAX_MSG_LEN + 1
    ));
}

#[test]
fn malformed_ids_are_reported() {
    let codec = FrameCodec::new(MIN_CLIENT_VER);
    assert!(matches!(
        codec.decode(b"abc\x001\0"),
        Err(ProtocolError::BadMessageId(ref s)) if s == "abc"
    ));
    assert!(matches!(codec.decode(b"12"), Err(ProtocolError::Truncated)));

    let raw = FrameCodec::new(PROTOBUF);
    assert!(matches!(raw.decode(&[0, 0]), Err(ProtocolError::Truncated)));
}

#[test]
fn field_splitting_drops_only_the_final_terminator() {
    assert!(framing_fields(b"").is_empty());
    assert_eq!(framing_fields(b"\0"), vec![""]);
    assert_eq!(framing_fields(b"a\0\0b\0"), vec!["a", "", "b"]);
    assert_eq!(framing_fields(b"a\0b"), vec!["a", "b"]);
}

fn framing_fields(raw: &[u8]) -> Vec<String> {
    tws_protocol::field_codec::read_fields(raw)
}

#[test]
fn field_reader_treats_empty_numbers_as_zero() {
    let fields: Vec<String> = ["", "12", "x", "1.25", "1"].iter().map(|s| s.to_string()).collect();
    let mut r = FieldReader::new(&fields);
    assert_eq!(r.read_int().unwrap(), 0);
    assert_eq!(r.read_long().unwrap(), 12);
    assert!(matches!(r.read_int(), Err(ProtocolError::InvalidField("int"))));
    assert_eq!(r.read_double().unwrap(), 1.25);
    assert!(r.read_bool().unwrap());
    assert_eq!(r.remaining(), 0);
    assert!(matches!(r.read_str(), Err(ProtocolError::Truncated)));
}
