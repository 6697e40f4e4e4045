// crates/tws-protocol/tests/version_gating.rs
use tws_core::server_versions::{self, CAPABILITIES};
use tws_protocol::field_codec::read_fields;
use tws_protocol::{Gate, ProtocolError, RequestLayout};

fn visible(layout: &RequestLayout, version: i32) -> Vec<String> {
    let bytes = layout.encode_fields(version).expect("encode");
    read_fields(&bytes)
}

#[test]
fn field_is_visible_from_its_gate_on() {
    for &(name, gate) in CAPABILITIES {
        let layout = RequestLayout::new(1)
            .field("head")
            .since(gate, name)
            .field("tail");

        for v in [gate - 1, gate - 10, server_versions::MIN_CLIENT_VER.min(gate - 1)] {
            assert_eq!(visible(&layout, v), vec!["head", "tail"], "{} at {}", name, v);
        }
        for v in [gate, gate + 1, server_versions::MAX_CLIENT_VER.max(gate)] {
            assert_eq!(visible(&layout, v), vec!["head", name, "tail"], "{} at {}", name, v);
        }
    }
}

#[test]
fn omitted_field_changes_the_field_count() {
    let layout = RequestLayout::new(1)
        .field(7)
        .since(server_versions::PRICE_MGMT_ALGO, "")
        .field(8);

    assert_eq!(visible(&layout, 150).len(), 2);
    assert_eq!(visible(&layout, 151), vec!["7", "", "8"]);
}

#[test]
fn best_effort_field_is_dropped_but_required_one_aborts() {
    let best_effort = RequestLayout::new(1)
        .field(42)
        .since(server_versions::PRICE_MGMT_ALGO, true);
    assert_eq!(visible(&best_effort, 150), vec!["42"]);

    let mandatory = RequestLayout::new(1)
        .require(server_versions::PRICE_MGMT_ALGO, true, "price management algo")
        .field(42)
        .since(server_versions::PRICE_MGMT_ALGO, true);

    match mandatory.encode_fields(150) {
        Err(ProtocolError::UpdateRequired(what)) => assert_eq!(what, "price management algo"),
        other => panic!("expected UpdateRequired, got {:?}", other),
    }
    assert_eq!(visible(&mandatory, 151), vec!["42", "1"]);
}

#[test]
fn unrequested_capability_never_aborts() {
    let layout = RequestLayout::new(1)
        .require(server_versions::MANUAL_ORDER_TIME, false, "manual order time")
        .field(1);
    assert_eq!(visible(&layout, 100), vec!["1"]);
}

#[test]
fn until_and_between_gates() {
    let layout = RequestLayout::new(4)
        .until(server_versions::CME_TAGGING_FIELDS_IN_OPEN_ORDER, 1)
        .field(99)
        .gated(
            Gate::Between(server_versions::RFQ_FIELDS, server_versions::UNDO_RFQ_FIELDS),
            "rfq",
        );

    assert_eq!(visible(&layout, 186), vec!["1", "99"]);
    assert_eq!(visible(&layout, 187), vec!["1", "99", "rfq"]);
    assert_eq!(visible(&layout, 190), vec!["1", "99"]);
    assert_eq!(visible(&layout, 193), vec!["99"]);
}

#[test]
fn conditional_runs_and_unset_values() {
    let dates = vec![20240101, 20240102];
    let layout = RequestLayout::new(7)
        .field(None::<i32>)
        .field(true)
        .field(1.5)
        .when(false, |l| l.field("never"))
        .extend(Gate::Since(200), dates.iter().copied());

    assert_eq!(visible(&layout, 199), vec!["", "1", "1.5"]);
    assert_eq!(visible(&layout, 200), vec!["", "1", "1.5", "20240101", "20240102"]);
}

#[test]
fn non_printable_string_is_rejected() {
    let layout = RequestLayout::new(1).field("caf\u{e9}");
    match layout.encode_fields(150) {
        Err(ProtocolError::InvalidSymbol(s)) => assert_eq!(s, "caf\u{e9}"),
        other => panic!("expected InvalidSymbol, got {:?}", other),
    }

    let tabbed = RequestLayout::new(1).field("a\tb");
    assert!(tabbed.encode_fields(150).is_ok());
}
