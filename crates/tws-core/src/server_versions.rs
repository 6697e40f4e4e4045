//! Capability table.
//!
//! Every optional field or message the terminal understands is tied to the
//! negotiated version that introduced it. The table is plain data: the
//! constants are generated together with a name-indexed slice so callers
//! can look a capability up by name (e.g. when it comes from configuration).
//!
//! Protobuf-capable outgoing messages have their own, separate table:
//! [`protobuf_version`].

use crate::messages::outgoing;

/// Lowest version this client offers during the handshake.
pub const MIN_CLIENT_VER: i32 = 100;

/// Highest version this client offers during the handshake.
pub const MAX_CLIENT_VER: i32 = 203;

macro_rules! capability_table {
    ($( $name:ident = $version:expr, )*) => {
        $(
            pub const $name: i32 = $version;
        )*

        /// `(feature name, minimum negotiated version)` in ascending order.
        pub static CAPABILITIES: &[(&str, i32)] = &[
            $( (stringify!($name), $version), )*
        ];
    };
}

capability_table! {
    DELTA_NEUTRAL = 40,
    EXECUTION_DATA_CHAIN = 42,
    REQ_MKT_DATA_CONID = 47,
    REQ_GLOBAL_CANCEL = 53,
    REQ_MARKET_DATA_TYPE = 55,
    ACCOUNT_SUMMARY = 67,
    TRADING_CLASS = 68,
    LINKING = 70,
    OPTIONAL_CAPABILITIES = 72,
    MODELS_SUPPORT = 103,
    MD_SIZE_MULTIPLIER = 110,
    REQ_SMART_COMPONENTS = 114,
    MARKET_CAP_PRICE = 131,
    LAST_LIQUIDITY = 136,
    PRICE_MGMT_ALGO = 151,
    ENCODE_MSG_ASCII7 = 153,
    FRACTIONAL_SIZE_SUPPORT = 163,
    ADVANCED_ORDER_REJECT = 166,
    MANUAL_ORDER_TIME = 169,
    PENDING_PRICE_REVISION = 178,
    RFQ_FIELDS = 187,
    UNDO_RFQ_FIELDS = 190,
    CME_TAGGING_FIELDS = 192,
    CME_TAGGING_FIELDS_IN_OPEN_ORDER = 193,
    ERROR_TIME = 194,
    CURRENT_TIME_IN_MILLIS = 197,
    SUBMITTER = 198,
    PARAMETRIZED_DAYS_OF_EXECUTIONS = 200,
    PROTOBUF = 201,
    PROTOBUF_PLACE_ORDER = 203,
}

/// Minimum version for a named capability, if the name is known.
pub fn min_version(name: &str) -> Option<i32> {
    CAPABILITIES
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| *v)
}

/// True when `negotiated` admits a feature introduced at `required`.
#[inline]
pub fn supports(negotiated: i32, required: i32) -> bool {
    negotiated >= required
}

/// True when `version` is inside the range this client offers.
#[inline]
pub fn is_supported_version(version: i32) -> bool {
    (MIN_CLIENT_VER..=MAX_CLIENT_VER).contains(&version)
}

/// Version from which an outgoing message switches to the protobuf layout.
///
/// Messages absent from this table always use the legacy text layout.
pub fn protobuf_version(outgoing_id: i32) -> Option<i32> {
    match outgoing_id {
        outgoing::REQ_EXECUTIONS => Some(PROTOBUF),
        outgoing::PLACE_ORDER | outgoing::CANCEL_ORDER | outgoing::REQ_GLOBAL_CANCEL => {
            Some(PROTOBUF_PLACE_ORDER)
        }
        _ => None,
    }
}
