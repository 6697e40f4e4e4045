//! Outgoing request layouts.
//!
//! Each builder describes one request for every version at once: fields
//! carry their version gate, and capabilities the caller actually asked for
//! are listed as requirements. The codec decides what goes on the wire once
//! the negotiated version is known.

use tws_core::messages::outgoing;
use tws_core::server_versions as sv;
use tws_core::{Contract, ExecutionFilter, OrderCancel, TagValue};
use tws_protocol::field_codec::{Field, Gate, RequestLayout};
use tws_protocol::{proto, FrameCodec, ProtocolError};

/// A request ready for encoding: always a legacy layout, plus a protobuf
/// body for messages that switch format on newer terminals.
#[derive(Debug, Clone)]
pub struct Request {
    pub layout: RequestLayout,
    pub protobuf: Option<ProtoRequest>,
}

#[derive(Debug, Clone)]
pub enum ProtoRequest {
    Executions(proto::ExecutionRequest),
    CancelOrder(proto::CancelOrderRequest),
    GlobalCancel(proto::GlobalCancelRequest),
}

impl ProtoRequest {
    pub fn encode(&self, codec: &FrameCodec, message_id: i32) -> Result<Vec<u8>, ProtocolError> {
        match self {
            ProtoRequest::Executions(m) => codec.encode_protobuf(message_id, m),
            ProtoRequest::CancelOrder(m) => codec.encode_protobuf(message_id, m),
            ProtoRequest::GlobalCancel(m) => codec.encode_protobuf(message_id, m),
        }
    }
}

impl Request {
    fn legacy(layout: RequestLayout) -> Self {
        Self {
            layout,
            protobuf: None,
        }
    }

    fn with_protobuf(layout: RequestLayout, body: ProtoRequest) -> Self {
        Self {
            layout,
            protobuf: Some(body),
        }
    }

    pub fn message_id(&self) -> i32 {
        self.layout.message_id()
    }

    /// Full frame for `codec`'s version. Picks the protobuf body when the
    /// version calls for it.
    pub fn encode(&self, codec: &FrameCodec) -> Result<Vec<u8>, ProtocolError> {
        match &self.protobuf {
            Some(body) if codec.uses_protobuf(self.message_id()) => {
                body.encode(codec, self.message_id())
            }
            _ => codec.encode_legacy(&self.layout),
        }
    }
}

// ============================================================================
// Session
// ============================================================================

pub fn start_api(client_id: i32, optional_capabilities: &str) -> Request {
    Request::legacy(
        RequestLayout::new(outgoing::START_API)
            .field(2)
            .field(client_id)
            .since(sv::OPTIONAL_CAPABILITIES, optional_capabilities),
    )
}

pub fn req_current_time() -> Request {
    Request::legacy(RequestLayout::new(outgoing::REQ_CURRENT_TIME).field(1))
}

pub fn req_current_time_in_millis() -> Request {
    Request::legacy(RequestLayout::new(outgoing::REQ_CURRENT_TIME_IN_MILLIS).require(
        sv::CURRENT_TIME_IN_MILLIS,
        true,
        "current time in millis requests",
    ))
}

pub fn req_ids(num_ids: i32) -> Request {
    Request::legacy(RequestLayout::new(outgoing::REQ_IDS).field(1).field(num_ids))
}

pub fn req_managed_accts() -> Request {
    Request::legacy(RequestLayout::new(outgoing::REQ_MANAGED_ACCTS).field(1))
}

// ============================================================================
// Market data
// ============================================================================

/// Market data subscription.
///
/// `regulatory_snapshot` is best effort: terminals that predate it simply
/// never see the field.
pub fn req_mkt_data(
    ticker_id: i32,
    contract: &Contract,
    generic_tick_list: &str,
    snapshot: bool,
    regulatory_snapshot: bool,
    options: &[TagValue],
) -> Request {
    let dnc = contract.delta_neutral_contract.as_ref();
    let options: String = options.iter().map(ToString::to_string).collect();

    let layout = RequestLayout::new(outgoing::REQ_MKT_DATA)
        .require(sv::DELTA_NEUTRAL, dnc.is_some(), "delta-neutral orders")
        .require(sv::REQ_MKT_DATA_CONID, contract.con_id > 0, "conId parameter")
        .require(
            sv::TRADING_CLASS,
            !contract.trading_class.is_empty(),
            "tradingClass parameter in reqMktData",
        )
        .field(11)
        .field(ticker_id)
        .since(sv::REQ_MKT_DATA_CONID, contract.con_id)
        .field(&contract.symbol)
        .field(&contract.sec_type)
        .field(&contract.last_trade_date_or_contract_month)
        .field(contract.strike)
        .field(&contract.right)
        .field(&contract.multiplier)
        .field(&contract.exchange)
        .field(&contract.primary_exchange)
        .field(&contract.currency)
        .field(&contract.local_symbol)
        .since(sv::TRADING_CLASS, &contract.trading_class)
        .when(contract.is_combo(), |l| {
            let legs = contract.combo_legs.iter().flat_map(|leg| {
                [
                    Field::from(leg.con_id),
                    Field::from(leg.ratio),
                    Field::from(&leg.action),
                    Field::from(&leg.exchange),
                ]
            });
            l.field(contract.combo_legs.len())
                .extend(Gate::Always, legs)
        })
        .since(sv::DELTA_NEUTRAL, dnc.is_some())
        .when(dnc.is_some(), |l| match dnc {
            Some(d) => l
                .since(sv::DELTA_NEUTRAL, d.con_id)
                .since(sv::DELTA_NEUTRAL, d.delta)
                .since(sv::DELTA_NEUTRAL, d.price),
            None => l,
        })
        .field(generic_tick_list)
        .field(snapshot)
        .since(sv::REQ_SMART_COMPONENTS, regulatory_snapshot)
        .since(sv::LINKING, options);

    Request::legacy(layout)
}

pub fn cancel_mkt_data(ticker_id: i32) -> Request {
    Request::legacy(
        RequestLayout::new(outgoing::CANCEL_MKT_DATA)
            .field(2)
            .field(ticker_id),
    )
}

/// 1 live, 2 frozen, 3 delayed, 4 delayed frozen.
pub fn req_market_data_type(market_data_type: i32) -> Request {
    Request::legacy(
        RequestLayout::new(outgoing::REQ_MARKET_DATA_TYPE)
            .require(sv::REQ_MARKET_DATA_TYPE, true, "market data type requests")
            .field(1)
            .field(market_data_type),
    )
}

// ============================================================================
// Account
// ============================================================================

pub fn req_account_summary(req_id: i32, group: &str, tags: &str) -> Request {
    Request::legacy(
        RequestLayout::new(outgoing::REQ_ACCOUNT_SUMMARY)
            .require(sv::ACCOUNT_SUMMARY, true, "account summary requests")
            .field(1)
            .field(req_id)
            .field(group)
            .field(tags),
    )
}

pub fn cancel_account_summary(req_id: i32) -> Request {
    Request::legacy(
        RequestLayout::new(outgoing::CANCEL_ACCOUNT_SUMMARY)
            .require(sv::ACCOUNT_SUMMARY, true, "account summary requests")
            .field(1)
            .field(req_id),
    )
}

// ============================================================================
// Orders and executions
// ============================================================================

pub fn req_executions(req_id: i32, filter: &ExecutionFilter) -> Request {
    let by_days = filter.last_n_days.is_some() || !filter.specific_dates.is_empty();

    let layout = RequestLayout::new(outgoing::REQ_EXECUTIONS)
        .require(
            sv::PARAMETRIZED_DAYS_OF_EXECUTIONS,
            by_days,
            "last N days and specific dates parameters",
        )
        .field(3)
        .since(sv::EXECUTION_DATA_CHAIN, req_id)
        .field(filter.client_id)
        .field(&filter.acct_code)
        .field(&filter.time)
        .field(&filter.symbol)
        .field(&filter.sec_type)
        .field(&filter.exchange)
        .field(&filter.side)
        .since(sv::PARAMETRIZED_DAYS_OF_EXECUTIONS, filter.last_n_days)
        .since(sv::PARAMETRIZED_DAYS_OF_EXECUTIONS, filter.specific_dates.len())
        .extend(
            Gate::Since(sv::PARAMETRIZED_DAYS_OF_EXECUTIONS),
            filter.specific_dates.iter().copied(),
        );

    Request::with_protobuf(
        layout,
        ProtoRequest::Executions(proto::execution_request(req_id, filter)),
    )
}

pub fn cancel_order(order_id: i32, cancel: &OrderCancel) -> Request {
    let layout = RequestLayout::new(outgoing::CANCEL_ORDER)
        .require(
            sv::MANUAL_ORDER_TIME,
            !cancel.manual_order_cancel_time.is_empty(),
            "manual order cancel time attribute",
        )
        .require(
            sv::CME_TAGGING_FIELDS,
            has_cme_tags(cancel),
            "ext operator and manual order indicator parameters",
        )
        .until(sv::CME_TAGGING_FIELDS_IN_OPEN_ORDER, 1)
        .field(order_id)
        .since(sv::MANUAL_ORDER_TIME, &cancel.manual_order_cancel_time)
        .extend(
            Gate::Between(sv::RFQ_FIELDS, sv::UNDO_RFQ_FIELDS),
            [Field::from(""), Field::from(""), Field::Unset],
        )
        .since(sv::CME_TAGGING_FIELDS, &cancel.ext_operator)
        .since(sv::CME_TAGGING_FIELDS, cancel.manual_order_indicator);

    Request::with_protobuf(
        layout,
        ProtoRequest::CancelOrder(proto::cancel_order_request(order_id, cancel)),
    )
}

pub fn req_global_cancel(cancel: &OrderCancel) -> Request {
    let layout = RequestLayout::new(outgoing::REQ_GLOBAL_CANCEL)
        .require(sv::REQ_GLOBAL_CANCEL, true, "globalCancel requests")
        .require(
            sv::CME_TAGGING_FIELDS,
            has_cme_tags(cancel),
            "ext operator and manual order indicator parameters",
        )
        .until(sv::CME_TAGGING_FIELDS, 1)
        .since(sv::CME_TAGGING_FIELDS, &cancel.ext_operator)
        .since(sv::CME_TAGGING_FIELDS, cancel.manual_order_indicator);

    Request::with_protobuf(
        layout,
        ProtoRequest::GlobalCancel(proto::global_cancel_request(cancel)),
    )
}

fn has_cme_tags(cancel: &OrderCancel) -> bool {
    !cancel.ext_operator.is_empty() || cancel.manual_order_indicator.is_some()
}
