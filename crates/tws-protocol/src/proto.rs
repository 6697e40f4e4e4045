//! Protobuf message bodies.
//!
//! Hand-written `prost` derives for the messages this client exchanges in
//! the protobuf layout. Every scalar is `optional` so "not set" survives the
//! round trip; request builders below map empty strings and `None` to unset
//! fields instead of sending defaults.

use tws_core as model;

// ============================================================================
// Requests
// ============================================================================

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExecutionFilter {
    #[prost(int32, optional, tag = "1")]
    pub client_id: ::core::option::Option<i32>,
    #[prost(string, optional, tag = "2")]
    pub acct_code: ::core::option::Option<String>,
    #[prost(string, optional, tag = "3")]
    pub time: ::core::option::Option<String>,
    #[prost(string, optional, tag = "4")]
    pub symbol: ::core::option::Option<String>,
    #[prost(string, optional, tag = "5")]
    pub sec_type: ::core::option::Option<String>,
    #[prost(string, optional, tag = "6")]
    pub exchange: ::core::option::Option<String>,
    #[prost(string, optional, tag = "7")]
    pub side: ::core::option::Option<String>,
    #[prost(int32, optional, tag = "8")]
    pub last_n_days: ::core::option::Option<i32>,
    #[prost(int32, repeated, tag = "9")]
    pub specific_dates: Vec<i32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExecutionRequest {
    #[prost(int32, optional, tag = "1")]
    pub req_id: ::core::option::Option<i32>,
    #[prost(message, optional, tag = "2")]
    pub execution_filter: ::core::option::Option<ExecutionFilter>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct OrderCancel {
    #[prost(string, optional, tag = "1")]
    pub manual_order_cancel_time: ::core::option::Option<String>,
    #[prost(string, optional, tag = "2")]
    pub ext_operator: ::core::option::Option<String>,
    #[prost(int32, optional, tag = "3")]
    pub manual_order_indicator: ::core::option::Option<i32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CancelOrderRequest {
    #[prost(int32, optional, tag = "1")]
    pub order_id: ::core::option::Option<i32>,
    #[prost(message, optional, tag = "2")]
    pub order_cancel: ::core::option::Option<OrderCancel>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GlobalCancelRequest {
    #[prost(message, optional, tag = "1")]
    pub order_cancel: ::core::option::Option<OrderCancel>,
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ErrorMessage {
    #[prost(int32, optional, tag = "1")]
    pub id: ::core::option::Option<i32>,
    #[prost(int64, optional, tag = "2")]
    pub error_time: ::core::option::Option<i64>,
    #[prost(int32, optional, tag = "3")]
    pub error_code: ::core::option::Option<i32>,
    #[prost(string, optional, tag = "4")]
    pub error_msg: ::core::option::Option<String>,
    #[prost(string, optional, tag = "5")]
    pub advanced_order_reject_json: ::core::option::Option<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct OrderStatus {
    #[prost(int32, optional, tag = "1")]
    pub order_id: ::core::option::Option<i32>,
    #[prost(string, optional, tag = "2")]
    pub status: ::core::option::Option<String>,
    #[prost(string, optional, tag = "3")]
    pub filled: ::core::option::Option<String>,
    #[prost(string, optional, tag = "4")]
    pub remaining: ::core::option::Option<String>,
    #[prost(double, optional, tag = "5")]
    pub avg_fill_price: ::core::option::Option<f64>,
    #[prost(int64, optional, tag = "6")]
    pub perm_id: ::core::option::Option<i64>,
    #[prost(int32, optional, tag = "7")]
    pub parent_id: ::core::option::Option<i32>,
    #[prost(double, optional, tag = "8")]
    pub last_fill_price: ::core::option::Option<f64>,
    #[prost(int32, optional, tag = "9")]
    pub client_id: ::core::option::Option<i32>,
    #[prost(string, optional, tag = "10")]
    pub why_held: ::core::option::Option<String>,
    #[prost(double, optional, tag = "11")]
    pub mkt_cap_price: ::core::option::Option<f64>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Contract {
    #[prost(int32, optional, tag = "1")]
    pub con_id: ::core::option::Option<i32>,
    #[prost(string, optional, tag = "2")]
    pub symbol: ::core::option::Option<String>,
    #[prost(string, optional, tag = "3")]
    pub sec_type: ::core::option::Option<String>,
    #[prost(string, optional, tag = "4")]
    pub last_trade_date_or_contract_month: ::core::option::Option<String>,
    #[prost(double, optional, tag = "5")]
    pub strike: ::core::option::Option<f64>,
    #[prost(string, optional, tag = "6")]
    pub right: ::core::option::Option<String>,
    #[prost(string, optional, tag = "7")]
    pub multiplier: ::core::option::Option<String>,
    #[prost(string, optional, tag = "8")]
    pub exchange: ::core::option::Option<String>,
    #[prost(string, optional, tag = "9")]
    pub currency: ::core::option::Option<String>,
    #[prost(string, optional, tag = "10")]
    pub local_symbol: ::core::option::Option<String>,
    #[prost(string, optional, tag = "11")]
    pub trading_class: ::core::option::Option<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Execution {
    #[prost(int32, optional, tag = "1")]
    pub order_id: ::core::option::Option<i32>,
    #[prost(string, optional, tag = "2")]
    pub exec_id: ::core::option::Option<String>,
    #[prost(string, optional, tag = "3")]
    pub time: ::core::option::Option<String>,
    #[prost(string, optional, tag = "4")]
    pub acct_number: ::core::option::Option<String>,
    #[prost(string, optional, tag = "5")]
    pub exchange: ::core::option::Option<String>,
    #[prost(string, optional, tag = "6")]
    pub side: ::core::option::Option<String>,
    #[prost(string, optional, tag = "7")]
    pub shares: ::core::option::Option<String>,
    #[prost(double, optional, tag = "8")]
    pub price: ::core::option::Option<f64>,
    #[prost(int64, optional, tag = "9")]
    pub perm_id: ::core::option::Option<i64>,
    #[prost(int32, optional, tag = "10")]
    pub client_id: ::core::option::Option<i32>,
    #[prost(bool, optional, tag = "11")]
    pub is_liquidation: ::core::option::Option<bool>,
    #[prost(string, optional, tag = "12")]
    pub cum_qty: ::core::option::Option<String>,
    #[prost(double, optional, tag = "13")]
    pub avg_price: ::core::option::Option<f64>,
    #[prost(string, optional, tag = "14")]
    pub order_ref: ::core::option::Option<String>,
    #[prost(string, optional, tag = "15")]
    pub model_code: ::core::option::Option<String>,
    #[prost(int32, optional, tag = "16")]
    pub last_liquidity: ::core::option::Option<i32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExecutionDetails {
    #[prost(int32, optional, tag = "1")]
    pub req_id: ::core::option::Option<i32>,
    #[prost(message, optional, tag = "2")]
    pub contract: ::core::option::Option<Contract>,
    #[prost(message, optional, tag = "3")]
    pub execution: ::core::option::Option<Execution>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExecutionDetailsEnd {
    #[prost(int32, optional, tag = "1")]
    pub req_id: ::core::option::Option<i32>,
}

// ============================================================================
// Model → request
// ============================================================================

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

impl From<&model::ExecutionFilter> for ExecutionFilter {
    fn from(f: &model::ExecutionFilter) -> Self {
        Self {
            client_id: Some(f.client_id),
            acct_code: non_empty(&f.acct_code),
            time: non_empty(&f.time),
            symbol: non_empty(&f.symbol),
            sec_type: non_empty(&f.sec_type),
            exchange: non_empty(&f.exchange),
            side: non_empty(&f.side),
            last_n_days: f.last_n_days,
            specific_dates: f.specific_dates.clone(),
        }
    }
}

impl From<&model::OrderCancel> for OrderCancel {
    fn from(c: &model::OrderCancel) -> Self {
        Self {
            manual_order_cancel_time: non_empty(&c.manual_order_cancel_time),
            ext_operator: non_empty(&c.ext_operator),
            manual_order_indicator: c.manual_order_indicator,
        }
    }
}

pub fn execution_request(req_id: i32, filter: &model::ExecutionFilter) -> ExecutionRequest {
    ExecutionRequest {
        req_id: Some(req_id),
        execution_filter: Some(filter.into()),
    }
}

pub fn cancel_order_request(order_id: i32, cancel: &model::OrderCancel) -> CancelOrderRequest {
    CancelOrderRequest {
        order_id: Some(order_id),
        order_cancel: (!cancel.is_empty()).then(|| cancel.into()),
    }
}

pub fn global_cancel_request(cancel: &model::OrderCancel) -> GlobalCancelRequest {
    GlobalCancelRequest {
        order_cancel: (!cancel.is_empty()).then(|| cancel.into()),
    }
}

// ============================================================================
// Response → model
// ============================================================================

fn decimal(s: Option<&String>) -> f64 {
    s.and_then(|v| v.parse().ok()).unwrap_or_default()
}

impl From<&OrderStatus> for model::OrderStatus {
    fn from(p: &OrderStatus) -> Self {
        Self {
            order_id: p.order_id.unwrap_or_default(),
            status: p.status.clone().unwrap_or_default(),
            filled: decimal(p.filled.as_ref()),
            remaining: decimal(p.remaining.as_ref()),
            avg_fill_price: p.avg_fill_price.unwrap_or_default(),
            perm_id: p.perm_id.unwrap_or_default(),
            parent_id: p.parent_id.unwrap_or_default(),
            last_fill_price: p.last_fill_price.unwrap_or_default(),
            client_id: p.client_id.unwrap_or_default(),
            why_held: p.why_held.clone().unwrap_or_default(),
            mkt_cap_price: p.mkt_cap_price.unwrap_or_default(),
        }
    }
}

impl From<&Contract> for model::Contract {
    fn from(p: &Contract) -> Self {
        Self {
            con_id: p.con_id.unwrap_or_default(),
            symbol: p.symbol.clone().unwrap_or_default(),
            sec_type: p.sec_type.clone().unwrap_or_default(),
            last_trade_date_or_contract_month: p
                .last_trade_date_or_contract_month
                .clone()
                .unwrap_or_default(),
            strike: p.strike.unwrap_or_default(),
            right: p.right.clone().unwrap_or_default(),
            multiplier: p.multiplier.clone().unwrap_or_default(),
            exchange: p.exchange.clone().unwrap_or_default(),
            currency: p.currency.clone().unwrap_or_default(),
            local_symbol: p.local_symbol.clone().unwrap_or_default(),
            trading_class: p.trading_class.clone().unwrap_or_default(),
            ..model::Contract::default()
        }
    }
}

impl From<&Execution> for model::Execution {
    fn from(p: &Execution) -> Self {
        Self {
            exec_id: p.exec_id.clone().unwrap_or_default(),
            time: p.time.clone().unwrap_or_default(),
            acct_number: p.acct_number.clone().unwrap_or_default(),
            exchange: p.exchange.clone().unwrap_or_default(),
            side: p.side.clone().unwrap_or_default(),
            shares: decimal(p.shares.as_ref()),
            price: p.price.unwrap_or_default(),
            perm_id: p.perm_id.unwrap_or_default(),
            client_id: p.client_id.unwrap_or_default(),
            order_id: p.order_id.unwrap_or_default(),
            liquidation: i32::from(p.is_liquidation.unwrap_or_default()),
            cum_qty: decimal(p.cum_qty.as_ref()),
            avg_price: p.avg_price.unwrap_or_default(),
            order_ref: p.order_ref.clone().unwrap_or_default(),
            model_code: p.model_code.clone().unwrap_or_default(),
            last_liquidity: p.last_liquidity.unwrap_or_default(),
        }
    }
}
