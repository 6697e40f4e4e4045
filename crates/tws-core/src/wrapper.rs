//! Callback interface.
//!
//! The client never returns errors from its request methods; everything the
//! terminal sends, and every failure the client detects, arrives here.
//! Implementations are shared between the caller's tasks and the run loop,
//! so methods take `&self` and implementors use interior mutability.
//!
//! Every method has a default so an application only overrides what it
//! consumes. The default `error` logs through `tracing`.

use crate::contract::Contract;
use crate::execution::Execution;
use crate::order::OrderStatus;
use crate::tick::TickAttrib;

#[allow(unused_variables)]
pub trait Wrapper: Send + Sync {
    // ------------------------------------------------------------------
    // Connection lifecycle
    // ------------------------------------------------------------------

    /// Handshake finished and `startApi` was sent.
    fn connect_ack(&self) {}

    /// Fired once per connection when it transitions to disconnected.
    fn connection_closed(&self) {}

    /// Errors from the terminal and from the client itself.
    ///
    /// `error_time` is milliseconds since the epoch. `req_id` is
    /// [`crate::NO_VALID_ID`] for errors not tied to a request.
    fn error(
        &self,
        req_id: i32,
        error_time: i64,
        code: i32,
        message: &str,
        advanced_order_reject_json: &str,
    ) {
        tracing::warn!(req_id, error_time, code, "{}", message);
    }

    // ------------------------------------------------------------------
    // Run loop hooks
    // ------------------------------------------------------------------

    /// The run loop waited a full poll interval without a frame.
    fn idle_tick(&self) {}

    /// Called after every dispatched frame, decoded or not. An oversized
    /// frame ends the run loop without it.
    fn message_dispatched(&self) {}

    /// An interrupt reached the run loop; `count` is the total this run.
    fn interrupt_received(&self, count: u32) {}

    // ------------------------------------------------------------------
    // Session
    // ------------------------------------------------------------------

    fn next_valid_id(&self, order_id: i32) {}

    /// Comma-separated account codes.
    fn managed_accounts(&self, accounts: &str) {}

    fn current_time(&self, time: i64) {}

    fn current_time_in_millis(&self, time_in_millis: i64) {}

    // ------------------------------------------------------------------
    // Market data
    // ------------------------------------------------------------------

    fn tick_price(&self, ticker_id: i32, field: i32, price: f64, attrib: TickAttrib) {}

    fn tick_size(&self, ticker_id: i32, field: i32, size: f64) {}

    fn tick_string(&self, ticker_id: i32, field: i32, value: &str) {}

    fn tick_generic(&self, ticker_id: i32, field: i32, value: f64) {}

    fn tick_snapshot_end(&self, req_id: i32) {}

    fn market_data_type(&self, req_id: i32, market_data_type: i32) {}

    // ------------------------------------------------------------------
    // Orders and executions
    // ------------------------------------------------------------------

    fn order_status(&self, status: &OrderStatus) {}

    fn exec_details(&self, req_id: i32, contract: &Contract, execution: &Execution) {}

    fn exec_details_end(&self, req_id: i32) {}

    // ------------------------------------------------------------------
    // Account
    // ------------------------------------------------------------------

    fn account_summary(&self, req_id: i32, account: &str, tag: &str, value: &str, currency: &str) {}

    fn account_summary_end(&self, req_id: i32) {}
}
