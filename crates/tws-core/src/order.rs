//! Order-side models.
//!
//! Placing orders is outside this crate's request set; only what is needed
//! to cancel orders and to report their status lives here.

/// Extra attributes of a cancel request.
///
/// Each attribute is tied to a capability: setting one that the negotiated
/// version does not know aborts the request instead of dropping it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderCancel {
    /// `YYYYMMDD-hh:mm:ss`, empty when not set.
    pub manual_order_cancel_time: String,
    pub ext_operator: String,
    pub manual_order_indicator: Option<i32>,
}

impl OrderCancel {
    pub fn is_empty(&self) -> bool {
        self.manual_order_cancel_time.is_empty()
            && self.ext_operator.is_empty()
            && self.manual_order_indicator.is_none()
    }
}

/// Status update for one order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderStatus {
    pub order_id: i32,
    pub status: String,
    pub filled: f64,
    pub remaining: f64,
    pub avg_fill_price: f64,
    pub perm_id: i64,
    pub parent_id: i32,
    pub last_fill_price: f64,
    pub client_id: i32,
    pub why_held: String,
    /// Zero when the terminal predates market-cap pricing.
    pub mkt_cap_price: f64,
}
