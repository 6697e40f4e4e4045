/// Narrows the executions returned by an executions request.
///
/// Empty strings match everything. `last_n_days` and `specific_dates` are
/// only understood by newer terminals; setting either against an older one
/// fails the request instead of widening the filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionFilter {
    pub client_id: i32,
    pub acct_code: String,
    /// `yyyymmdd hh:mm:ss`
    pub time: String,
    pub symbol: String,
    pub sec_type: String,
    pub exchange: String,
    pub side: String,
    pub last_n_days: Option<i32>,
    /// `yyyymmdd` dates.
    pub specific_dates: Vec<i32>,
}

/// One fill.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Execution {
    pub exec_id: String,
    pub time: String,
    pub acct_number: String,
    pub exchange: String,
    pub side: String,
    pub shares: f64,
    pub price: f64,
    pub perm_id: i64,
    pub client_id: i32,
    pub order_id: i32,
    pub liquidation: i32,
    pub cum_qty: f64,
    pub avg_price: f64,
    pub order_ref: String,
    pub model_code: String,
    pub last_liquidity: i32,
}
