use std::fmt;

/// An instrument description as sent with market data requests.
///
/// Empty strings and zero numbers mean "not specified"; the terminal fills
/// in the rest from its own contract database.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contract {
    pub con_id: i32,
    pub symbol: String,
    pub sec_type: String,
    pub last_trade_date_or_contract_month: String,
    pub strike: f64,
    pub right: String,
    pub multiplier: String,
    pub exchange: String,
    pub primary_exchange: String,
    pub currency: String,
    pub local_symbol: String,
    pub trading_class: String,

    /// Only sent when `sec_type == "BAG"`.
    pub combo_legs: Vec<ComboLeg>,
    pub delta_neutral_contract: Option<DeltaNeutralContract>,
}

impl Contract {
    pub fn stock(symbol: &str, exchange: &str, currency: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            sec_type: "STK".to_string(),
            exchange: exchange.to_string(),
            currency: currency.to_string(),
            ..Self::default()
        }
    }

    pub fn is_combo(&self) -> bool {
        self.sec_type.eq_ignore_ascii_case("BAG")
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComboLeg {
    pub con_id: i32,
    pub ratio: i32,
    pub action: String,
    pub exchange: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DeltaNeutralContract {
    pub con_id: i32,
    pub delta: f64,
    pub price: f64,
}

/// Free-form option attached to some requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagValue {
    pub tag: String,
    pub value: String,
}

impl TagValue {
    pub fn new(tag: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            value: value.into(),
        }
    }
}

/// Wire form: `tag=value;`
impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={};", self.tag, self.value)
    }
}
