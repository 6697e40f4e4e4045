//! Client-side error codes.
//!
//! These are the codes the client reports through
//! [`crate::Wrapper::error`] for conditions it detects itself. Codes sent
//! by the terminal are passed through untouched.

use std::fmt;

/// A fixed `(code, message)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorCode {
    pub code: i32,
    pub msg: &'static str,
}

impl ErrorCode {
    pub const fn new(code: i32, msg: &'static str) -> Self {
        Self { code, msg }
    }

    /// Message with extra context appended, as reported to callbacks.
    pub fn with_detail(&self, detail: &str) -> String {
        if detail.is_empty() {
            self.msg.to_string()
        } else {
            format!("{}{}", self.msg, detail)
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.msg)
    }
}

pub const ALREADY_CONNECTED: ErrorCode = ErrorCode::new(501, "Already connected.");
pub const CONNECT_FAIL: ErrorCode = ErrorCode::new(
    502,
    "Couldn't connect to TWS. Confirm that \"Enable ActiveX and Socket Clients\" is enabled \
     and connection port is the same as \"Socket Port\" on the TWS \"Edit->Global \
     Configuration...->API->Settings\" menu.",
);
pub const UPDATE_TWS: ErrorCode =
    ErrorCode::new(503, "The TWS is out of date and must be upgraded.");
pub const NOT_CONNECTED: ErrorCode = ErrorCode::new(504, "Not connected");
pub const UNKNOWN_ID: ErrorCode = ErrorCode::new(505, "Fatal Error: Unknown message id.");
pub const UNSUPPORTED_VERSION: ErrorCode = ErrorCode::new(506, "Unsupported version");
pub const BAD_LENGTH: ErrorCode = ErrorCode::new(507, "Bad message length");
pub const BAD_MESSAGE: ErrorCode = ErrorCode::new(508, "Bad message");
pub const SOCKET_EXCEPTION: ErrorCode =
    ErrorCode::new(509, "Exception caught while reading socket - ");

pub const FAIL_SEND_REQMKT: ErrorCode = ErrorCode::new(510, "Request Market Data Sending Error - ");
pub const FAIL_SEND_CANMKT: ErrorCode = ErrorCode::new(511, "Cancel Market Data Sending Error - ");
pub const FAIL_SEND_EXEC: ErrorCode = ErrorCode::new(514, "Request Executions Sending Error - ");
pub const FAIL_SEND_CORDER: ErrorCode = ErrorCode::new(515, "Cancel Order Sending Error - ");
pub const FAIL_SEND_REQIDS: ErrorCode = ErrorCode::new(517, "Request IDs Sending Error - ");
pub const FAIL_SEND_REQMANAGEDACCTS: ErrorCode =
    ErrorCode::new(523, "Request Managed Accounts Sending Error - ");
pub const FAIL_SEND_REQCURRTIME: ErrorCode =
    ErrorCode::new(531, "Request Current Time Sending Error - ");
pub const FAIL_SEND_REQGLOBALCANCEL: ErrorCode =
    ErrorCode::new(538, "Request Global Cancel Sending Error - ");
pub const FAIL_SEND_REQMARKETDATATYPE: ErrorCode =
    ErrorCode::new(539, "Request Market Data Type Sending Error - ");
pub const FAIL_SEND_REQACCOUNTDATA: ErrorCode =
    ErrorCode::new(542, "Request Account Data Sending Error - ");
pub const FAIL_SEND_CANACCOUNTDATA: ErrorCode =
    ErrorCode::new(543, "Cancel Account Data Sending Error - ");
pub const FAIL_SEND_STARTAPI: ErrorCode = ErrorCode::new(551, "Start API Sending Error - ");
pub const FAIL_SEND_REQCURRTIMEINMILLIS: ErrorCode =
    ErrorCode::new(587, "Request Current Time In Millis Sending Error - ");

pub const INVALID_SYMBOL: ErrorCode = ErrorCode::new(579, "Invalid symbol in string - ");
