//! tws-core
//!
//! Transport-agnostic building blocks for the trading-terminal API:
//! - message ids (incoming / outgoing)
//! - the capability table (feature → minimum negotiated version)
//! - vendor error codes reported through the callback interface
//! - request / response models (contract, order cancel, executions)
//! - the [`Wrapper`] callback trait implemented by applications

pub mod server_versions;
pub mod messages;
pub mod error_codes;
pub mod state;
pub mod contract;
pub mod order;
pub mod execution;
pub mod tick;
pub mod wrapper;

pub use state::ConnectionState;
pub use error_codes::ErrorCode;

pub use contract::{ComboLeg, Contract, DeltaNeutralContract, TagValue};
pub use order::{OrderCancel, OrderStatus};
pub use execution::{Execution, ExecutionFilter};
pub use tick::TickAttrib;

pub use wrapper::Wrapper;

/// Sentinel used on the wire for "no request id" (connection-level errors).
pub const NO_VALID_ID: i32 = -1;
