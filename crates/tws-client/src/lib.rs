//! tws-client
//!
//! Async client for the trading-terminal API.
//!
//! - [`client`]     : the [`Client`] façade (connect, requests, run loop)
//! - [`config`]     : [`ClientConfig`] from env or TOML
//! - [`error`]      : [`ClientError`], [`ConfigError`]
//! - [`transport`]  : socket split and frame reading
//! - [`types`]      : hand-off queue and session snapshot

pub mod client;
pub mod config;
pub mod error;
pub mod transport;
pub mod types;

// these are internal modules, not re-exported
mod decoder;
mod dispatcher;
mod handshake;
mod reader;
mod requests;

pub use client::Client;
pub use config::ClientConfig;
pub use dispatcher::MAX_INTERRUPTS;
pub use error::{ClientError, ConfigError};
