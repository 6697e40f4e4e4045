//! Error types for the client crate.
//!
//! Internal functions return [`ClientError`]; the façade turns it into a
//! single `Wrapper::error` call with the matching vendor code.

use thiserror::Error;
use tws_core::error_codes::{self, ErrorCode};
use tws_protocol::ProtocolError;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("not connected")]
    NotConnected,

    #[error("already connected")]
    AlreadyConnected,

    #[error("connect failed: {0}")]
    ConnectFailed(String),

    #[error("unsupported version {0}")]
    UnsupportedVersion(i32),

    #[error("connection closed")]
    ConnectionClosed,

    #[error("invalid symbol in string: {0}")]
    InvalidSymbol(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

impl ClientError {
    /// Vendor code for this failure. `fallback` is the request-specific
    /// code used for encoding and sending failures.
    pub fn error_code(&self, fallback: ErrorCode) -> ErrorCode {
        match self {
            ClientError::NotConnected => error_codes::NOT_CONNECTED,
            ClientError::AlreadyConnected => error_codes::ALREADY_CONNECTED,
            ClientError::ConnectFailed(_) => error_codes::CONNECT_FAIL,
            ClientError::UnsupportedVersion(_) => error_codes::UNSUPPORTED_VERSION,
            ClientError::InvalidSymbol(_) => error_codes::INVALID_SYMBOL,
            ClientError::Protocol(ProtocolError::InvalidSymbol(_)) => error_codes::INVALID_SYMBOL,
            ClientError::Protocol(ProtocolError::UpdateRequired(_)) => error_codes::UPDATE_TWS,
            ClientError::ConnectionClosed | ClientError::Io(_) | ClientError::Protocol(_) => {
                fallback
            }
        }
    }

    /// Text appended to the vendor message.
    pub fn detail(&self) -> String {
        match self {
            ClientError::InvalidSymbol(s)
            | ClientError::Protocol(ProtocolError::InvalidSymbol(s)) => s.clone(),
            ClientError::Protocol(ProtocolError::UpdateRequired(what)) => {
                format!("  It does not support {}.", what)
            }
            ClientError::NotConnected | ClientError::AlreadyConnected => String::new(),
            ClientError::UnsupportedVersion(v) => format!(" {}", v),
            ClientError::ConnectFailed(reason) => format!(" ({})", reason),
            other => other.to_string(),
        }
    }
}

/// Failures while loading [`crate::config::ClientConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidEnv { key: String, value: String },

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}
