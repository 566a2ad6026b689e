//! Error types for the gateway crate

use luatrader_ports::TraderError;
use thiserror::Error;

/// Connection and codec errors
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Connection closed by terminal")]
    Closed,

    #[error("Line is not terminated: {0:?}")]
    Truncated(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Message conversion error: {0}")]
    Conversion(String),
}

impl From<GatewayError> for TraderError {
    fn from(e: GatewayError) -> Self {
        TraderError::Transport(e.to_string())
    }
}
