//! Runner errors

use luatrader_gateway::GatewayError;
use luatrader_ports::TraderError;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum RunError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Terminal error: {0}")]
    Trader(#[from] TraderError),

    #[error("Strategy error: {0}")]
    Strategy(#[from] luatrader_strategy::Error),

    #[error("Execution error: {0}")]
    Execution(#[from] luatrader_order_manager::Error),

    #[error("Init failed: {0}")]
    Init(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Task {name} failed: {message}")]
    Task { name: String, message: String },
}

pub type Result<T> = std::result::Result<T, RunError>;

impl RunError {
    /// Errors that end the session; everything else skips one strategy
    pub fn is_fatal(&self) -> bool {
        match self {
            RunError::Trader(e) => e.is_fatal(),
            RunError::Strategy(e) => e.is_fatal(),
            RunError::Execution(e) => e.is_fatal(),
            _ => true,
        }
    }
}
