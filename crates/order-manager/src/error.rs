//! Order Manager errors

use luatrader_ports::TraderError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Position lookup failed for {security}: {source}")]
    Position { security: String, source: TraderError },

    #[error("Order registration failed for {security}: {source}")]
    RegisterOrder { security: String, source: TraderError },
}

impl Error {
    pub fn trader_error(&self) -> &TraderError {
        match self {
            Error::Position { source, .. } | Error::RegisterOrder { source, .. } => source,
        }
    }

    /// Transport failures are fatal for the whole session
    pub fn is_fatal(&self) -> bool {
        self.trader_error().is_fatal()
    }
}

pub type Result<T> = std::result::Result<T, Error>;
