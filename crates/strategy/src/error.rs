use luatrader_ports::TraderError;
use thiserror::Error;

/// Signal stage initialization failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Security lookup failed for {name}: {source}")]
    Security { name: String, source: TraderError },

    #[error("Advisor creation failed: {0}")]
    Advisor(TraderError),

    #[error("Candle storage failed: {0}")]
    Storage(TraderError),

    #[error("Market data failed: {0}")]
    MarketData(TraderError),
}

impl Error {
    /// Transport failures are fatal for the whole session
    pub fn is_fatal(&self) -> bool {
        match self {
            Error::Security { source, .. } => source.is_fatal(),
            Error::Advisor(e) | Error::Storage(e) | Error::MarketData(e) => e.is_fatal(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
