//! QUIK Lua bridge client
//!
//! - `service`: one command in flight over the command connection
//! - `api`: typed wrappers named after the bridge's Lua functions
//! - `connector`: the `Trader`/`MarketDataService` implementation

pub mod api;
mod connector;
mod service;

pub use api::{FuturesHolding, PortfolioInfoEx, QuikCandle, QuikDateTime, Transaction};
pub use connector::QuikConnector;
pub use service::{QuikService, trans_id_seed};

/// Default command port of the bridge (events use the next port)
pub const DEFAULT_PORT: u16 = 34130;

/// Event name of a new bar pushed by the bridge
pub const EVENT_NEW_CANDLE: &str = "NewCandle";
