//! luatrader Ports
//!
//! Port definitions (traits) for the luatrader futures client.
//! These define the boundaries between the trading pipeline and the
//! terminal, the history store and the signal math.
//!
//! ```text
//!  CandleStorage ──┐
//!                  ├──► Advisor ──► Trader
//!  MarketDataService ┘       ▲
//!                            │
//!               AdvisorFactory / SecurityInformator
//! ```

mod advisor;
mod clock;
mod error;
mod market_data;
mod reference;
mod trader;

pub use advisor::{Advisor, AdvisorConfig, AdvisorFactory};
pub use clock::Clock;
pub use error::{Result, TraderError};
pub use market_data::MarketDataService;
pub use reference::{CandleStorage, SecurityInformator};
pub use trader::Trader;
