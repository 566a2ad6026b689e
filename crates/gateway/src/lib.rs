//! luatrader Gateway
//!
//! Gateway to the QUIK terminal's Lua bridge. Provides:
//! - Wire codec (newline-delimited JSON, Windows-1251 on the wire)
//! - `QuikService`: request/response over the command connection
//! - `QuikConnector`: typed terminal operations behind the `Trader` and
//!   `MarketDataService` ports
//! - `CallbackRouter`: the single reader of the event connection
//! - Adapters: FORTS security informator, mock trader
//!
//! ## Architecture
//!
//! ```text
//!          QUIK terminal (Lua bridge)
//!           │ port P          │ port P+1
//!      ┌────▼─────┐     ┌─────▼──────────┐
//!      │QuikService│     │ CallbackRouter │
//!      │ (Mutex)   │     └─────┬──────────┘
//!      └────▲─────┘           │ mpsc<Candle>
//!           │                 ▼
//!      QuikConnector     strategies (runner)
//! ```

pub mod adapters;
pub mod callbacks;
pub mod codec;
pub mod dynamic;
pub mod error;
pub mod quik;

// Re-export commonly used types
pub use adapters::{FortsSecurityInformator, MockTrader};
pub use callbacks::CallbackRouter;
pub use codec::{CallbackEnvelope, LineReader, LineWriter, RequestEnvelope, ResponseEnvelope};
pub use error::GatewayError;
pub use quik::{DEFAULT_PORT, QuikConnector, QuikService};
