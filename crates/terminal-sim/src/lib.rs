//! Terminal simulator
//!
//! A TCP server speaking the QUIK Lua bridge protocol: commands on port `P`,
//! pushed events on `P + 1`. Terminal state (funds, positions,
//! subscriptions, history, last prices) lives in a shared `TerminalState`
//! that tests seed and inspect.
//!
//! ```ignore
//! let sim = TerminalSim::start().await?;
//! sim.state().set_incoming_amount("A1", "1000000");
//! // connect a client to sim.port() ...
//! sim.push_candle(&candle).await;
//! ```

pub mod error;
mod server;
mod state;
mod wire;

pub use error::{Result, SimError};
pub use server::TerminalSim;
pub use state::{RecordedRequest, TerminalState};
pub use wire::bar_json;
