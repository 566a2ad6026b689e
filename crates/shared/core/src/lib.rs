//! luatrader Core Domain
//!
//! Pure domain types for the luatrader futures client.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod calendar;
pub mod entities;
pub mod instruments;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{Advice, Candle, CandleInterval, Order, PortfolioInfo, Side};
pub use instruments::{FUTURES_CLASS_CODE, SecurityInfo, encode_security};
pub use values::{Price, SecurityCode, TerminalTime, Timestamp};
