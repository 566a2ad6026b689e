//! luatrader Strategy Framework
//!
//! The signal half of a trading strategy:
//! - Advisors: stateful `Candle -> Option<Advice>` functions
//! - Decorators: candle validation and direction/leverage clamp
//! - `SignalService`: warms an advisor up on history, then turns live
//!   candles into fresh advice
//! - `QuietStrategy`: tracks a security without ever trading it
//!
//! ## Architecture
//!
//! ```text
//!  CandleStorage ─┐
//!  last_candles ──┼──► CandleValidation ─► StdClamp ─► advisor
//!  live candles ──┘                                       │
//!                                                         ▼
//!                                              SignalService ─► Advice
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use luatrader_strategy::{BuiltinAdvisorFactory, SignalService};
//!
//! let mut signal = SignalService::init(&config, &deps, forward_after).await?;
//! signal.subscribe().await?;
//! if let Some(advice) = signal.on_candle(&candle) {
//!     executor.on_advice(&advice).await?;
//! }
//! ```

pub mod advisors;
pub mod decorators;
pub mod error;
pub mod history;
pub mod quiet;
pub mod signal;

// Re-export main types
pub use advisors::{BuiltinAdvisorFactory, HoldAdvisor, SampleAdvisor};
pub use decorators::{CandleValidation, StdClamp, decorate};
pub use error::{Error, Result};
pub use history::MemoryCandleStorage;
pub use quiet::QuietStrategy;
pub use signal::{SignalDeps, SignalService};
