//! luatrader Runner - one trading session against a terminal
//!
//! - **Config**: JSON settings (clients, strategies, timing)
//! - **Session**: connect, size, initialize strategies
//! - **Task group**: interrupt watcher, callback router, operator commands
//!   and the main cycle share one cancellation token
//! - **Main cycle**: candles → advice → orders, plus position checks
//!
//! ## Architecture
//!
//! ```text
//!   ┌───────────┐  events   ┌─────────────────┐  Candle (mpsc 16)
//!   │  Terminal ├──────────►│ CallbackRouter  ├──────────────┐
//!   │  (P / P+1)│           └─────────────────┘              │
//!   └─────▲─────┘                                            ▼
//!         │ commands      ┌──────────────────────────────────────────┐
//!         │               │               MainCycle                  │
//!         │               │  SignalService ─► StrategyExecutor (×N)  │
//!         └───────────────┤  delayed / periodic check_position       │
//!                         └─────────────▲────────────────────────────┘
//!   stdin ─► read_commands ─────────────┘ status
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use luatrader_runner::{Session, Settings};
//!
//! let settings = Settings::from_file("luatrader.json")?;
//! let stdin = tokio::io::BufReader::new(tokio::io::stdin());
//! Session::new(settings).with_client(Some("main".into())).run(stdin).await?;
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod group;
pub mod main_cycle;
pub mod session;

// Re-export main types
pub use commands::{OperatorCommand, read_commands};
pub use config::{ClientConfig, ConfigError, Settings, TimingConfig};
pub use error::{Result, RunError};
pub use group::TaskGroup;
pub use main_cycle::{MainCycle, StrategySlot};
pub use session::Session;
