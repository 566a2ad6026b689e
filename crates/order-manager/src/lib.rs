//! luatrader Order Manager
//!
//! The execution half of a trading strategy, one `StrategyExecutor` per
//! strategy:
//! - **Sizing**: available amount and target lots from advised exposure
//! - **Execution**: one limit order per change of target, priced with slippage
//! - **Reconciliation**: believed position vs the terminal's position
//!
//! ## Architecture
//!
//! ```text
//! Advice ──► ┌──────────────────────────────────────┐
//!            │          StrategyExecutor            │
//!            │  stale? ─► base price latch          │
//!            │  target lots ─► volume = target - pos│
//!            │  check_position ─► register_order    │
//!            └──────────────────┬───────────────────┘
//!                               │ Order
//!                               ▼
//!                        Trader (terminal)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use luatrader_order_manager::{ExecutionConfig, StrategyExecutor};
//!
//! let mut executor =
//!     StrategyExecutor::init(trader, portfolio, security, amount, clock, ExecutionConfig::default())
//!         .await?;
//! if let ExecutionOutcome::Registered { .. } = executor.on_advice(&advice).await? {
//!     // schedule a delayed position check
//! }
//! ```

pub mod error;
pub mod executor;
pub mod sizing;

// Re-export main types
pub use error::{Error, Result};
pub use executor::{ExecutionConfig, ExecutionOutcome, PositionCheck, StrategyExecutor};
pub use sizing::{AmountLimits, calc_available_amount, price_with_slippage, target_lots};
