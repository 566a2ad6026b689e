//! luatrader Clock Infrastructure
//!
//! - `SystemClock`: wall-clock time for live trading
//! - `ManualClock`: time that only moves when told to, for deterministic tests
//!
//! ```ignore
//! use luatrader_clock::{Clock, ManualClock};
//! use chrono::Duration;
//!
//! let clock = ManualClock::new(start);
//! clock.advance(Duration::minutes(9));
//! assert_eq!(clock.now() - start, Duration::minutes(9));
//! ```

mod manual;
mod system;

pub use manual::ManualClock;
pub use system::SystemClock;

// Re-export the Clock trait for convenience
pub use luatrader_ports::Clock;
