use luatrader_core::calendar::to_terminal;
use luatrader_core::{TerminalTime, Timestamp};

/// Source of "now"
///
/// Staleness checks, the signal lookback window and the detection of
/// today's forming bar read time through this trait so tests can pin it.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;

    /// Current time in the terminal's time zone
    fn terminal_now(&self) -> TerminalTime {
        to_terminal(self.now())
    }

    fn name(&self) -> &str {
        "clock"
    }
}
