use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;

/// Price value - uses Decimal for precision
pub type Price = Decimal;

/// Timestamp in UTC (wall clock)
pub type Timestamp = DateTime<Utc>;

/// Timestamp in the terminal's local time zone (bars are stamped this way)
pub type TerminalTime = DateTime<FixedOffset>;

/// Terminal-internal instrument code (e.g. `SiH7`)
pub type SecurityCode = String;
