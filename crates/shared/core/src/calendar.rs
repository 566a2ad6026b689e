//! Terminal calendar helpers
//!
//! The terminal stamps bars in exchange-local time (Moscow, UTC+03:00, no DST).

use chrono::{FixedOffset, TimeZone};

use crate::values::{TerminalTime, Timestamp};

/// Offset of the terminal's local time from UTC, in seconds
pub const TERMINAL_UTC_OFFSET_SECS: i32 = 3 * 3600;

/// The terminal's time zone
pub fn terminal_offset() -> FixedOffset {
    FixedOffset::east_opt(TERMINAL_UTC_OFFSET_SECS).expect("UTC+03:00 is a valid offset")
}

/// Build a terminal-local timestamp from calendar fields.
///
/// Returns `None` when the fields do not name a real instant (e.g. month 13).
pub fn terminal_time(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    min: u32,
    sec: u32,
) -> Option<TerminalTime> {
    terminal_offset()
        .with_ymd_and_hms(year, month, day, hour, min, sec)
        .single()
}

/// Convert a wall-clock timestamp to terminal-local time
pub fn to_terminal(ts: Timestamp) -> TerminalTime {
    ts.with_timezone(&terminal_offset())
}

/// Both timestamps fall on the same terminal-local calendar day
pub fn is_same_day(a: &TerminalTime, b: &TerminalTime) -> bool {
    a.date_naive() == b.date_naive()
}

/// `r` is later than `l` and starts a new calendar day
pub fn is_new_day_started(l: &TerminalTime, r: &TerminalTime) -> bool {
    l.date_naive() != r.date_naive() && r > l
}
