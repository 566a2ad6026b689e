use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::values::{Price, TerminalTime};

/// Bar timeframe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandleInterval {
    Minutes5,
    Hourly,
    Daily,
}

impl CandleInterval {
    /// Length of the interval in minutes (this is also the terminal's interval code)
    pub fn minutes(&self) -> u32 {
        match self {
            Self::Minutes5 => 5,
            Self::Hourly => 60,
            Self::Daily => 1440,
        }
    }

    /// Reverse of [`CandleInterval::minutes`]
    pub fn from_minutes(minutes: u32) -> Option<Self> {
        match minutes {
            5 => Some(Self::Minutes5),
            60 => Some(Self::Hourly),
            1440 => Some(Self::Daily),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minutes5 => "minutes5",
            Self::Hourly => "hourly",
            Self::Daily => "daily",
        }
    }
}

impl fmt::Display for CandleInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A price bar. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub security_code: String,
    /// Bar open time in terminal-local time
    pub date_time: TerminalTime,
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub volume: Decimal,
}

impl Candle {
    pub fn new(
        security_code: impl Into<String>,
        date_time: TerminalTime,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: Decimal,
    ) -> Self {
        Self {
            security_code: security_code.into(),
            date_time,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

impl fmt::Display for Candle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} O={} H={} L={} C={} V={}",
            self.security_code,
            self.date_time.format("%Y-%m-%d %H:%M"),
            self.open,
            self.high,
            self.low,
            self.close,
            self.volume
        )
    }
}
