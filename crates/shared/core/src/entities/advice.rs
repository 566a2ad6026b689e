use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;

use crate::values::{Price, TerminalTime};

/// Advisor output: the target exposure for a security at a point in time.
///
/// "No new advice this tick" is expressed as `Option::<Advice>::None` by
/// advisors, never as a sentinel timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advice {
    pub security_code: String,
    pub date_time: TerminalTime,
    pub price: Price,
    /// Signed target exposure ratio (typically in [-1, 1] before leverage)
    pub position: Decimal,
    /// Opaque diagnostic payload
    #[serde(default)]
    pub details: Value,
}

impl Advice {
    pub fn new(
        security_code: impl Into<String>,
        date_time: TerminalTime,
        price: Price,
        position: Decimal,
    ) -> Self {
        Self {
            security_code: security_code.into(),
            date_time,
            price,
            position,
            details: Value::Null,
        }
    }

    /// Builder: attach diagnostic details
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Derive an advice with a different position, keeping the child
    /// position and details for diagnostics. Returns `self` unchanged if the
    /// position is the same.
    pub fn with_position(self, position: Decimal, name: &str) -> Self {
        if self.position == position {
            return self;
        }
        let details = json!({
            "name": name,
            "child_position": self.position,
            "child_details": self.details,
        });
        Self {
            security_code: self.security_code,
            date_time: self.date_time,
            price: self.price,
            position,
            details,
        }
    }
}

impl fmt::Display for Advice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} price={} position={}",
            self.security_code,
            self.date_time.format("%Y-%m-%d %H:%M:%S"),
            self.price,
            self.position
        )
    }
}
