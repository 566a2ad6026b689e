//! Accessors for untyped terminal payloads
//!
//! The bridge returns numbers either as JSON numbers or as strings
//! depending on the Lua function, so both are accepted.

use luatrader_ports::{Result, TraderError};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde_json::Value;
use std::str::FromStr;

fn wrong_type(expected: &str, value: &Value) -> TraderError {
    TraderError::Decode(format!("expected {}, got {}", expected, value))
}

pub fn as_int(value: &Value) -> Result<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .ok_or_else(|| wrong_type("integer", value)),
        Value::String(s) => s.trim().parse().map_err(|_| wrong_type("integer", value)),
        _ => Err(wrong_type("integer", value)),
    }
}

pub fn as_float(value: &Value) -> Result<f64> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| wrong_type("number", value)),
        Value::String(s) => s.trim().parse().map_err(|_| wrong_type("number", value)),
        _ => Err(wrong_type("number", value)),
    }
}

pub fn as_decimal(value: &Value) -> Result<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .ok()
            .or_else(|| n.as_f64().and_then(Decimal::from_f64))
            .ok_or_else(|| wrong_type("number", value)),
        Value::String(s) => Decimal::from_str(s.trim())
            .or_else(|_| Decimal::from_scientific(s.trim()))
            .map_err(|_| wrong_type("number", value)),
        _ => Err(wrong_type("number", value)),
    }
}

pub fn as_str(value: &Value) -> Result<&str> {
    value.as_str().ok_or_else(|| wrong_type("string", value))
}

/// Field of a JSON object, `NotFound` when missing
pub fn field<'a>(value: &'a Value, name: &str) -> Result<&'a Value> {
    value
        .get(name)
        .ok_or_else(|| TraderError::NotFound(format!("field {}", name)))
}
