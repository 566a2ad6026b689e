//! Instrument metadata
//!
//! - `SecurityInfo`: price grid and contract multiplier of a tradeable security
//! - FORTS (Moscow Exchange derivatives) symbol encoding and reference table

mod forts;
mod security;

pub use forts::{FUTURES_CLASS_CODE, encode_security, forts_security_info};
pub use security::SecurityInfo;
