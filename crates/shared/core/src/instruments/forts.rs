//! FORTS futures naming
//!
//! Quarterly futures are configured by name (`Si-3.17`) and traded by code
//! (`SiH7`): base + month letter + last digit of the year. Perpetual futures
//! (names ending in `F`) use their name as the code.

use rust_decimal_macros::dec;

use super::SecurityInfo;

/// Class code of FORTS futures in the terminal
pub const FUTURES_CLASS_CODE: &str = "SPBFUT";

const MONTH_CODES: &[u8; 12] = b"FGHJKMNQUVXZ";

/// Encode a futures name into its terminal code.
///
/// `Si-3.17` → `SiH7`, `CNY-3.25` → `CRH5`, `CNYRUBF` → `CNYRUBF`.
/// Returns `None` for a malformed name.
pub fn encode_security(security_name: &str) -> Option<String> {
    if security_name.ends_with('F') {
        return Some(security_name.to_string());
    }
    let (name, expiry) = security_name.split_once('-')?;
    let (month, year) = expiry.split_once('.')?;
    let month: usize = month.parse().ok()?;
    let year: u32 = year.parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    // CNY/RUB futures trade under the CR prefix
    let name = if name == "CNY" { "CR" } else { name };
    Some(format!(
        "{}{}{}",
        name,
        MONTH_CODES[month - 1] as char,
        year % 10
    ))
}

/// Reference data for the FORTS contracts this client trades
pub fn forts_security_info(security_name: &str) -> Option<SecurityInfo> {
    let code = encode_security(security_name)?;
    if security_name.starts_with("Si") {
        return Some(SecurityInfo {
            name: security_name.to_string(),
            code,
            class_code: FUTURES_CLASS_CODE.to_string(),
            price_precision: 0,
            price_step: dec!(1),
            price_step_cost: dec!(1),
            lever: dec!(1),
        });
    }
    if security_name.starts_with("CNY") {
        return Some(SecurityInfo {
            name: security_name.to_string(),
            code,
            class_code: FUTURES_CLASS_CODE.to_string(),
            price_precision: 3,
            price_step: dec!(0.001),
            price_step_cost: dec!(1),
            lever: dec!(1000),
        });
    }
    None
}
