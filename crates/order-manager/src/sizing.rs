//! Position sizing
//!
//! Target lots = available amount / (base price × lever) × advised position,
//! truncated toward zero.

use luatrader_core::Price;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Client-level limits on the money a session may use
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AmountLimits {
    /// Fixed amount overriding the terminal's funds when positive
    pub amount: Decimal,
    /// Cap on the amount when positive
    pub max_amount: Decimal,
    /// Share of the amount used when strictly between 0 and 1
    pub weight: Decimal,
}

/// Money the strategies of a client may size against
pub fn calc_available_amount(start_amount: Decimal, limits: &AmountLimits) -> Decimal {
    let mut result = if limits.amount > Decimal::ZERO {
        limits.amount
    } else {
        start_amount
    };
    if limits.max_amount > Decimal::ZERO {
        result = result.min(limits.max_amount);
    }
    if Decimal::ZERO < limits.weight && limits.weight < Decimal::ONE {
        result *= limits.weight;
    }
    result
}

/// Whole lots for the advised exposure; `None` when the price makes sizing
/// impossible (zero base price or lever)
pub fn target_lots(amount: Decimal, base_price: Price, lever: Decimal, position: Decimal) -> Option<i64> {
    let contract_value = base_price * lever;
    let lots = amount.checked_div(contract_value)? * position;
    lots.trunc().to_i64()
}

/// Limit price crossing the market by `slippage`: up for buys, down for sells
pub fn price_with_slippage(price: Price, volume: i64, slippage: Decimal) -> Price {
    if volume > 0 {
        price * (Decimal::ONE + slippage)
    } else {
        price * (Decimal::ONE - slippage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_available_amount() {
        let terminal = dec!(2000000);
        assert_eq!(calc_available_amount(terminal, &AmountLimits::default()), terminal);

        let limits = AmountLimits {
            amount: dec!(500000),
            max_amount: dec!(300000),
            weight: dec!(0.5),
        };
        assert_eq!(calc_available_amount(terminal, &limits), dec!(150000));

        // weight 1 (or above) leaves the amount untouched
        let limits = AmountLimits {
            weight: dec!(1),
            max_amount: dec!(1000000),
            ..Default::default()
        };
        assert_eq!(calc_available_amount(terminal, &limits), dec!(1000000));
    }

    #[test]
    fn test_target_lots() {
        // 1,000,000 / (100 × 1000) × 0.5 = 5
        assert_eq!(target_lots(dec!(1000000), dec!(100), dec!(1000), dec!(0.5)), Some(5));
        // truncation toward zero
        assert_eq!(target_lots(dec!(1000000), dec!(30000), dec!(1), dec!(1)), Some(33));
        assert_eq!(target_lots(dec!(1000000), dec!(30000), dec!(1), dec!(-1)), Some(-33));
        assert_eq!(target_lots(dec!(1000000), dec!(0), dec!(1), dec!(1)), None);
    }

    #[test]
    fn test_price_with_slippage() {
        assert_eq!(price_with_slippage(dec!(100), 5, dec!(0.001)), dec!(100.1));
        assert_eq!(price_with_slippage(dec!(100), -5, dec!(0.001)), dec!(99.9));
    }
}
