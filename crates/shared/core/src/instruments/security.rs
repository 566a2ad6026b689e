use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::values::Price;

/// Static description of a security, looked up once per strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityInfo {
    /// Human name (e.g. `Si-3.17`)
    pub name: String,
    /// Terminal's internal code (e.g. `SiH7`)
    pub code: String,
    /// Terminal class code (e.g. `SPBFUT`)
    pub class_code: String,
    /// Number of decimals in a price
    pub price_precision: u32,
    pub price_step: Price,
    pub price_step_cost: Decimal,
    /// Contract value per unit of underlying.
    /// For derivatives: price_step_cost / price_step.
    pub lever: Decimal,
}

impl SecurityInfo {
    /// Snap a price to the price step (no-op when the step is zero)
    pub fn round_to_step(&self, price: Price) -> Price {
        if self.price_step.is_zero() {
            return price;
        }
        round_half_away(price / self.price_step) * self.price_step
    }

    /// Price text as the terminal expects it: snapped to the step and
    /// printed with exactly `price_precision` decimals.
    pub fn format_price(&self, price: Price) -> String {
        format_price(self.price_step, self.price_precision, price)
    }
}

/// Snap `price` to `price_step` and print it with `precision` decimals
pub fn format_price(price_step: Price, precision: u32, price: Price) -> String {
    let snapped = if price_step.is_zero() {
        price
    } else {
        round_half_away(price / price_step) * price_step
    };
    let rounded = snapped.round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", precision as usize, rounded)
}

fn round_half_away(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}
