//! Advisor decorators
//!
//! Both wrap an inner advisor and are advisors themselves, so they compose:
//! `CandleValidation::new(Box::new(StdClamp::new(base, ...)), name)`.

use chrono::Timelike;
use log::warn;
use luatrader_core::calendar::is_new_day_started;
use luatrader_core::{Advice, Candle};
use luatrader_ports::{Advisor, AdvisorConfig};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Log-return between consecutive closes that is worth a warning
const BIG_JUMP: f64 = 0.1;

/// Filters the candle stream before it reaches the advisor:
/// - drops candles that do not move time forward
/// - drops the opening auction bar (first bar of a new day, minute 55,
///   hour 9 or earlier) without remembering it as the previous candle
/// - warns on big jumps between closes
pub struct CandleValidation {
    inner: Box<dyn Advisor>,
    name: String,
    last_candle: Option<Candle>,
    /// Only the first out-of-order candle in a row is logged
    error_mode: bool,
}

impl CandleValidation {
    pub fn new(inner: Box<dyn Advisor>, name: impl Into<String>) -> Self {
        Self {
            inner,
            name: name.into(),
            last_candle: None,
            error_mode: false,
        }
    }
}

impl Advisor for CandleValidation {
    fn advise(&mut self, candle: &Candle) -> Option<Advice> {
        if let Some(last) = &self.last_candle {
            if candle.date_time <= last.date_time {
                if !self.error_mode {
                    self.error_mode = true;
                    warn!(
                        "[{}] Invalid candle order: prev {} cur {}",
                        self.name, last, candle
                    );
                }
                return None;
            }

            let change = log_return(last.close, candle.close);
            if change.abs() >= BIG_JUMP {
                warn!(
                    "[{}] Big jump {:.4}: prev {} cur {}",
                    self.name, change, last, candle
                );
            }

            if is_new_day_started(&last.date_time, &candle.date_time)
                && candle.date_time.minute() == 55
                && candle.date_time.hour() <= 9
            {
                // opening auction
                return None;
            }
        }
        self.error_mode = false;
        self.last_candle = Some(candle.clone());
        self.inner.advise(candle)
    }
}

fn log_return(prev: Decimal, cur: Decimal) -> f64 {
    match (prev.to_f64(), cur.to_f64()) {
        (Some(prev), Some(cur)) if prev > 0.0 && cur > 0.0 => (cur / prev).ln(),
        _ => 0.0,
    }
}

/// Applies trading direction and leverage to the inner advice:
/// direction `1` keeps longs only, `-1` shorts only, then the position is
/// scaled by `lever` and clamped to `[-max_lever, max_lever]`.
pub struct StdClamp {
    inner: Box<dyn Advisor>,
    direction: i8,
    lever: Decimal,
    max_lever: Decimal,
}

impl StdClamp {
    pub fn new(inner: Box<dyn Advisor>, direction: i8, lever: Decimal, max_lever: Decimal) -> Self {
        Self {
            inner,
            direction,
            lever,
            max_lever,
        }
    }

    fn clamp(&self, position: Decimal) -> Decimal {
        let position = match self.direction {
            1 => position.max(Decimal::ZERO),
            -1 => position.min(Decimal::ZERO),
            _ => position,
        };
        (position * self.lever).clamp(-self.max_lever, self.max_lever)
    }
}

impl Advisor for StdClamp {
    fn advise(&mut self, candle: &Candle) -> Option<Advice> {
        let advice = self.inner.advise(candle)?;
        let position = self.clamp(advice.position);
        Some(advice.with_position(position, "StdDecorator"))
    }
}

/// Standard decorator stack for a configured strategy:
/// `validation(clamp(base))`, with lever and max lever scaled by weight.
pub fn decorate(base: Box<dyn Advisor>, config: &AdvisorConfig) -> Box<dyn Advisor> {
    let clamp = StdClamp::new(
        base,
        config.direction,
        config.lever * config.weight,
        config.max_lever * config.weight,
    );
    Box::new(CandleValidation::new(Box::new(clamp), config.security.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use luatrader_core::calendar::terminal_time;
    use rust_decimal_macros::dec;

    fn candle(day: u32, hour: u32, min: u32, close: Decimal) -> Candle {
        Candle::new(
            "SiH7",
            terminal_time(2017, 1, day, hour, min, 0).unwrap(),
            close,
            close,
            close,
            close,
            dec!(1),
        )
    }

    /// Advisor that targets a fixed position on every candle
    fn fixed(position: Decimal) -> Box<dyn Advisor> {
        Box::new(move |c: &Candle| {
            Some(Advice::new(
                c.security_code.clone(),
                c.date_time,
                c.close,
                position,
            ))
        })
    }

    #[test]
    fn test_validation_drops_out_of_order_candles() {
        let mut advisor = CandleValidation::new(fixed(dec!(1)), "Si");
        assert!(advisor.advise(&candle(10, 10, 5, dec!(60000))).is_some());
        assert!(advisor.advise(&candle(10, 10, 5, dec!(60000))).is_none());
        assert!(advisor.advise(&candle(10, 10, 0, dec!(60000))).is_none());
        assert!(advisor.advise(&candle(10, 10, 10, dec!(60000))).is_some());
    }

    #[test]
    fn test_validation_drops_opening_auction_bar() {
        let mut advisor = CandleValidation::new(fixed(dec!(1)), "Si");
        assert!(advisor.advise(&candle(10, 23, 45, dec!(60000))).is_some());
        // first bar of the next day at 09:55 is the auction
        assert!(advisor.advise(&candle(11, 9, 55, dec!(60500))).is_none());
        // the auction bar was not remembered, so 10:00 is still a new day
        assert!(advisor.advise(&candle(11, 10, 0, dec!(60400))).is_some());
        // 10:55 on the same day is ordinary
        assert!(advisor.advise(&candle(11, 10, 55, dec!(60400))).is_some());
    }

    #[test]
    fn test_validation_passes_big_jump() {
        let mut advisor = CandleValidation::new(fixed(dec!(1)), "Si");
        assert!(advisor.advise(&candle(10, 10, 0, dec!(100))).is_some());
        assert!(advisor.advise(&candle(10, 10, 5, dec!(120))).is_some());
    }

    #[test]
    fn test_clamp_direction_and_max_lever() {
        let c = candle(10, 10, 0, dec!(60000));

        let mut long_only = StdClamp::new(fixed(dec!(-0.5)), 1, dec!(2), dec!(1.5));
        assert_eq!(long_only.advise(&c).unwrap().position, dec!(0));

        let mut short_only = StdClamp::new(fixed(dec!(0.5)), -1, dec!(2), dec!(1.5));
        assert_eq!(short_only.advise(&c).unwrap().position, dec!(0));

        let mut both = StdClamp::new(fixed(dec!(-0.9)), 0, dec!(2), dec!(1.5));
        let advice = both.advise(&c).unwrap();
        assert_eq!(advice.position, dec!(-1.5));
        assert_eq!(advice.details["name"], "StdDecorator");

        let mut inside = StdClamp::new(fixed(dec!(0.5)), 0, dec!(2), dec!(1.5));
        assert_eq!(inside.advise(&c).unwrap().position, dec!(1.0));
    }

    #[test]
    fn test_decorate_scales_by_weight() {
        let config = AdvisorConfig::new("hold", "Si-3.17")
            .with_lever(dec!(2), dec!(2))
            .with_weight(dec!(0.5));
        let mut advisor = decorate(fixed(dec!(1)), &config);
        let advice = advisor.advise(&candle(10, 10, 0, dec!(60000))).unwrap();
        assert_eq!(advice.position, dec!(1));
    }
}
