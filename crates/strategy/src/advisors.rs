//! Built-in advisors
//!
//! Signal math is supplied from outside; these two exist so a session can
//! run end to end and so the execution path can be exercised.

use luatrader_core::{Advice, Candle};
use luatrader_ports::{Advisor, AdvisorConfig, AdvisorFactory, Result, TraderError};
use rust_decimal::Decimal;
use serde_json::json;

/// Advises a flat position on every candle
#[derive(Debug, Default)]
pub struct SampleAdvisor;

impl Advisor for SampleAdvisor {
    fn advise(&mut self, candle: &Candle) -> Option<Advice> {
        Some(
            Advice::new(
                candle.security_code.clone(),
                candle.date_time,
                candle.close,
                Decimal::ZERO,
            )
            .with_details(json!("sample")),
        )
    }
}

/// Holds a constant target exposure
#[derive(Debug)]
pub struct HoldAdvisor {
    position: Decimal,
}

impl HoldAdvisor {
    pub fn new(position: Decimal) -> Self {
        Self { position }
    }
}

impl Advisor for HoldAdvisor {
    fn advise(&mut self, candle: &Candle) -> Option<Advice> {
        Some(
            Advice::new(
                candle.security_code.clone(),
                candle.date_time,
                candle.close,
                self.position,
            )
            .with_details(json!("hold")),
        )
    }
}

/// Resolves the advisor names understood by the settings file
#[derive(Debug, Default, Clone)]
pub struct BuiltinAdvisorFactory;

impl BuiltinAdvisorFactory {
    pub fn new() -> Self {
        Self
    }
}

impl AdvisorFactory for BuiltinAdvisorFactory {
    fn create(&self, config: &AdvisorConfig) -> Result<Box<dyn Advisor>> {
        match config.advisor.as_str() {
            "sample" => Ok(Box::new(SampleAdvisor)),
            "hold" => Ok(Box::new(HoldAdvisor::new(Decimal::ONE))),
            other => Err(TraderError::NotFound(format!("advisor {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use luatrader_core::calendar::terminal_time;
    use rust_decimal_macros::dec;

    #[test]
    fn test_factory() {
        let factory = BuiltinAdvisorFactory::new();
        let candle = Candle::new(
            "CRH5",
            terminal_time(2025, 1, 20, 10, 0, 0).unwrap(),
            dec!(13.5),
            dec!(13.5),
            dec!(13.5),
            dec!(13.5),
            dec!(1),
        );

        let mut hold = factory.create(&AdvisorConfig::new("hold", "CNY-3.25")).unwrap();
        let advice = hold.advise(&candle).unwrap();
        assert_eq!(advice.position, dec!(1));
        assert_eq!(advice.price, dec!(13.5));

        let mut sample = factory.create(&AdvisorConfig::new("sample", "CNY-3.25")).unwrap();
        assert_eq!(sample.advise(&candle).unwrap().position, dec!(0));

        assert!(factory.create(&AdvisorConfig::new("magic", "CNY-3.25")).is_err());
    }
}
