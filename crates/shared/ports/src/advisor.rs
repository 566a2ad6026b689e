use luatrader_core::{Advice, Candle};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Stateful signal function: one call per candle, in time order.
///
/// Returns `None` when the candle produces no new advice.
pub trait Advisor: Send {
    fn advise(&mut self, candle: &Candle) -> Option<Advice>;
}

impl<F> Advisor for F
where
    F: FnMut(&Candle) -> Option<Advice> + Send,
{
    fn advise(&mut self, candle: &Candle) -> Option<Advice> {
        self(candle)
    }
}

/// Strategy entry of the settings file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisorConfig {
    /// Advisor name understood by the factory
    pub advisor: String,
    /// Security name, e.g. `CNY-3.25`
    pub security: String,
    #[serde(default = "one")]
    pub lever: Decimal,
    #[serde(default = "one")]
    pub max_lever: Decimal,
    #[serde(default = "one")]
    pub weight: Decimal,
    #[serde(default)]
    pub std_volatility: Decimal,
    /// 1 long only, -1 short only, 0 both
    #[serde(default)]
    pub direction: i8,
}

fn one() -> Decimal {
    Decimal::ONE
}

impl AdvisorConfig {
    pub fn new(advisor: impl Into<String>, security: impl Into<String>) -> Self {
        Self {
            advisor: advisor.into(),
            security: security.into(),
            lever: Decimal::ONE,
            max_lever: Decimal::ONE,
            weight: Decimal::ONE,
            std_volatility: Decimal::ZERO,
            direction: 0,
        }
    }

    pub fn with_lever(mut self, lever: Decimal, max_lever: Decimal) -> Self {
        self.lever = lever;
        self.max_lever = max_lever;
        self
    }

    pub fn with_weight(mut self, weight: Decimal) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_direction(mut self, direction: i8) -> Self {
        self.direction = direction;
        self
    }
}

/// Builds the base advisor for a strategy (decorators are applied by the caller)
pub trait AdvisorFactory: Send + Sync {
    fn create(&self, config: &AdvisorConfig) -> Result<Box<dyn Advisor>>;
}
