//! Strategy Executor
//!
//! Turns advice into orders for one security of one portfolio and keeps the
//! position the strategy believes it holds.

use chrono::{Duration, Utc};
use log::{info, warn};
use luatrader_core::{Advice, Order, PortfolioInfo, Price, SecurityInfo};
use luatrader_ports::{Clock, Trader};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::sizing::{price_with_slippage, target_lots};

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionConfig {
    /// Advice at least this old is not acted on
    pub advice_max_age: Duration,
    /// Fraction added to (buys) or taken from (sells) the advised price
    pub slippage: Decimal,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            advice_max_age: Duration::minutes(9),
            slippage: dec!(0.001),
        }
    }
}

/// What `on_advice` did with an advice
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    /// Advice for another security, or the price cannot size a position
    Skipped,
    /// Advice too old to act on
    Stale,
    /// Target equals the believed position
    NoChange,
    /// Believed and terminal positions disagree; no order sent
    Blocked,
    /// Order accepted by the terminal
    Registered { volume: i64, price: Price },
}

/// Result of comparing the believed position with the terminal's
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionCheck {
    Match(i64),
    Mismatch { believed: i64, terminal: i64 },
}

impl PositionCheck {
    pub fn is_match(&self) -> bool {
        matches!(self, PositionCheck::Match(_))
    }
}

pub struct StrategyExecutor {
    trader: Arc<dyn Trader>,
    portfolio: PortfolioInfo,
    security: SecurityInfo,
    amount: Decimal,
    /// Believed position in lots
    position: i64,
    /// Price of the first processed advice; never changes afterwards
    base_price: Option<Price>,
    clock: Arc<dyn Clock>,
    config: ExecutionConfig,
}

impl StrategyExecutor {
    /// Seed the believed position from the terminal
    pub async fn init(
        trader: Arc<dyn Trader>,
        portfolio: PortfolioInfo,
        security: SecurityInfo,
        amount: Decimal,
        clock: Arc<dyn Clock>,
        config: ExecutionConfig,
    ) -> Result<Self> {
        let position = trader
            .get_position(&portfolio, &security)
            .await
            .map_err(|source| Error::Position {
                security: security.name.clone(),
                source,
            })?;
        info!("[{}] Init position {}", security.name, position);

        Ok(Self {
            trader,
            portfolio,
            security,
            amount,
            position,
            base_price: None,
            clock,
            config,
        })
    }

    pub async fn on_advice(&mut self, advice: &Advice) -> Result<ExecutionOutcome> {
        if advice.security_code != self.security.code {
            return Ok(ExecutionOutcome::Skipped);
        }
        let age = self.clock.now() - advice.date_time.with_timezone(&Utc);
        if age >= self.config.advice_max_age {
            return Ok(ExecutionOutcome::Stale);
        }

        let base_price = match self.base_price {
            Some(price) => price,
            None => {
                info!(
                    "[{}] Init base price {} at {}",
                    self.security.name, advice.price, advice.date_time
                );
                self.base_price = Some(advice.price);
                advice.price
            }
        };

        let Some(target) = target_lots(self.amount, base_price, self.security.lever, advice.position)
        else {
            warn!(
                "[{}] Cannot size position at base price {}",
                self.security.name, base_price
            );
            return Ok(ExecutionOutcome::Skipped);
        };
        let volume = target - self.position;
        if volume == 0 {
            return Ok(ExecutionOutcome::NoChange);
        }
        info!("[{}] New advice {}", self.security.name, advice);

        if !self.check_position().await?.is_match() {
            return Ok(ExecutionOutcome::Blocked);
        }

        let price = price_with_slippage(advice.price, volume, self.config.slippage);
        info!(
            "[{}] Register order price {} volume {}",
            self.security.name, price, volume
        );
        let order = Order::new(self.portfolio.clone(), self.security.clone(), volume, price);
        self.trader
            .register_order(&order)
            .await
            .map_err(|source| Error::RegisterOrder {
                security: self.security.name.clone(),
                source,
            })?;
        self.position += volume;
        Ok(ExecutionOutcome::Registered { volume, price })
    }

    /// Compare the believed position with the terminal's
    pub async fn check_position(&self) -> Result<PositionCheck> {
        let terminal = self
            .trader
            .get_position(&self.portfolio, &self.security)
            .await
            .map_err(|source| Error::Position {
                security: self.security.name.clone(),
                source,
            })?;
        if terminal == self.position {
            info!("[{}] Check position {} +", self.security.name, self.position);
            Ok(PositionCheck::Match(terminal))
        } else {
            warn!(
                "[{}] Check position strategy {} trader {} !",
                self.security.name, self.position, terminal
            );
            Ok(PositionCheck::Mismatch {
                believed: self.position,
                terminal,
            })
        }
    }

    /// Believed position in lots
    pub fn position(&self) -> i64 {
        self.position
    }

    pub fn base_price(&self) -> Option<Price> {
        self.base_price
    }

    pub fn security(&self) -> &SecurityInfo {
        &self.security
    }

    pub fn portfolio(&self) -> &PortfolioInfo {
        &self.portfolio
    }
}
