use async_trait::async_trait;
use log::info;
use luatrader_core::{Candle, CandleInterval, Order, PortfolioInfo, SecurityInfo};
use luatrader_ports::{MarketDataService, Result, Trader};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Mutex;

/// Funds reported by the mock trader for any portfolio
pub const MOCK_INCOMING_AMOUNT: i64 = 1_000_000;

/// In-process stand-in for a terminal: always connected, fills every order
/// instantly and has no live market data.
#[derive(Debug, Default)]
pub struct MockTrader {
    positions: Mutex<HashMap<String, i64>>,
}

impl MockTrader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self, security_code: &str) -> i64 {
        self.positions
            .lock()
            .map(|positions| positions.get(security_code).copied().unwrap_or(0))
            .unwrap_or(0)
    }
}

#[async_trait]
impl Trader for MockTrader {
    async fn is_connected(&self) -> Result<bool> {
        Ok(true)
    }

    async fn incoming_amount(&self, _portfolio: &PortfolioInfo) -> Result<Decimal> {
        Ok(Decimal::from(MOCK_INCOMING_AMOUNT))
    }

    async fn get_position(&self, _portfolio: &PortfolioInfo, security: &SecurityInfo) -> Result<i64> {
        Ok(self.position(&security.code))
    }

    async fn register_order(&self, order: &Order) -> Result<()> {
        let mut positions = self
            .positions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *positions.entry(order.security.code.clone()).or_insert(0) += order.volume;
        info!(
            "[{}] Mock order {} @ {}",
            order.security.code, order.volume, order.price
        );
        Ok(())
    }
}

#[async_trait]
impl MarketDataService for MockTrader {
    async fn last_candles(&self, _security: &SecurityInfo, _interval: CandleInterval) -> Result<Vec<Candle>> {
        Ok(Vec::new())
    }

    async fn subscribe_candles(&self, _security: &SecurityInfo, _interval: CandleInterval) -> Result<()> {
        Ok(())
    }
}
